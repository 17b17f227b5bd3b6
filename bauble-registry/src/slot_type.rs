//! Slot types and the declarations producers send about them.

use serde::Deserialize;

/// Largest number of slots a single group may hold.
pub const MAX_SLOT_COUNT: u32 = 256;

/// A named category of equipment slots.
///
/// Only the identifier is fixed; the other attributes change through
/// [`TypeRegistry::declare`](crate::TypeRegistry::declare).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotType {
    identifier: String,
    size: u32,
    enabled: bool,
    hidden: bool,
}

impl SlotType {
    pub(crate) fn from_declaration(declaration: &TypeDeclaration) -> Self {
        Self {
            identifier: declaration.identifier.clone(),
            size: declaration.size.min(MAX_SLOT_COUNT),
            enabled: declaration.enabled,
            hidden: declaration.hidden,
        }
    }

    /// Folds another declaration of the same type into this one.
    ///
    /// Size takes the maximum (capped at [`MAX_SLOT_COUNT`]), `enabled` can only
    /// be switched off and `hidden` can only be switched on, so the result is
    /// independent of arrival order.
    pub(crate) fn merge(&mut self, declaration: &TypeDeclaration) {
        self.size = self.size.max(declaration.size.min(MAX_SLOT_COUNT));
        self.enabled &= declaration.enabled;
        self.hidden |= declaration.hidden;
    }

    /// The unique identifier of this type.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The number of slots an entity gets when the type is enabled for it.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Whether entities may be given slots of this type.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the type is kept out of the equipment screen.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }
}

/// The payload of a `register_type` or `modify_type` message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TypeDeclaration {
    /// The slot type identifier.
    pub identifier: String,
    /// The requested default size.
    #[serde(default = "default_size")]
    pub size: u32,
    /// `false` disables the type for everyone.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// `true` hides the type from the equipment screen.
    #[serde(default)]
    pub hidden: bool,
}

const fn default_size() -> u32 {
    1
}

const fn default_enabled() -> bool {
    true
}

impl TypeDeclaration {
    /// Creates an enabled, visible declaration with one slot.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            size: default_size(),
            enabled: default_enabled(),
            hidden: false,
        }
    }

    /// Sets the requested size.
    #[must_use]
    pub fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Sets the enabled flag.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the hidden flag.
    #[must_use]
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }
}
