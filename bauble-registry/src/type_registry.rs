//! The canonical table of slot types.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use crate::slot_type::{MAX_SLOT_COUNT, SlotType, TypeDeclaration};

/// Holds every known slot type, keyed by identifier.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    by_id: FxHashMap<String, SlotType>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one declaration.
    ///
    /// A known identifier is merged (see [`SlotType`]). An unknown identifier is
    /// inserted when `create` is set and dropped otherwise. Sizes above [`MAX_SLOT_COUNT`] are clamped.
    pub fn declare(&mut self, declaration: &TypeDeclaration, create: bool) {
        if declaration.size > MAX_SLOT_COUNT {
            log::warn!(
                "Slot type \"{}\" asks for {} slots, clamping to {MAX_SLOT_COUNT}",
                declaration.identifier,
                declaration.size
            );
        }
        if let Some(present) = self.by_id.get_mut(&declaration.identifier) {
            present.merge(declaration);
        } else if create {
            self.by_id.insert(
                declaration.identifier.clone(),
                SlotType::from_declaration(declaration),
            );
        } else {
            log::debug!(
                "Dropping modification of unknown slot type \"{}\"",
                declaration.identifier
            );
        }
    }

    /// Looks up a slot type.
    #[must_use]
    pub fn lookup(&self, identifier: &str) -> Option<&SlotType> {
        self.by_id.get(identifier)
    }

    /// Returns whether the identifier is registered and enabled.
    #[must_use]
    pub fn is_enabled(&self, identifier: &str) -> bool {
        self.lookup(identifier).is_some_and(SlotType::is_enabled)
    }

    /// Returns every registered identifier in lexicographic order.
    #[must_use]
    pub fn identifiers(&self) -> BTreeSet<String> {
        self.by_id.keys().cloned().collect()
    }

    /// Iterates over all types in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &SlotType> {
        let mut types: Vec<&SlotType> = self.by_id.values().collect();
        types.sort_unstable_by(|a, b| a.identifier().cmp(b.identifier()));
        types.into_iter()
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns whether no type is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Forgets every type, starting a new merge epoch.
    pub fn clear(&mut self) {
        self.by_id.clear();
    }
}
