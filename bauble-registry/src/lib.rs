//! # Bauble Registry
//!
//! Process-wide slot type data: the merged [`TypeRegistry`], the
//! [`IconResolver`] and the item [`ClassificationIndex`]. All of it lives in one
//! owned [`Registries`] context that the server passes to whoever needs it.

pub mod bus;
pub mod icons;
pub mod item_stack;
pub mod slot_type;
pub mod tags;
pub mod type_registry;

use std::collections::BTreeSet;

use bauble_utils::Identifier;

pub use bus::{DeclarationBus, InterModMessage, MODIFY_TYPE, REGISTER_TYPE};
pub use icons::IconResolver;
pub use item_stack::ItemStack;
pub use slot_type::{MAX_SLOT_COUNT, SlotType, TypeDeclaration};
pub use tags::{ClassificationIndex, TagCollection};
pub use type_registry::TypeRegistry;

/// Namespace of the item tags that classify equippable items.
pub const DEFAULT_TAG_NAMESPACE: &str = "curios";

/// Registries that stop accepting some kind of change after loading.
pub trait RegistryExt {
    /// Ends the registration phase.
    fn freeze(&mut self);
}

/// Every piece of shared slot type state.
#[derive(Debug)]
pub struct Registries {
    /// Merged slot types.
    pub types: TypeRegistry,
    /// Icon candidates and winners.
    pub icons: IconResolver,
    /// Item tags loaded from data.
    pub tags: TagCollection,
    /// Item → slot type index derived from `tags`.
    pub classification: ClassificationIndex,
}

impl Default for Registries {
    fn default() -> Self {
        Self::new(DEFAULT_TAG_NAMESPACE)
    }
}

impl Registries {
    /// Creates empty registries classifying items through `tag_namespace` tags.
    pub fn new(tag_namespace: impl Into<String>) -> Self {
        Self {
            types: TypeRegistry::new(),
            icons: IconResolver::new(),
            tags: TagCollection::new(),
            classification: ClassificationIndex::new(tag_namespace),
        }
    }

    /// Drains the bus into the type registry.
    ///
    /// Every `register_type` message is applied before any `modify_type` message,
    /// so a modification never gets lost just because its producer loaded first.
    pub fn process_declarations(&mut self, bus: &mut DeclarationBus) {
        let (register, rest): (Vec<_>, Vec<_>) = bus
            .drain()
            .into_iter()
            .partition(|msg| msg.method == REGISTER_TYPE);

        for msg in &register {
            self.types.declare(&msg.declaration, true);
        }
        for msg in &rest {
            if msg.method == MODIFY_TYPE {
                self.types.declare(&msg.declaration, false);
            } else {
                log::debug!(
                    "Ignoring message \"{}\" from {}",
                    msg.method,
                    msg.sender
                );
            }
        }
        log::info!(
            "Processed {} slot type declarations, {} types known",
            register.len() + rest.len(),
            self.types.len()
        );
    }

    /// Returns the slot types `item` can be equipped in.
    pub fn types_for_item(&mut self, item: &Identifier) -> BTreeSet<String> {
        self.classification.types_for(item, &self.tags)
    }

    /// Clears everything, starting a new merge epoch. Called when a world loads.
    pub fn reset(&mut self) {
        self.types.clear();
        self.icons.clear();
        self.tags.clear();
        self.classification.clear();
    }
}

impl RegistryExt for Registries {
    fn freeze(&mut self) {
        self.icons.freeze();
    }
}
