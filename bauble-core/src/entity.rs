//! Living entities as far as equipment is concerned.

use crate::equipment::SlotCollection;

/// A living entity that may carry equipment.
#[derive(Debug, Clone)]
pub struct LivingEntity {
    id: i32,
    kind: String,
    equipment: Option<SlotCollection>,
}

impl LivingEntity {
    /// Creates an entity. `equipment` is `None` for kinds without support.
    pub fn new(id: i32, kind: impl Into<String>, equipment: Option<SlotCollection>) -> Self {
        Self {
            id,
            kind: kind.into(),
            equipment,
        }
    }

    /// The network id of the entity.
    #[must_use]
    pub fn id(&self) -> i32 {
        self.id
    }

    /// The entity kind, e.g. `player`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the equipment, if this entity has any.
    #[must_use]
    pub fn equipment(&self) -> Option<&SlotCollection> {
        self.equipment.as_ref()
    }

    /// Returns the equipment mutably, if this entity has any.
    pub fn equipment_mut(&mut self) -> Option<&mut SlotCollection> {
        self.equipment.as_mut()
    }
}
