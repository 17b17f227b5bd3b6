//! Runtime equipment slots attached to entities.

pub mod collection;
pub mod finder;
pub mod slot_group;
pub mod support;

pub use collection::SlotCollection;
pub use finder::{FoundSlot, SlotCriterion, SlotScope};
pub use slot_group::{MAX_GROUP_SIZE, SlotGroup};
pub use support::EquipmentSupport;
