//! The client's mirror of the equipment of entities it can see.
//!
//! The mirror only changes through clientbound packets. Packets addressing
//! something the mirror does not have are dropped and logged; they never break
//! the connection.

use std::collections::BTreeMap;

use bauble_protocol::packets::{
    CBoundPacket,
    game::{CFullSync, CSlotSync},
};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{
    equipment::{MAX_GROUP_SIZE, SlotCollection, SlotGroup},
    player::OpenContainer,
};

/// Why a sync packet could not be applied to the mirror.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MirrorError {
    /// The client does not know the entity.
    #[error("Entity {0} is not known")]
    UnknownEntity(i32),
    /// The entity exists but has no equipment.
    #[error("Entity {0} has no equipment")]
    NoEquipment(i32),
    /// The entity has no group for the slot type.
    #[error("Entity {entity_id} has no {type_id} slots")]
    UnknownGroup {
        /// The addressed entity.
        entity_id: i32,
        /// The missing slot type.
        type_id: String,
    },
    /// A full sync asked for a group larger than any group can be.
    #[error("Group {type_id} on entity {entity_id} has too many slots ({size})")]
    GroupTooLarge {
        /// The addressed entity.
        entity_id: i32,
        /// The slot type.
        type_id: String,
        /// The size that was sent.
        size: i32,
    },
    /// The slot index is outside the group.
    #[error("Slot {index} of {type_id} on entity {entity_id} is out of range")]
    SlotOutOfRange {
        /// The addressed entity.
        entity_id: i32,
        /// The slot type.
        type_id: String,
        /// The index that was sent.
        index: i32,
    },
}

/// Client-side state: the equipment mirrors and the open equipment screen.
#[derive(Debug, Default)]
pub struct ClientWorld {
    entities: FxHashMap<i32, Option<SlotCollection>>,
    screen: Option<OpenContainer>,
}

impl ClientWorld {
    /// Creates a client that knows no entities.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity. `with_equipment` gives it an empty mirror.
    pub fn add_entity(&mut self, id: i32, with_equipment: bool) {
        self.entities
            .insert(id, with_equipment.then(SlotCollection::new));
    }

    /// Forgets an entity.
    pub fn remove_entity(&mut self, id: i32) {
        self.entities.remove(&id);
    }

    /// Returns the mirrored equipment of an entity.
    #[must_use]
    pub fn equipment(&self, id: i32) -> Option<&SlotCollection> {
        self.entities.get(&id)?.as_ref()
    }

    /// Returns the equipment screen if one is open.
    #[must_use]
    pub fn screen(&self) -> Option<OpenContainer> {
        self.screen
    }

    fn mirror_mut(&mut self, entity_id: i32) -> Result<&mut SlotCollection, MirrorError> {
        self.entities
            .get_mut(&entity_id)
            .ok_or(MirrorError::UnknownEntity(entity_id))?
            .as_mut()
            .ok_or(MirrorError::NoEquipment(entity_id))
    }

    /// Applies a packet, logging it if it is rejected.
    pub fn handle(&mut self, packet: CBoundPacket) {
        match self.apply(packet) {
            Ok(()) => {}
            Err(
                err @ (MirrorError::SlotOutOfRange { .. } | MirrorError::GroupTooLarge { .. }),
            ) => {
                log::warn!("Dropping equipment sync: {err}");
            }
            Err(err) => log::debug!("Dropping equipment sync: {err}"),
        }
    }

    /// Applies a packet to the client state.
    pub fn apply(&mut self, packet: CBoundPacket) -> Result<(), MirrorError> {
        match packet {
            CBoundPacket::FullSync(sync) => self.apply_full_sync(sync),
            CBoundPacket::SlotSync(sync) => self.apply_slot_sync(sync),
            CBoundPacket::OpenEquipmentScreen(open) => {
                self.screen = Some(OpenContainer {
                    container_id: open.container_id,
                    cursor_x: open.cursor_x,
                    cursor_y: open.cursor_y,
                });
                Ok(())
            }
            CBoundPacket::ContainerClose(close) => {
                if self
                    .screen
                    .is_some_and(|screen| screen.container_id == close.container_id)
                {
                    self.screen = None;
                }
                Ok(())
            }
        }
    }

    /// Rejects the whole packet if any group is oversized; the mirror is left as it was.
    fn apply_full_sync(&mut self, sync: CFullSync) -> Result<(), MirrorError> {
        let entity_id = sync.entity_id;
        let mirror = self.mirror_mut(entity_id)?;
        let groups = sync
            .groups
            .into_iter()
            .map(|layout| {
                let size = usize::try_from(layout.size).unwrap_or(0);
                if size > MAX_GROUP_SIZE {
                    return Err(MirrorError::GroupTooLarge {
                        entity_id,
                        type_id: layout.type_id,
                        size: layout.size,
                    });
                }
                Ok((layout.type_id, SlotGroup::new(size)))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        mirror.replace_all(groups);
        Ok(())
    }

    fn apply_slot_sync(&mut self, sync: CSlotSync) -> Result<(), MirrorError> {
        let entity_id = sync.entity_id;
        let mirror = self.mirror_mut(entity_id)?;
        let Some(group) = mirror.group_mut(&sync.type_id) else {
            return Err(MirrorError::UnknownGroup {
                entity_id,
                type_id: sync.type_id,
            });
        };
        let Some(index) = usize::try_from(sync.slot)
            .ok()
            .filter(|&index| index < group.size())
        else {
            return Err(MirrorError::SlotOutOfRange {
                entity_id,
                type_id: sync.type_id,
                index: sync.slot,
            });
        };
        group.set_item(index, sync.into_item_stack());
        Ok(())
    }
}
