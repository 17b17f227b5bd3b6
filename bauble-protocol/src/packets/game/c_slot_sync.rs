//! Single slot contents packet (clientbound).

use std::io::{Read, Result, Write};

use bauble_registry::ItemStack;
use bauble_utils::{
    codec::VarInt,
    serial::{PrefixedWrite, ReadFrom, WriteTo},
};

use super::slot_data::SlotData;
use crate::{
    packet_traits::ClientPacket,
    packets::{game::MAX_SLOT_TYPE_LENGTH, ids::C_SLOT_SYNC},
    ser::{NetworkNbt, read_truncated_string},
};

/// Sets one slot of an entity's equipment on the client.
#[derive(Debug, Clone)]
pub struct CSlotSync {
    /// The entity owning the slot.
    pub entity_id: i32,
    /// The slot type identifier, at most 25 characters.
    pub type_id: String,
    /// The index inside the group.
    pub slot: i32,
    /// The new contents.
    pub item: SlotData,
    /// Extension data applied to the item after it is placed.
    pub extra_tag: NetworkNbt,
}

impl CSlotSync {
    /// Creates a slot sync packet for a stack, carrying its extension data.
    #[must_use]
    pub fn new(entity_id: i32, type_id: impl Into<String>, slot: i32, stack: &ItemStack) -> Self {
        Self {
            entity_id,
            type_id: type_id.into(),
            slot,
            item: SlotData::from(stack),
            extra_tag: NetworkNbt(stack.extension().cloned()),
        }
    }

    /// Returns the stack with the extension data applied.
    #[must_use]
    pub fn into_item_stack(self) -> ItemStack {
        let mut stack = self.item.into_item_stack();
        stack.apply_sync_tag(self.extra_tag.0);
        stack
    }
}

impl ReadFrom for CSlotSync {
    fn read(data: &mut impl Read) -> Result<Self> {
        Ok(Self {
            entity_id: i32::read(data)?,
            type_id: read_truncated_string(data, MAX_SLOT_TYPE_LENGTH)?,
            slot: i32::read(data)?,
            item: SlotData::read(data)?,
            extra_tag: NetworkNbt::read(data)?,
        })
    }
}

impl WriteTo for CSlotSync {
    fn write(&self, writer: &mut impl Write) -> Result<()> {
        self.entity_id.write(writer)?;
        self.type_id.write_prefixed::<VarInt>(writer)?;
        self.slot.write(writer)?;
        self.item.write(writer)?;
        self.extra_tag.write(writer)
    }
}

impl ClientPacket for CSlotSync {
    const ID: i32 = C_SLOT_SYNC;
    const NAME: &'static str = "slot_sync";
}
