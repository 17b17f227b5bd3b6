//! Full equipment layout packet (clientbound).

use std::io::{Read, Result, Write};

use bauble_utils::{
    codec::VarInt,
    serial::{PrefixedRead, PrefixedWrite, ReadFrom, WriteTo},
};

use crate::{
    packet_traits::ClientPacket,
    packets::{game::MAX_SLOT_TYPE_LENGTH, ids::C_FULL_SYNC},
    ser::read_truncated_string,
};

/// One slot group in a [`CFullSync`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupLayout {
    /// The slot type identifier.
    pub type_id: String,
    /// The number of slots.
    pub size: i32,
}

impl GroupLayout {
    /// Creates a layout entry.
    pub fn new(type_id: impl Into<String>, size: i32) -> Self {
        Self {
            type_id: type_id.into(),
            size,
        }
    }
}

impl ReadFrom for GroupLayout {
    fn read(data: &mut impl Read) -> Result<Self> {
        Ok(Self {
            type_id: read_truncated_string(data, MAX_SLOT_TYPE_LENGTH)?,
            size: i32::read(data)?,
        })
    }
}

impl WriteTo for GroupLayout {
    fn write(&self, writer: &mut impl Write) -> Result<()> {
        self.type_id.write_prefixed::<VarInt>(writer)?;
        self.size.write(writer)
    }
}

/// Replaces the client's whole copy of an entity's equipment with empty groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CFullSync {
    /// The entity whose equipment is described.
    pub entity_id: i32,
    /// Every group, in identifier order.
    pub groups: Vec<GroupLayout>,
}

impl CFullSync {
    /// Creates a new full sync packet.
    #[must_use]
    pub fn new(entity_id: i32, groups: Vec<GroupLayout>) -> Self {
        Self { entity_id, groups }
    }
}

impl ReadFrom for CFullSync {
    fn read(data: &mut impl Read) -> Result<Self> {
        Ok(Self {
            entity_id: i32::read(data)?,
            groups: Vec::read_prefixed::<VarInt>(data)?,
        })
    }
}

impl WriteTo for CFullSync {
    fn write(&self, writer: &mut impl Write) -> Result<()> {
        self.entity_id.write(writer)?;
        self.groups.write_prefixed::<VarInt>(writer)
    }
}

impl ClientPacket for CFullSync {
    const ID: i32 = C_FULL_SYNC;
    const NAME: &'static str = "full_sync";
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_layout_round_trip() {
        let packet = CFullSync::new(
            42,
            vec![GroupLayout::new("amulet", 2), GroupLayout::new("ring", 0)],
        );
        let mut buf = Vec::new();
        packet.write(&mut buf).unwrap();
        assert_eq!(&buf[..4], &42i32.to_be_bytes());

        let decoded = CFullSync::read(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn test_long_type_ids_are_truncated() {
        let packet = CFullSync::new(1, vec![GroupLayout::new("x".repeat(30), 1)]);
        let mut buf = Vec::new();
        packet.write(&mut buf).unwrap();

        let decoded = CFullSync::read(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(decoded.groups[0].type_id.len(), MAX_SLOT_TYPE_LENGTH);
        assert_eq!(decoded.groups[0].size, 1);
    }
}
