//! Network slot data for equipment packets.

use std::io::{Read, Result, Write};

use bauble_registry::ItemStack;
use bauble_utils::{
    Identifier,
    codec::VarInt,
    serial::{PrefixedWrite, ReadFrom, WriteTo},
};

use crate::ser::{NetworkNbt, read_truncated_string};

/// Longest item identifier accepted from the network.
const MAX_ITEM_ID_LENGTH: usize = 256;

/// A slot's contents for network transmission.
///
/// Serialized as:
/// - count: VarInt (0 = empty slot, nothing follows)
/// - item: String identifier
/// - tag: [`NetworkNbt`], the item's own data
///
/// The equipment extension data is not part of the slot; it travels next to it.
#[derive(Debug, Clone, Default)]
pub struct SlotData(pub ItemStack);

impl SlotData {
    /// Creates an empty slot.
    #[must_use]
    pub const fn empty() -> Self {
        Self(ItemStack::empty())
    }

    /// Returns the stack, leaving the extension data out.
    #[must_use]
    pub fn into_item_stack(self) -> ItemStack {
        self.0
    }
}

impl From<&ItemStack> for SlotData {
    fn from(stack: &ItemStack) -> Self {
        if stack.is_empty() {
            return Self::empty();
        }
        let mut copy = ItemStack::with_count(stack.item().clone(), stack.count());
        copy.set_tag(stack.tag().cloned());
        Self(copy)
    }
}

impl WriteTo for SlotData {
    fn write(&self, writer: &mut impl Write) -> Result<()> {
        if self.0.is_empty() {
            return VarInt(0).write(writer);
        }
        VarInt(self.0.count()).write(writer)?;
        self.0.item().to_string().write_prefixed::<VarInt>(writer)?;
        NetworkNbt(self.0.tag().cloned()).write(writer)
    }
}

impl ReadFrom for SlotData {
    fn read(data: &mut impl Read) -> Result<Self> {
        let count = VarInt::read(data)?.0;
        if count <= 0 {
            return Ok(Self::empty());
        }

        let raw_id = read_truncated_string(data, MAX_ITEM_ID_LENGTH)?;
        let tag = NetworkNbt::read(data)?.0;

        // An unknown or broken id degrades to an empty slot instead of failing
        // the whole packet.
        let Ok(item) = raw_id.parse::<Identifier>() else {
            log::warn!("Received invalid item identifier \"{raw_id}\"");
            return Ok(Self::empty());
        };
        let mut stack = ItemStack::with_count(item, count);
        stack.set_tag(tag);
        Ok(Self(stack))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use simdnbt::owned::{NbtCompound, NbtTag};

    use super::*;

    #[test]
    fn test_empty_slot_is_single_zero() {
        let mut buf = Vec::new();
        SlotData::empty().write(&mut buf).unwrap();
        assert_eq!(buf, [0]);
    }

    #[test]
    fn test_extension_is_not_serialized() {
        let mut stack = ItemStack::with_count(Identifier::new("bauble", "ring"), 2);
        stack.extension_mut().insert("charge", NbtTag::Int(9));
        let mut tag = NbtCompound::new();
        tag.insert("Damage", NbtTag::Int(4));
        stack.set_tag(Some(tag));

        let mut buf = Vec::new();
        SlotData::from(&stack).write(&mut buf).unwrap();
        let read = SlotData::read(&mut Cursor::new(&buf)).unwrap().into_item_stack();

        assert_eq!(read.item(), &Identifier::new("bauble", "ring"));
        assert_eq!(read.count(), 2);
        assert!(matches!(
            read.tag().and_then(|t| t.get("Damage")),
            Some(NbtTag::Int(4))
        ));
        assert!(read.extension().is_none());
    }

    #[test]
    fn test_invalid_item_id_reads_as_empty() {
        let mut buf = Vec::new();
        VarInt(1).write(&mut buf).unwrap();
        "Not An Id".write_prefixed::<VarInt>(&mut buf).unwrap();
        VarInt(0).write(&mut buf).unwrap();
        buf.push(0x7F);

        let mut cursor = Cursor::new(&buf);
        assert!(SlotData::read(&mut cursor).unwrap().0.is_empty());
        assert_eq!(u8::read(&mut cursor).unwrap(), 0x7F);
    }
}
