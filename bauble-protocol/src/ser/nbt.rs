use std::io::{Cursor, Error, ErrorKind, Read, Result, Write};

use bauble_utils::{
    codec::VarInt,
    serial::{ReadFrom, WriteTo, read_length},
};
use simdnbt::owned::{BaseNbt, Nbt, NbtCompound};

/// Largest NBT blob accepted from the network.
pub const MAX_NBT_SIZE: usize = 2 * 1024 * 1024;

/// An optional compound tag on the wire.
///
/// Encoded as a `VarInt` byte length followed by unnamed NBT. A length of zero
/// means "no tag", which keeps the field skippable without parsing it.
#[derive(Debug, Clone, Default)]
pub struct NetworkNbt(pub Option<NbtCompound>);

impl ReadFrom for NetworkNbt {
    fn read(data: &mut impl Read) -> Result<Self> {
        let len = read_length::<VarInt>(data, MAX_NBT_SIZE)?;
        if len == 0 {
            return Ok(Self(None));
        }

        let mut buf = vec![0; len];
        data.read_exact(&mut buf)?;
        let nbt = simdnbt::owned::read_unnamed(&mut Cursor::new(buf.as_slice()))
            .map_err(|e| Error::new(ErrorKind::InvalidData, e))?;
        Ok(match nbt {
            Nbt::Some(base) => Self(Some((*base).clone())),
            Nbt::None => Self(None),
        })
    }
}

impl WriteTo for NetworkNbt {
    fn write(&self, writer: &mut impl Write) -> Result<()> {
        let Some(compound) = &self.0 else {
            return VarInt(0).write(writer);
        };

        let mut buf = Vec::new();
        BaseNbt::new("", compound.clone()).write_unnamed(&mut buf);
        let len = VarInt::try_from(buf.len())
            .map_err(|_| Error::new(ErrorKind::InvalidInput, "NBT too large"))?;
        len.write(writer)?;
        writer.write_all(&buf)
    }
}
