//! Variable-length signed 32-bit integers (LEB128 on the two's complement bits).

use std::{
    io::{Error, ErrorKind, Read, Result, Write},
    num::TryFromIntError,
};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::serial::{ReadFrom, WriteTo};

/// A variable-length encoded `i32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VarInt(pub i32);

impl VarInt {
    /// The maximum number of bytes a `VarInt` occupies.
    pub const MAX_SIZE: usize = 5;

    /// Returns the exact number of bytes `val` occupies once written.
    #[must_use]
    pub fn written_size(val: i32) -> usize {
        match val {
            0 => 1,
            n => (31 - (n as u32).leading_zeros() as usize) / 7 + 1,
        }
    }

    /// Reads a `VarInt` from an async stream.
    ///
    /// A clean end of stream before the first byte is reported as
    /// [`ErrorKind::UnexpectedEof`] so callers can tell a closed peer from garbage.
    pub async fn read_async(read: &mut (impl AsyncRead + Unpin)) -> Result<Self> {
        let mut val = 0;
        for i in 0..Self::MAX_SIZE {
            let byte = read.read_u8().await?;
            val |= (i32::from(byte) & 0x7F) << (i * 7);
            if byte & 0x80 == 0 {
                return Ok(Self(val));
            }
        }
        Err(Error::new(ErrorKind::InvalidData, "VarInt too large"))
    }

    /// Writes this `VarInt` to an async stream.
    pub async fn write_async(self, write: &mut (impl AsyncWrite + Unpin)) -> Result<()> {
        let mut val = self.0 as u32;
        loop {
            let b = (val & 0x7F) as u8;
            val >>= 7;
            write.write_u8(if val == 0 { b } else { b | 0x80 }).await?;
            if val == 0 {
                return Ok(());
            }
        }
    }
}

impl ReadFrom for VarInt {
    fn read(data: &mut impl Read) -> Result<Self> {
        let mut val = 0;
        for i in 0..Self::MAX_SIZE {
            let byte = u8::read(data)?;
            val |= (i32::from(byte) & 0x7F) << (i * 7);
            if byte & 0x80 == 0 {
                return Ok(Self(val));
            }
        }
        Err(Error::new(ErrorKind::InvalidData, "VarInt too large"))
    }
}

impl WriteTo for VarInt {
    fn write(&self, writer: &mut impl Write) -> Result<()> {
        // Shifting the unsigned bits keeps negative values at five bytes.
        let mut val = self.0 as u32;
        loop {
            let b = (val & 0x7F) as u8;
            val >>= 7;
            if val == 0 {
                return b.write(writer);
            }
            (b | 0x80).write(writer)?;
        }
    }
}

impl From<i32> for VarInt {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl From<VarInt> for i32 {
    fn from(value: VarInt) -> Self {
        value.0
    }
}

impl TryFrom<usize> for VarInt {
    type Error = TryFromIntError;

    fn try_from(value: usize) -> std::result::Result<Self, Self::Error> {
        Ok(Self(i32::try_from(value)?))
    }
}

impl TryFrom<VarInt> for usize {
    type Error = TryFromIntError;

    fn try_from(value: VarInt) -> std::result::Result<Self, Self::Error> {
        usize::try_from(value.0)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn encode(val: i32) -> Vec<u8> {
        let mut buf = Vec::new();
        VarInt(val).write(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_known_encodings() {
        assert_eq!(encode(0), [0x00]);
        assert_eq!(encode(1), [0x01]);
        assert_eq!(encode(127), [0x7F]);
        assert_eq!(encode(128), [0x80, 0x01]);
        assert_eq!(encode(25565), [0xDD, 0xC7, 0x01]);
        assert_eq!(encode(-1), [0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
    }

    #[test]
    fn test_written_size_matches_encoding() {
        for val in [0, 1, 127, 128, 16_383, 16_384, 2_097_151, i32::MAX, -1] {
            assert_eq!(VarInt::written_size(val), encode(val).len(), "value {val}");
        }
    }

    #[test]
    fn test_rejects_overlong() {
        let buf = [0xFF; 6];
        assert!(VarInt::read(&mut Cursor::new(&buf)).is_err());
    }

    #[tokio::test]
    async fn test_async_matches_sync() {
        let mut buf = Vec::new();
        VarInt(300).write_async(&mut buf).await.unwrap();
        assert_eq!(buf, encode(300));
        let read = VarInt::read_async(&mut buf.as_slice()).await.unwrap();
        assert_eq!(read, VarInt(300));
    }
}
