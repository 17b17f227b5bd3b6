//! Blocking (de)serialization traits for the wire format.
//!
//! Fixed-width numbers are big-endian. Strings and sequences carry a length prefix
//! whose encoding is chosen by the caller (usually [`VarInt`](crate::codec::VarInt)).

use std::io::{Error, ErrorKind, Read, Result, Write};

/// Upper bound applied when no explicit bound is given.
pub const DEFAULT_BOUND: usize = i32::MAX as _;

/// A value that can be decoded from a byte stream.
pub trait ReadFrom: Sized {
    /// Reads one value.
    fn read(data: &mut impl Read) -> Result<Self>;
}

/// A value that can be encoded into a byte stream.
pub trait WriteTo {
    /// Writes this value.
    fn write(&self, writer: &mut impl Write) -> Result<()>;
}

/// A value decoded from a length prefix of type `P` followed by its contents.
pub trait PrefixedRead: Sized {
    /// Reads the value, failing when the prefix exceeds `bound`.
    fn read_prefixed_bound<P: ReadFrom + TryInto<usize>>(
        data: &mut impl Read,
        bound: usize,
    ) -> Result<Self>;

    /// Reads the value with [`DEFAULT_BOUND`].
    fn read_prefixed<P: ReadFrom + TryInto<usize>>(data: &mut impl Read) -> Result<Self> {
        Self::read_prefixed_bound::<P>(data, DEFAULT_BOUND)
    }
}

/// A value encoded as a length prefix of type `P` followed by its contents.
pub trait PrefixedWrite {
    /// Writes the value, failing when its length exceeds `bound`.
    fn write_prefixed_bound<P: WriteTo + TryFrom<usize>>(
        &self,
        writer: &mut impl Write,
        bound: usize,
    ) -> Result<()>;

    /// Writes the value with [`DEFAULT_BOUND`].
    fn write_prefixed<P: WriteTo + TryFrom<usize>>(&self, writer: &mut impl Write) -> Result<()> {
        self.write_prefixed_bound::<P>(writer, DEFAULT_BOUND)
    }
}

/// Reads a length prefix of type `P` and checks it against `bound`.
pub fn read_length<P: ReadFrom + TryInto<usize>>(data: &mut impl Read, bound: usize) -> Result<usize> {
    let len: usize = P::read(data)?
        .try_into()
        .map_err(|_| Error::new(ErrorKind::InvalidData, "Negative length prefix"))?;
    if len > bound {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("Length {len} exceeds bound {bound}"),
        ));
    }
    Ok(len)
}

fn write_length<P: WriteTo + TryFrom<usize>>(
    writer: &mut impl Write,
    len: usize,
    bound: usize,
) -> Result<()> {
    if len > bound {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            format!("Length {len} exceeds bound {bound}"),
        ));
    }
    let prefix = P::try_from(len)
        .map_err(|_| Error::new(ErrorKind::InvalidInput, "Length does not fit the prefix"))?;
    prefix.write(writer)
}

macro_rules! impl_be_number {
    ($($ty:ty),*) => {
        $(
            impl ReadFrom for $ty {
                fn read(data: &mut impl Read) -> Result<Self> {
                    let mut buf = [0; size_of::<Self>()];
                    data.read_exact(&mut buf)?;
                    Ok(Self::from_be_bytes(buf))
                }
            }

            impl WriteTo for $ty {
                fn write(&self, writer: &mut impl Write) -> Result<()> {
                    writer.write_all(&self.to_be_bytes())
                }
            }
        )*
    };
}

impl_be_number!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl ReadFrom for bool {
    fn read(data: &mut impl Read) -> Result<Self> {
        Ok(u8::read(data)? != 0)
    }
}

impl WriteTo for bool {
    fn write(&self, writer: &mut impl Write) -> Result<()> {
        u8::from(*self).write(writer)
    }
}

impl PrefixedRead for String {
    fn read_prefixed_bound<P: ReadFrom + TryInto<usize>>(
        data: &mut impl Read,
        bound: usize,
    ) -> Result<Self> {
        let len = read_length::<P>(data, bound)?;
        let mut buf = vec![0; len];
        data.read_exact(&mut buf)?;
        String::from_utf8(buf).map_err(|e| Error::new(ErrorKind::InvalidData, e))
    }
}

impl PrefixedWrite for String {
    fn write_prefixed_bound<P: WriteTo + TryFrom<usize>>(
        &self,
        writer: &mut impl Write,
        bound: usize,
    ) -> Result<()> {
        self.as_str().write_prefixed_bound::<P>(writer, bound)
    }
}

impl PrefixedWrite for str {
    fn write_prefixed_bound<P: WriteTo + TryFrom<usize>>(
        &self,
        writer: &mut impl Write,
        bound: usize,
    ) -> Result<()> {
        write_length::<P>(writer, self.len(), bound)?;
        writer.write_all(self.as_bytes())
    }
}

impl<T: ReadFrom> PrefixedRead for Vec<T> {
    fn read_prefixed_bound<P: ReadFrom + TryInto<usize>>(
        data: &mut impl Read,
        bound: usize,
    ) -> Result<Self> {
        let len = read_length::<P>(data, bound)?;
        // The prefix is untrusted, so the allocation is capped.
        let mut items = Vec::with_capacity(len.min(256));
        for _ in 0..len {
            items.push(T::read(data)?);
        }
        Ok(items)
    }
}

impl<T: WriteTo> PrefixedWrite for [T] {
    fn write_prefixed_bound<P: WriteTo + TryFrom<usize>>(
        &self,
        writer: &mut impl Write,
        bound: usize,
    ) -> Result<()> {
        write_length::<P>(writer, self.len(), bound)?;
        for item in self {
            item.write(writer)?;
        }
        Ok(())
    }
}

impl<T: WriteTo> PrefixedWrite for Vec<T> {
    fn write_prefixed_bound<P: WriteTo + TryFrom<usize>>(
        &self,
        writer: &mut impl Write,
        bound: usize,
    ) -> Result<()> {
        self.as_slice().write_prefixed_bound::<P>(writer, bound)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::codec::VarInt;

    #[test]
    fn test_numbers_are_big_endian() {
        let mut buf = Vec::new();
        0x0102_0304_i32.write(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);

        let mut buf = Vec::new();
        1.5_f32.write(&mut buf).unwrap();
        assert_eq!(f32::read(&mut Cursor::new(buf)).unwrap(), 1.5);
    }

    #[test]
    fn test_string_bound_is_enforced() {
        let mut buf = Vec::new();
        "necklace"
            .to_string()
            .write_prefixed::<VarInt>(&mut buf)
            .unwrap();
        assert_eq!(buf[0], 8);

        let err = String::read_prefixed_bound::<VarInt>(&mut Cursor::new(&buf), 4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);

        let ok = String::read_prefixed::<VarInt>(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(ok, "necklace");
    }

    #[test]
    fn test_truncated_input_fails() {
        let buf = [5u8, b'a', b'b'];
        assert!(String::read_prefixed::<VarInt>(&mut Cursor::new(&buf)).is_err());
    }
}
