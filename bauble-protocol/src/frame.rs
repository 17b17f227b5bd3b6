//! Length-prefixed frames on the stream.
//!
//! A frame is `VarInt length`, then `VarInt id` and the packet body. The length
//! covers the id and the body.

use std::io::Cursor;

use bauble_utils::{
    codec::VarInt,
    serial::{ReadFrom, WriteTo},
};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::utils::PacketError;

/// Largest frame accepted unless the caller picks another limit.
pub const DEFAULT_MAX_FRAME: usize = 2 * 1024 * 1024;

/// A packet id with its still-encoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPacket {
    /// The packet id.
    pub id: i32,
    /// The encoded packet body.
    pub payload: Vec<u8>,
}

impl RawPacket {
    /// Creates a raw packet.
    #[must_use]
    pub fn new(id: i32, payload: Vec<u8>) -> Self {
        Self { id, payload }
    }

    /// Returns the whole frame, length prefix included.
    pub fn to_frame(&self) -> Result<Vec<u8>, PacketError> {
        let len = VarInt::written_size(self.id) + self.payload.len();
        let len_prefix = VarInt::try_from(len).map_err(|_| PacketError::TooLong(len, i32::MAX as usize))?;

        let mut buf = Vec::with_capacity(VarInt::MAX_SIZE + len);
        len_prefix.write(&mut buf)?;
        VarInt(self.id).write(&mut buf)?;
        buf.extend_from_slice(&self.payload);
        Ok(buf)
    }

    /// Splits a frame body (everything after the length prefix) into id and payload.
    pub fn from_body(body: &[u8]) -> Result<Self, PacketError> {
        let mut cursor = Cursor::new(body);
        let id = VarInt::read(&mut cursor)?.0;
        let start = cursor.position() as usize;
        Ok(Self::new(id, body[start..].to_vec()))
    }

    /// Reads one frame from an async stream.
    pub async fn read_async(
        reader: &mut (impl AsyncRead + Unpin),
        max_frame: usize,
    ) -> Result<Self, PacketError> {
        let len = VarInt::read_async(reader).await?.0;
        let len = usize::try_from(len).map_err(|_| PacketError::NegativeLength(len))?;
        if len > max_frame {
            return Err(PacketError::TooLong(len, max_frame));
        }

        let mut body = vec![0; len];
        reader.read_exact(&mut body).await?;
        Self::from_body(&body)
    }

    /// Writes this packet as one frame and flushes the stream.
    pub async fn write_async(&self, writer: &mut (impl AsyncWrite + Unpin)) -> Result<(), PacketError> {
        let frame = self.to_frame()?;
        writer.write_all(&frame).await?;
        writer.flush().await?;
        Ok(())
    }
}
