//! Protocol errors.

use std::io;

use thiserror::Error;

/// Everything that can go wrong while framing, decoding or encoding a packet.
#[derive(Debug, Error)]
pub enum PacketError {
    /// The underlying stream or buffer failed, or a field was malformed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// No packet is registered under this id for the direction.
    #[error("Unknown packet id {0:#04x}")]
    UnknownPacket(i32),
    /// A frame announced more bytes than the limit allows.
    #[error("Frame of {0} bytes exceeds the limit of {1}")]
    TooLong(usize, usize),
    /// A frame length prefix was negative.
    #[error("Negative frame length {0}")]
    NegativeLength(i32),
    /// Bytes were left over after the packet body was decoded.
    #[error("{0} trailing bytes after {1}")]
    TrailingBytes(usize, &'static str),
    /// The outgoing queue of a connection is gone.
    #[error("Failed to send packet: {0}")]
    SendError(String),
}
