//! Wire format for the equipment protocol.
//!
//! Packets are framed by [`frame::RawPacket`] and decoded through
//! [`packets::SBoundPacket`] or [`packets::CBoundPacket`] depending on the direction.

pub mod frame;
pub mod packet_traits;
pub mod packets;
pub mod ser;
pub mod utils;
