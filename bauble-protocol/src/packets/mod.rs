//! Packet definitions and the per-direction packet enums.

pub mod game;
pub mod ids;

use std::io::Cursor;

use bauble_utils::serial::{ReadFrom, WriteTo};

use crate::{
    frame::RawPacket,
    packet_traits::{ClientPacket, ServerPacket},
    utils::PacketError,
};
use game::{
    CContainerClose, CFullSync, COpenEquipmentScreen, CSlotSync, SRequestCloseVanilla,
    SRequestOpen,
};

/// Decodes a packet body and rejects leftover bytes.
fn decode_body<T: ReadFrom>(payload: &[u8], name: &'static str) -> Result<T, PacketError> {
    let mut cursor = Cursor::new(payload);
    let packet = T::read(&mut cursor)?;
    let remaining = payload.len() - cursor.position() as usize;
    if remaining > 0 {
        return Err(PacketError::TrailingBytes(remaining, name));
    }
    Ok(packet)
}

fn encode_body(packet: &impl WriteTo) -> Result<Vec<u8>, PacketError> {
    let mut payload = Vec::new();
    packet.write(&mut payload)?;
    Ok(payload)
}

/// Every packet a client can send.
#[derive(Debug, Clone)]
pub enum SBoundPacket {
    /// See [`SRequestOpen`].
    RequestOpen(SRequestOpen),
    /// See [`SRequestCloseVanilla`].
    RequestCloseVanilla(SRequestCloseVanilla),
}

impl SBoundPacket {
    /// Decodes a serverbound packet from its raw frame.
    pub fn from_raw_packet(raw: &RawPacket) -> Result<Self, PacketError> {
        match raw.id {
            SRequestOpen::ID => Ok(Self::RequestOpen(decode_body(
                &raw.payload,
                SRequestOpen::NAME,
            )?)),
            SRequestCloseVanilla::ID => Ok(Self::RequestCloseVanilla(decode_body(
                &raw.payload,
                SRequestCloseVanilla::NAME,
            )?)),
            id => Err(PacketError::UnknownPacket(id)),
        }
    }

    /// Encodes this packet into a raw frame.
    pub fn to_raw_packet(&self) -> Result<RawPacket, PacketError> {
        let (id, payload) = match self {
            Self::RequestOpen(p) => (SRequestOpen::ID, encode_body(p)?),
            Self::RequestCloseVanilla(p) => (SRequestCloseVanilla::ID, encode_body(p)?),
        };
        Ok(RawPacket::new(id, payload))
    }

    /// Returns the readable name of the packet.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::RequestOpen(_) => SRequestOpen::NAME,
            Self::RequestCloseVanilla(_) => SRequestCloseVanilla::NAME,
        }
    }
}

/// Every packet the server can send.
#[derive(Debug, Clone)]
pub enum CBoundPacket {
    /// See [`CFullSync`].
    FullSync(CFullSync),
    /// See [`CSlotSync`].
    SlotSync(CSlotSync),
    /// See [`COpenEquipmentScreen`].
    OpenEquipmentScreen(COpenEquipmentScreen),
    /// See [`CContainerClose`].
    ContainerClose(CContainerClose),
}

impl CBoundPacket {
    /// Decodes a clientbound packet from its raw frame.
    pub fn from_raw_packet(raw: &RawPacket) -> Result<Self, PacketError> {
        let payload = &raw.payload;
        Ok(match raw.id {
            CFullSync::ID => Self::FullSync(decode_body(payload, CFullSync::NAME)?),
            CSlotSync::ID => Self::SlotSync(decode_body(payload, CSlotSync::NAME)?),
            COpenEquipmentScreen::ID => {
                Self::OpenEquipmentScreen(decode_body(payload, COpenEquipmentScreen::NAME)?)
            }
            CContainerClose::ID => {
                Self::ContainerClose(decode_body(payload, CContainerClose::NAME)?)
            }
            id => return Err(PacketError::UnknownPacket(id)),
        })
    }

    /// Encodes this packet into a raw frame.
    pub fn to_raw_packet(&self) -> Result<RawPacket, PacketError> {
        let (id, payload) = match self {
            Self::FullSync(p) => (CFullSync::ID, encode_body(p)?),
            Self::SlotSync(p) => (CSlotSync::ID, encode_body(p)?),
            Self::OpenEquipmentScreen(p) => (COpenEquipmentScreen::ID, encode_body(p)?),
            Self::ContainerClose(p) => (CContainerClose::ID, encode_body(p)?),
        };
        Ok(RawPacket::new(id, payload))
    }

    /// Returns the readable name of the packet.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::FullSync(_) => CFullSync::NAME,
            Self::SlotSync(_) => CSlotSync::NAME,
            Self::OpenEquipmentScreen(_) => COpenEquipmentScreen::NAME,
            Self::ContainerClose(_) => CContainerClose::NAME,
        }
    }
}

macro_rules! impl_from_packet {
    ($target:ident, $($variant:ident($packet:ty)),* $(,)?) => {
        $(
            impl From<$packet> for $target {
                fn from(packet: $packet) -> Self {
                    Self::$variant(packet)
                }
            }
        )*
    };
}

impl_from_packet!(
    SBoundPacket,
    RequestOpen(SRequestOpen),
    RequestCloseVanilla(SRequestCloseVanilla),
);
impl_from_packet!(
    CBoundPacket,
    FullSync(CFullSync),
    SlotSync(CSlotSync),
    OpenEquipmentScreen(COpenEquipmentScreen),
    ContainerClose(CContainerClose),
);
