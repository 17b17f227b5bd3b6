//! Container close packet (clientbound).

use std::io::{Read, Result, Write};

use bauble_utils::{
    codec::VarInt,
    serial::{ReadFrom, WriteTo},
};

use crate::{packet_traits::ClientPacket, packets::ids::C_CONTAINER_CLOSE};

/// Tells the client to close a container screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CContainerClose {
    /// The container ID to close.
    pub container_id: i32,
}

impl CContainerClose {
    /// Creates a new container close packet.
    #[must_use]
    pub const fn new(container_id: i32) -> Self {
        Self { container_id }
    }
}

impl ReadFrom for CContainerClose {
    fn read(data: &mut impl Read) -> Result<Self> {
        Ok(Self {
            container_id: VarInt::read(data)?.0,
        })
    }
}

impl WriteTo for CContainerClose {
    fn write(&self, writer: &mut impl Write) -> Result<()> {
        VarInt(self.container_id).write(writer)
    }
}

impl ClientPacket for CContainerClose {
    const ID: i32 = C_CONTAINER_CLOSE;
    const NAME: &'static str = "container_close";
}
