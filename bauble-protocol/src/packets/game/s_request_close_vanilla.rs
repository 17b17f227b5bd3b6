//! Request to go back to the vanilla inventory (serverbound).

use std::io::{Read, Result, Write};

use bauble_utils::serial::{ReadFrom, WriteTo};

use crate::{packet_traits::ServerPacket, packets::ids::S_REQUEST_CLOSE_VANILLA};

/// The client closes whatever container it has open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SRequestCloseVanilla;

impl ReadFrom for SRequestCloseVanilla {
    fn read(_data: &mut impl Read) -> Result<Self> {
        Ok(Self)
    }
}

impl WriteTo for SRequestCloseVanilla {
    fn write(&self, _writer: &mut impl Write) -> Result<()> {
        Ok(())
    }
}

impl ServerPacket for SRequestCloseVanilla {
    const ID: i32 = S_REQUEST_CLOSE_VANILLA;
    const NAME: &'static str = "request_close_vanilla";
}
