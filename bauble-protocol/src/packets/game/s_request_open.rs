//! Request to open the equipment screen (serverbound).

use std::io::{Read, Result, Write};

use bauble_utils::serial::{ReadFrom, WriteTo};

use crate::{packet_traits::ServerPacket, packets::ids::S_REQUEST_OPEN};

/// The client asks for its equipment screen.
///
/// The cursor position is echoed back so the client can put the mouse where it
/// was when it switches screens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SRequestOpen {
    /// Cursor x position on the previous screen.
    pub cursor_x: f32,
    /// Cursor y position on the previous screen.
    pub cursor_y: f32,
}

impl SRequestOpen {
    /// Creates a new open request.
    #[must_use]
    pub const fn new(cursor_x: f32, cursor_y: f32) -> Self {
        Self { cursor_x, cursor_y }
    }
}

impl ReadFrom for SRequestOpen {
    fn read(data: &mut impl Read) -> Result<Self> {
        Ok(Self {
            cursor_x: f32::read(data)?,
            cursor_y: f32::read(data)?,
        })
    }
}

impl WriteTo for SRequestOpen {
    fn write(&self, writer: &mut impl Write) -> Result<()> {
        self.cursor_x.write(writer)?;
        self.cursor_y.write(writer)
    }
}

impl ServerPacket for SRequestOpen {
    const ID: i32 = S_REQUEST_OPEN;
    const NAME: &'static str = "request_open";
}
