//! Open equipment screen packet (clientbound).

use std::io::{Read, Result, Write};

use bauble_utils::{
    codec::VarInt,
    serial::{ReadFrom, WriteTo},
};

use crate::{packet_traits::ClientPacket, packets::ids::C_OPEN_EQUIPMENT_SCREEN};

/// Opens the equipment screen, restoring the cursor the client reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct COpenEquipmentScreen {
    /// The container ID for this screen.
    pub container_id: i32,
    /// Cursor x position to restore.
    pub cursor_x: f32,
    /// Cursor y position to restore.
    pub cursor_y: f32,
}

impl COpenEquipmentScreen {
    /// Creates a new open screen packet.
    #[must_use]
    pub const fn new(container_id: i32, cursor_x: f32, cursor_y: f32) -> Self {
        Self {
            container_id,
            cursor_x,
            cursor_y,
        }
    }
}

impl ReadFrom for COpenEquipmentScreen {
    fn read(data: &mut impl Read) -> Result<Self> {
        Ok(Self {
            container_id: VarInt::read(data)?.0,
            cursor_x: f32::read(data)?,
            cursor_y: f32::read(data)?,
        })
    }
}

impl WriteTo for COpenEquipmentScreen {
    fn write(&self, writer: &mut impl Write) -> Result<()> {
        VarInt(self.container_id).write(writer)?;
        self.cursor_x.write(writer)?;
        self.cursor_y.write(writer)
    }
}

impl ClientPacket for COpenEquipmentScreen {
    const ID: i32 = C_OPEN_EQUIPMENT_SCREEN;
    const NAME: &'static str = "open_equipment_screen";
}
