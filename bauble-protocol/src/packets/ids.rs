//! Packet ids. Serverbound and clientbound packets use separate id spaces.

/// Serverbound: the client wants the equipment screen opened.
pub const S_REQUEST_OPEN: i32 = 0x00;
/// Serverbound: the client went back to the vanilla inventory.
pub const S_REQUEST_CLOSE_VANILLA: i32 = 0x01;

/// Clientbound: every slot group of an entity, sizes only.
pub const C_FULL_SYNC: i32 = 0x00;
/// Clientbound: the contents of one slot.
pub const C_SLOT_SYNC: i32 = 0x01;
/// Clientbound: open the equipment screen.
pub const C_OPEN_EQUIPMENT_SCREEN: i32 = 0x02;
/// Clientbound: close a container screen.
pub const C_CONTAINER_CLOSE: i32 = 0x03;
