//! Equipment packets exchanged while in game.

mod c_container_close;
mod c_full_sync;
mod c_open_equipment_screen;
mod c_slot_sync;
mod s_request_close_vanilla;
mod s_request_open;
mod slot_data;

pub use c_container_close::CContainerClose;
pub use c_full_sync::{CFullSync, GroupLayout};
pub use c_open_equipment_screen::COpenEquipmentScreen;
pub use c_slot_sync::CSlotSync;
pub use s_request_close_vanilla::SRequestCloseVanilla;
pub use s_request_open::SRequestOpen;
pub use slot_data::SlotData;

/// Longest slot type identifier carried by a packet. Longer ones are cut on decode.
pub const MAX_SLOT_TYPE_LENGTH: usize = 25;
