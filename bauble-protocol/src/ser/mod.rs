//! Field encodings that are specific to this protocol.

mod nbt;
mod string;

pub use nbt::{MAX_NBT_SIZE, NetworkNbt};
pub use string::{MAX_STRING_BYTES, read_truncated_string};
