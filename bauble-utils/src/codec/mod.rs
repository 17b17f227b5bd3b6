//! Wire codecs shared by the protocol crate.

mod var_int;

pub use var_int::VarInt;
