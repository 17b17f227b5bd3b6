//! Traits tying packet structs to their ids.

use bauble_utils::serial::{ReadFrom, WriteTo};

/// A packet sent from the server to the client.
pub trait ClientPacket: ReadFrom + WriteTo {
    /// The packet id inside the clientbound id space.
    const ID: i32;
    /// A readable name for logs.
    const NAME: &'static str;
}

/// A packet sent from the client to the server.
pub trait ServerPacket: ReadFrom + WriteTo {
    /// The packet id inside the serverbound id space.
    const ID: i32;
    /// A readable name for logs.
    const NAME: &'static str;
}
