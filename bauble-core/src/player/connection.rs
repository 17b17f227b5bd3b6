//! This module contains the `NetworkConnection` trait that abstracts network connections.
//!
//! The trait is object-safe so the server can hold `dyn NetworkConnection` for both
//! TCP clients and recording connections used in tests.

use bauble_protocol::frame::RawPacket;

/// An object-safe trait for client connections.
///
/// Packets are encoded into a [`RawPacket`] before they reach the connection. The
/// [`Session`](super::Session) provides the generic `send_packet` helper that
/// does the encoding.
pub trait NetworkConnection: Send + Sync {
    /// Queues a pre-encoded packet.
    fn send_raw(&self, packet: RawPacket);

    /// Closes the connection.
    fn close(&self);

    /// Returns whether the connection is closed.
    fn closed(&self) -> bool;
}

#[cfg(test)]
pub(crate) mod recording {
    use bauble_protocol::packets::CBoundPacket;
    use parking_lot::Mutex;

    use super::*;

    /// Keeps every packet sent through it.
    #[derive(Default)]
    pub struct RecordingConnection {
        sent: Mutex<Vec<RawPacket>>,
        closed: Mutex<bool>,
    }

    impl RecordingConnection {
        /// Decodes and removes everything sent so far.
        pub fn take(&self) -> Vec<CBoundPacket> {
            self.sent
                .lock()
                .drain(..)
                .map(|raw| CBoundPacket::from_raw_packet(&raw).unwrap())
                .collect()
        }
    }

    impl NetworkConnection for RecordingConnection {
        fn send_raw(&self, packet: RawPacket) {
            self.sent.lock().push(packet);
        }

        fn close(&self) {
            *self.closed.lock() = true;
        }

        fn closed(&self) -> bool {
            *self.closed.lock()
        }
    }
}
