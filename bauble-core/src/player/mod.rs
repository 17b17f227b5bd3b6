//! Connected clients and the per-connection state the server keeps for them.

pub mod connection;

use std::{collections::BTreeSet, sync::Arc};

use bauble_protocol::packets::CBoundPacket;

use connection::NetworkConnection;

/// Identifies a connection for its whole lifetime.
pub type SessionId = u64;

/// The container a session currently has open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenContainer {
    /// The id the client knows the container by.
    pub container_id: i32,
    /// Cursor x position captured when the container was opened.
    pub cursor_x: f32,
    /// Cursor y position captured when the container was opened.
    pub cursor_y: f32,
}

/// Server-side state for one connected client.
pub struct Session {
    id: SessionId,
    connection: Arc<dyn NetworkConnection>,
    entity_id: i32,
    /// Entities whose equipment this client mirrors.
    tracked: BTreeSet<i32>,
    open_container: Option<OpenContainer>,
    container_counter: i32,
}

impl Session {
    /// Creates a session controlling `entity_id`.
    pub fn new(id: SessionId, connection: Arc<dyn NetworkConnection>, entity_id: i32) -> Self {
        Self {
            id,
            connection,
            entity_id,
            tracked: BTreeSet::new(),
            open_container: None,
            container_counter: 0,
        }
    }

    /// The session id.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The entity this client controls.
    #[must_use]
    pub fn entity_id(&self) -> i32 {
        self.entity_id
    }

    /// Encodes a packet and queues it on the connection.
    pub fn send_packet(&self, packet: impl Into<CBoundPacket>) {
        let packet = packet.into();
        match packet.to_raw_packet() {
            Ok(raw) => self.connection.send_raw(raw),
            Err(err) => log::warn!(
                "Failed to encode {} for session {}: {err}",
                packet.name(),
                self.id
            ),
        }
    }

    /// Returns whether this client mirrors `entity_id`.
    #[must_use]
    pub fn is_tracking(&self, entity_id: i32) -> bool {
        self.tracked.contains(&entity_id)
    }

    /// Starts mirroring an entity. Returns false if it already was.
    pub fn track(&mut self, entity_id: i32) -> bool {
        self.tracked.insert(entity_id)
    }

    /// Stops mirroring an entity.
    pub fn untrack(&mut self, entity_id: i32) -> bool {
        self.tracked.remove(&entity_id)
    }

    /// Returns the open container.
    #[must_use]
    pub fn open_container(&self) -> Option<OpenContainer> {
        self.open_container
    }

    /// Opens a new container, returning it.
    pub fn open(&mut self, cursor_x: f32, cursor_y: f32) -> OpenContainer {
        // Container ids cycle through 1..=100; 0 is the player's own inventory.
        self.container_counter = self.container_counter % 100 + 1;
        let container = OpenContainer {
            container_id: self.container_counter,
            cursor_x,
            cursor_y,
        };
        self.open_container = Some(container);
        container
    }

    /// Closes the open container, returning it.
    pub fn close_container(&mut self) -> Option<OpenContainer> {
        self.open_container.take()
    }

    /// Closes the underlying connection.
    pub fn disconnect(&self) {
        self.connection.close();
    }

    /// Returns whether the underlying connection is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.connection.closed()
    }
}
