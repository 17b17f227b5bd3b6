//! The simulation side of the server: entities, sessions and equipment sync.
//!
//! Everything here runs on one thread. Network tasks hand their work over as
//! [`InboundEvent`]s through a crossbeam channel that [`Server::tick`] drains.

use std::{collections::BTreeMap, num::TryFromIntError, sync::Arc};

use bauble_protocol::packets::{
    CBoundPacket, SBoundPacket,
    game::{CContainerClose, CFullSync, COpenEquipmentScreen, CSlotSync, GroupLayout},
};
use bauble_registry::{ItemStack, Registries};
use crossbeam::channel::{self, Receiver, Sender};
use rustc_hash::FxHashMap;

use crate::{
    command::{CommandDispatcher, CommandFeedback, error::CommandError},
    config::ServerConfig,
    entity::LivingEntity,
    equipment::{EquipmentSupport, SlotCollection},
    player::{Session, SessionId, connection::NetworkConnection},
};

/// Entity kind of the entity each connection controls.
pub const PLAYER_KIND: &str = "player";

/// Work handed to the simulation thread.
pub enum InboundEvent {
    /// A client connected.
    Connected {
        /// The id the network layer assigned.
        session: SessionId,
        /// Where packets for this client go.
        connection: Arc<dyn NetworkConnection>,
    },
    /// A client sent a packet.
    Packet {
        /// The sender.
        session: SessionId,
        /// The decoded packet.
        packet: SBoundPacket,
    },
    /// A client went away.
    Disconnected {
        /// The session that ended.
        session: SessionId,
    },
    /// An admin command line from the console.
    Command(String),
}

/// Handles one kind of serverbound packet.
pub type PacketHandler = fn(&mut Server, SessionId, SBoundPacket);

/// Owns the registries and every entity, session and slot collection.
pub struct Server {
    /// Slot types, icons and item classification.
    pub registries: Registries,
    config: Option<Arc<ServerConfig>>,
    support: EquipmentSupport,
    entities: BTreeMap<i32, LivingEntity>,
    sessions: FxHashMap<SessionId, Session>,
    handlers: FxHashMap<&'static str, PacketHandler>,
    commands: Arc<CommandDispatcher>,
    inbound_tx: Sender<InboundEvent>,
    inbound_rx: Receiver<InboundEvent>,
    next_entity_id: i32,
    tick_count: u64,
}

impl Default for Server {
    fn default() -> Self {
        Self::new(Registries::default(), EquipmentSupport::new())
    }
}

impl Server {
    /// Creates a server with the default packet handlers and commands.
    #[must_use]
    pub fn new(registries: Registries, support: EquipmentSupport) -> Self {
        let (inbound_tx, inbound_rx) = channel::unbounded();
        let mut server = Self {
            registries,
            config: None,
            support,
            entities: BTreeMap::new(),
            sessions: FxHashMap::default(),
            handlers: FxHashMap::default(),
            commands: Arc::new(CommandDispatcher::default()),
            inbound_tx,
            inbound_rx,
            next_entity_id: 1,
            tick_count: 0,
        };
        server.register_handler("request_open", handle_request_open);
        server.register_handler("request_close_vanilla", handle_request_close_vanilla);
        server
    }

    /// Creates a server from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        let mut server = Self::new(config.build_registries(), config.equipment_support());
        server.config = Some(Arc::new(config.clone()));
        server
    }

    /// Starts a new merge epoch, rebuilding the registries from `config`.
    ///
    /// Existing slot collections are left as they are.
    pub fn reload_registries(&mut self, config: &ServerConfig) {
        self.registries.reset();
        config.populate(&mut self.registries);
        log::info!("Reloaded {} slot types", self.registries.types.len());
    }

    /// Rebuilds the registries from the configuration the server was created with.
    ///
    /// Returns the number of slot types afterwards, or `None` when the server was
    /// not built from a configuration.
    pub fn reload(&mut self) -> Option<usize> {
        let config = self.config.clone()?;
        self.reload_registries(&config);
        Some(self.registries.types.len())
    }

    /// Returns a sender network tasks use to reach this server.
    #[must_use]
    pub fn inbound(&self) -> Sender<InboundEvent> {
        self.inbound_tx.clone()
    }

    /// Sets the handler for packets with the given name.
    pub fn register_handler(&mut self, name: &'static str, handler: PacketHandler) {
        if self.handlers.insert(name, handler).is_some() {
            log::debug!("Replaced handler for {name}");
        }
    }

    /// Number of ticks run so far.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Runs one tick: applies queued events, then sends pending equipment updates.
    pub fn tick(&mut self) {
        while let Ok(event) = self.inbound_rx.try_recv() {
            self.handle_event(event);
        }

        let closed: Vec<SessionId> = self
            .sessions
            .values()
            .filter(|session| session.is_closed())
            .map(Session::id)
            .collect();
        for session in closed {
            self.disconnect(session);
        }

        self.flush_sync();
        self.tick_count += 1;
    }

    fn handle_event(&mut self, event: InboundEvent) {
        match event {
            InboundEvent::Connected {
                session,
                connection,
            } => {
                self.connect(session, connection);
            }
            InboundEvent::Packet { session, packet } => self.dispatch(session, packet),
            InboundEvent::Disconnected { session } => self.disconnect(session),
            InboundEvent::Command(line) => match self.execute_command(&line) {
                Ok(feedback) => log::info!("{feedback}"),
                Err(err) => log::warn!("Command \"{}\" failed: {err}", line.trim()),
            },
        }
    }

    /// Routes a packet to the handler registered for its kind.
    pub fn dispatch(&mut self, session: SessionId, packet: SBoundPacket) {
        if !self.sessions.contains_key(&session) {
            log::debug!("Dropping {} from unknown session {session}", packet.name());
            return;
        }
        match self.handlers.get(packet.name()).copied() {
            Some(handler) => handler(self, session, packet),
            None => log::warn!("No handler for {} from session {session}", packet.name()),
        }
    }

    /// Registers a client, spawning the player entity it controls.
    pub fn connect(&mut self, id: SessionId, connection: Arc<dyn NetworkConnection>) -> i32 {
        let entity_id = self.spawn_entity(PLAYER_KIND);
        if let Some(previous) = self.sessions.insert(id, Session::new(id, connection, entity_id)) {
            log::warn!("Session {id} connected twice");
            self.remove_entity(previous.entity_id());
        }
        self.track(id, entity_id);
        log::info!("Session {id} joined as entity {entity_id}");
        entity_id
    }

    /// Drops a client and the entity it controlled.
    pub fn disconnect(&mut self, id: SessionId) {
        let Some(session) = self.sessions.remove(&id) else {
            return;
        };
        session.disconnect();
        self.remove_entity(session.entity_id());
        log::info!("Session {id} left");
    }

    /// Returns a connected session.
    #[must_use]
    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// Creates an entity. Kinds with equipment support get their default slots.
    pub fn spawn_entity(&mut self, kind: &str) -> i32 {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        let equipment = self.support.attach(kind, &self.registries.types);
        self.entities.insert(id, LivingEntity::new(id, kind, equipment));
        id
    }

    /// Removes an entity along with its equipment.
    pub fn remove_entity(&mut self, id: i32) -> Option<LivingEntity> {
        let entity = self.entities.remove(&id)?;
        for session in self.sessions.values_mut() {
            session.untrack(id);
        }
        Some(entity)
    }

    /// Returns an entity.
    #[must_use]
    pub fn entity(&self, id: i32) -> Option<&LivingEntity> {
        self.entities.get(&id)
    }

    /// Returns the equipment of an entity, if it exists and has any.
    #[must_use]
    pub fn equipment(&self, id: i32) -> Option<&SlotCollection> {
        self.entities.get(&id)?.equipment()
    }

    /// Runs `f` on an entity's equipment together with the registries.
    ///
    /// Returns `None` without calling `f` when the entity is missing or has no
    /// equipment.
    pub fn with_equipment<R>(
        &mut self,
        id: i32,
        f: impl FnOnce(&mut SlotCollection, &mut Registries) -> R,
    ) -> Option<R> {
        let equipment = self.entities.get_mut(&id)?.equipment_mut()?;
        Some(f(equipment, &mut self.registries))
    }

    /// Makes a session mirror an entity and sends it the entity's current equipment.
    pub fn track(&mut self, session: SessionId, entity_id: i32) -> bool {
        let Some(entity) = self.entities.get(&entity_id) else {
            return false;
        };
        let Some(session) = self.sessions.get_mut(&session) else {
            return false;
        };
        if !session.track(entity_id) {
            return false;
        }
        if let Some(equipment) = entity.equipment() {
            match full_state(entity_id, equipment) {
                Ok(packets) => {
                    for packet in packets {
                        session.send_packet(packet);
                    }
                }
                Err(err) => log::warn!("Cannot send equipment of entity {entity_id}: {err}"),
            }
        }
        true
    }

    /// Stops a session mirroring an entity.
    pub fn untrack(&mut self, session: SessionId, entity_id: i32) -> bool {
        self.sessions
            .get_mut(&session)
            .is_some_and(|session| session.untrack(entity_id))
    }

    /// Runs an admin command line.
    pub fn execute_command(&mut self, line: &str) -> Result<CommandFeedback, CommandError> {
        let commands = Arc::clone(&self.commands);
        commands.execute(line, self)
    }

    /// Sends every pending equipment change to the sessions tracking it.
    ///
    /// Collections flagged for a full resync send their layout followed by every
    /// occupied slot; the others send one `SlotSync` per changed slot.
    pub fn flush_sync(&mut self) {
        for (&entity_id, entity) in &mut self.entities {
            let Some(equipment) = entity.equipment_mut() else {
                continue;
            };
            let packets = if equipment.take_full_sync() {
                full_state(entity_id, equipment)
            } else {
                equipment
                    .take_changed_slots()
                    .into_iter()
                    .filter_map(|(type_id, index)| {
                        let stack = equipment.get_stack(&type_id, index)?;
                        Some(slot_sync(entity_id, &type_id, index, stack))
                    })
                    .collect()
            };
            let packets = match packets {
                Ok(packets) if !packets.is_empty() => packets,
                Ok(_) => continue,
                Err(err) => {
                    log::warn!("Cannot sync equipment of entity {entity_id}: {err}");
                    continue;
                }
            };
            for session in self
                .sessions
                .values()
                .filter(|session| session.is_tracking(entity_id))
            {
                for packet in &packets {
                    session.send_packet(packet.clone());
                }
            }
        }
    }
}

fn slot_sync(
    entity_id: i32,
    type_id: &str,
    index: usize,
    stack: &ItemStack,
) -> Result<CBoundPacket, TryFromIntError> {
    Ok(CSlotSync::new(entity_id, type_id, i32::try_from(index)?, stack).into())
}

/// The packets that rebuild a client's mirror of `equipment` from scratch.
fn full_state(entity_id: i32, equipment: &SlotCollection) -> Result<Vec<CBoundPacket>, TryFromIntError> {
    let groups = equipment
        .layout()
        .into_iter()
        .map(|(id, size)| Ok(GroupLayout::new(id, i32::try_from(size)?)))
        .collect::<Result<_, TryFromIntError>>()?;
    let mut packets = vec![CFullSync::new(entity_id, groups).into()];
    for (type_id, group) in equipment.groups() {
        for (index, stack) in group.iter().filter(|(_, stack)| !stack.is_empty()) {
            packets.push(slot_sync(entity_id, type_id, index, stack)?);
        }
    }
    Ok(packets)
}

fn handle_request_open(server: &mut Server, session: SessionId, packet: SBoundPacket) {
    let SBoundPacket::RequestOpen(request) = packet else {
        return;
    };
    let Some(session) = server.sessions.get_mut(&session) else {
        return;
    };
    let container = session.open(request.cursor_x, request.cursor_y);
    session.send_packet(COpenEquipmentScreen::new(
        container.container_id,
        container.cursor_x,
        container.cursor_y,
    ));
}

fn handle_request_close_vanilla(server: &mut Server, session: SessionId, packet: SBoundPacket) {
    if !matches!(packet, SBoundPacket::RequestCloseVanilla(_)) {
        return;
    }
    let Some(session) = server.sessions.get_mut(&session) else {
        return;
    };
    if let Some(container) = session.close_container() {
        session.send_packet(CContainerClose::new(container.container_id));
    }
}

#[cfg(test)]
mod tests {
    use bauble_protocol::packets::game::{SRequestCloseVanilla, SRequestOpen};
    use bauble_registry::{DeclarationBus, ItemStack, TypeDeclaration};
    use bauble_utils::Identifier;

    use super::*;
    use crate::{client::ClientWorld, player::connection::recording::RecordingConnection};

    fn registries(decls: &[(&str, u32)]) -> Registries {
        let mut registries = Registries::default();
        let mut bus = DeclarationBus::new();
        for &(id, size) in decls {
            bus.register_type("test", TypeDeclaration::new(id).size(size));
        }
        registries.process_declarations(&mut bus);
        registries
    }

    fn server() -> Server {
        Server::new(
            registries(&[("necklace", 1), ("ring", 2)]),
            EquipmentSupport::from_kinds([PLAYER_KIND]),
        )
    }

    fn join(server: &mut Server, id: SessionId) -> (Arc<RecordingConnection>, i32) {
        let connection = Arc::new(RecordingConnection::default());
        server
            .inbound()
            .send(InboundEvent::Connected {
                session: id,
                connection: connection.clone(),
            })
            .unwrap();
        server.tick();
        let entity = server.session(id).unwrap().entity_id();
        (connection, entity)
    }

    fn gem() -> ItemStack {
        ItemStack::new(Identifier::new("bauble", "gem"))
    }

    #[test]
    fn test_join_sends_layout() {
        let mut server = server();
        let (connection, entity) = join(&mut server, 1);

        let sent = connection.take();
        assert_eq!(sent.len(), 1);
        let CBoundPacket::FullSync(sync) = &sent[0] else {
            panic!("expected a full sync, got {sent:?}");
        };
        assert_eq!(sync.entity_id, entity);
        assert_eq!(
            sync.groups,
            [GroupLayout::new("necklace", 1), GroupLayout::new("ring", 2)]
        );
    }

    #[test]
    fn test_slot_writes_are_sent_at_end_of_tick() {
        let mut server = server();
        let (connection, entity) = join(&mut server, 1);
        connection.take();

        server.with_equipment(entity, |equipment, _| {
            equipment.set_stack("ring", 1, gem());
        });
        assert!(connection.take().is_empty());

        server.tick();
        let sent = connection.take();
        assert_eq!(sent.len(), 1);
        let CBoundPacket::SlotSync(sync) = &sent[0] else {
            panic!("expected a slot sync, got {sent:?}");
        };
        assert_eq!((sync.type_id.as_str(), sync.slot), ("ring", 1));

        server.tick();
        assert!(connection.take().is_empty());
    }

    #[test]
    fn test_structural_change_sends_full_state() {
        let mut server = server();
        let (connection, entity) = join(&mut server, 1);
        connection.take();

        server.with_equipment(entity, |equipment, _| {
            equipment.set_stack("ring", 0, gem());
            equipment.add_slots("ring", 1);
        });
        server.tick();

        let sent = connection.take();
        assert_eq!(sent.len(), 2);
        assert!(matches!(&sent[0], CBoundPacket::FullSync(sync) if sync.groups[1].size == 3));
        assert!(matches!(&sent[1], CBoundPacket::SlotSync(sync) if sync.slot == 0));
    }

    #[test]
    fn test_open_and_close_requests() {
        let mut server = server();
        let (connection, _) = join(&mut server, 1);
        connection.take();
        let inbound = server.inbound();

        let close = |inbound: &Sender<InboundEvent>| {
            inbound
                .send(InboundEvent::Packet {
                    session: 1,
                    packet: SRequestCloseVanilla.into(),
                })
                .unwrap();
        };

        close(&inbound);
        server.tick();
        assert!(connection.take().is_empty());

        inbound
            .send(InboundEvent::Packet {
                session: 1,
                packet: SRequestOpen::new(40.0, 80.5).into(),
            })
            .unwrap();
        server.tick();
        let sent = connection.take();
        let CBoundPacket::OpenEquipmentScreen(open) = &sent[0] else {
            panic!("expected an open screen, got {sent:?}");
        };
        assert_eq!((open.cursor_x, open.cursor_y), (40.0, 80.5));
        let container_id = open.container_id;
        assert_eq!(
            server.session(1).unwrap().open_container().unwrap().container_id,
            container_id
        );

        close(&inbound);
        server.tick();
        let sent = connection.take();
        assert!(
            matches!(&sent[..], [CBoundPacket::ContainerClose(c)] if c.container_id == container_id)
        );
        assert!(server.session(1).unwrap().open_container().is_none());
    }

    #[test]
    fn test_disconnect_removes_player() {
        let mut server = server();
        let (connection, entity) = join(&mut server, 1);

        connection.close();
        server.tick();
        assert!(server.session(1).is_none());
        assert!(server.entity(entity).is_none());

        server
            .inbound()
            .send(InboundEvent::Packet {
                session: 1,
                packet: SRequestCloseVanilla.into(),
            })
            .unwrap();
        server.tick();
    }

    #[test]
    fn test_reconnect_replaces_player_everywhere() {
        let mut server = server();
        let (_, old_entity) = join(&mut server, 1);
        let (second, _) = join(&mut server, 2);
        assert!(server.track(2, old_entity));
        second.take();

        let (_, new_entity) = join(&mut server, 1);
        assert_ne!(new_entity, old_entity);
        assert!(server.entity(old_entity).is_none());
        assert!(!server.session(2).unwrap().is_tracking(old_entity));

        server.track(2, new_entity);
        second.take();
        server.with_equipment(new_entity, |equipment, _| {
            equipment.set_stack("ring", 0, gem());
        });
        server.tick();
        assert!(
            matches!(&second.take()[..], [CBoundPacket::SlotSync(sync)] if sync.entity_id == new_entity)
        );
    }

    #[test]
    fn test_other_sessions_see_tracked_entities() {
        let mut server = server();
        let (first, first_entity) = join(&mut server, 1);
        let (second, _) = join(&mut server, 2);
        first.take();
        second.take();

        assert!(server.track(2, first_entity));
        assert!(!server.track(2, first_entity));
        assert_eq!(second.take().len(), 1);

        server.with_equipment(first_entity, |equipment, _| {
            equipment.set_stack("necklace", 0, gem());
        });
        server.tick();
        assert_eq!(first.take().len(), 1);
        assert_eq!(second.take().len(), 1);

        assert!(server.untrack(2, first_entity));
        server.with_equipment(first_entity, |equipment, _| {
            equipment.clear(None);
        });
        server.tick();
        assert_eq!(first.take().len(), 1);
        assert!(second.take().is_empty());
    }

    #[test]
    fn test_mirror_follows_server() {
        let mut server = server();
        let (connection, entity) = join(&mut server, 1);

        let mut client = ClientWorld::new();
        client.add_entity(entity, true);
        for packet in connection.take() {
            client.apply(packet).unwrap();
        }

        server.with_equipment(entity, |equipment, _| {
            equipment.set_stack("ring", 1, gem());
            equipment.set_stack("necklace", 0, gem());
        });
        server.tick();
        server.with_equipment(entity, |equipment, registries| {
            equipment.disable("necklace");
            equipment.add_slots("ring", 2);
            equipment.enable(&registries.types, "necklace");
        });
        server.tick();
        for packet in connection.take() {
            client.apply(packet).unwrap();
        }

        let server_side = server.equipment(entity).unwrap();
        let mirror = client.equipment(entity).unwrap();
        assert_eq!(mirror.layout(), server_side.layout());
        assert_eq!(mirror.layout(), [("necklace".to_string(), 1), ("ring".to_string(), 4)]);
        assert!(mirror.get_stack("ring", 1).unwrap().is(gem().item()));
        assert!(mirror.get_stack("necklace", 0).unwrap().is_empty());
    }

    #[test]
    fn test_amulet_scenario() {
        let mut registries = Registries::default();
        let mut bus = DeclarationBus::new();
        bus.register_type("a", TypeDeclaration::new("amulet").size(1));
        bus.register_type("b", TypeDeclaration::new("amulet").size(2));
        registries.process_declarations(&mut bus);
        assert_eq!(registries.types.lookup("amulet").unwrap().size(), 2);

        let mut server = Server::new(registries, EquipmentSupport::from_kinds([PLAYER_KIND]));
        let (_, entity) = join(&mut server, 1);
        assert_eq!(
            server.equipment(entity).unwrap().layout(),
            [("amulet".to_string(), 2)]
        );

        let mut bus = DeclarationBus::new();
        bus.modify_type("c", TypeDeclaration::new("amulet").size(1).enabled(false));
        server.registries.process_declarations(&mut bus);
        let amulet = server.registries.types.lookup("amulet").unwrap();
        assert_eq!((amulet.size(), amulet.is_enabled()), (2, false));

        // The existing group survives; enabling again changes nothing.
        let enabled = server
            .with_equipment(entity, |equipment, registries| {
                equipment.enable(&registries.types, "amulet")
            })
            .unwrap();
        assert!(!enabled);
        assert_eq!(
            server.equipment(entity).unwrap().layout(),
            [("amulet".to_string(), 2)]
        );

        server.with_equipment(entity, |equipment, registries| {
            equipment.disable("amulet");
            equipment.enable(&registries.types, "amulet");
        });
        assert!(server.equipment(entity).unwrap().is_empty());

        // New entities no longer get the disabled type.
        let later = server.spawn_entity(PLAYER_KIND);
        assert!(server.equipment(later).unwrap().is_empty());
    }
}
