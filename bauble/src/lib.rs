//! # Bauble
//!
//! The server binary's library half: the TCP front-end, the simulation thread
//! and the console reader.

use std::{
    net::{Ipv4Addr, SocketAddrV4},
    sync::Arc,
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use anyhow::Context;
use bauble_core::{InboundEvent, Server, ServerConfig};
use bauble_protocol::frame::DEFAULT_MAX_FRAME;
use crossbeam::channel::Sender;
use tokio::{
    io::{AsyncBufReadExt, BufReader, stdin},
    net::TcpListener,
    select, spawn,
};
use tokio_util::sync::CancellationToken;

use crate::network::TcpClient;

pub mod logger;
/// The networking module.
pub mod network;

/// The running server: the listener, the simulation thread and the console reader.
pub struct BaubleServer {
    /// Cancelled to shut everything down.
    pub cancel_token: CancellationToken,
    /// The server's listen address.
    pub bind_address: SocketAddrV4,
    tick_interval: Duration,
    inbound: Sender<InboundEvent>,
    simulation: Option<Server>,
    simulation_thread: Option<JoinHandle<()>>,
}

impl BaubleServer {
    /// Builds the simulation from `config` without starting anything.
    #[must_use]
    pub fn new(config: &ServerConfig) -> Self {
        log::info!("Starting Bauble Server");

        let simulation = Server::from_config(config);
        log::info!(
            "Loaded {} slot types from {} producers",
            simulation.registries.types.len(),
            config.producers.len()
        );

        Self {
            cancel_token: CancellationToken::new(),
            bind_address: SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, config.server_port),
            tick_interval: Duration::from_secs(1) / config.tick_rate.max(1),
            inbound: simulation.inbound(),
            simulation: Some(simulation),
            simulation_thread: None,
        }
    }

    /// Binds the listener and starts the simulation, the accept loop and the console.
    pub async fn start(&mut self) -> anyhow::Result<()> {
        let tcp_listener = TcpListener::bind(self.bind_address)
            .await
            .with_context(|| format!("Failed to bind to {}", self.bind_address))?;

        if let Some(simulation) = self.simulation.take() {
            let cancel_token = self.cancel_token.clone();
            let tick_interval = self.tick_interval;
            let handle = thread::Builder::new()
                .name("simulation".to_string())
                .spawn(move || run_simulation(simulation, tick_interval, &cancel_token))
                .context("Failed to spawn the simulation thread")?;
            self.simulation_thread = Some(handle);
        }

        self.start_accept_loop(tcp_listener);
        self.start_console();

        log::info!("Started Bauble Server on {}", self.bind_address);
        Ok(())
    }

    fn start_accept_loop(&self, tcp_listener: TcpListener) {
        let cancel_token = self.cancel_token.clone();
        let inbound = self.inbound.clone();
        let mut client_id = 0;

        spawn(async move {
            loop {
                select! {
                    () = cancel_token.cancelled() => break,
                    accept_result = tcp_listener.accept() => {
                        let Ok((connection, address)) = accept_result else {
                            continue;
                        };
                        if let Err(e) = connection.set_nodelay(true) {
                            log::warn!("Failed to set TCP_NODELAY: {e}");
                        }
                        let (client, outgoing, reader, writer) = TcpClient::new(
                            connection,
                            address,
                            client_id,
                            cancel_token.child_token(),
                            inbound.clone(),
                            DEFAULT_MAX_FRAME,
                        );
                        log::info!("Accepted connection from {address} (id {client_id})");
                        client_id = client_id.wrapping_add(1);

                        let client = Arc::new(client);
                        if let Err(err) = client.start(outgoing, reader, writer) {
                            log::warn!("Dropping connection from {address}: {err}");
                        }
                    }
                }
            }
        });
    }

    fn start_console(&self) {
        let cancel_token = self.cancel_token.clone();
        let inbound = self.inbound.clone();

        spawn(async move {
            let mut lines = BufReader::new(stdin()).lines();
            loop {
                select! {
                    () = cancel_token.cancelled() => break,
                    line = lines.next_line() => match line {
                        Ok(Some(line)) if line.trim().is_empty() => {}
                        Ok(Some(line)) => {
                            if inbound.send(InboundEvent::Command(line)).is_err() {
                                break;
                            }
                        }
                        Ok(None) => break,
                        Err(err) => {
                            log::warn!("Failed to read console input: {err}");
                            break;
                        }
                    }
                }
            }
        });
    }

    /// Stops the server and waits for the simulation thread to finish its tick.
    pub fn stop(&mut self) {
        log::info!("Stopping Bauble Server");
        self.cancel_token.cancel();
        if let Some(handle) = self.simulation_thread.take()
            && handle.join().is_err()
        {
            log::error!("The simulation thread panicked");
        }
    }
}

fn run_simulation(mut server: Server, tick_interval: Duration, cancel_token: &CancellationToken) {
    let mut next_tick = Instant::now();
    while !cancel_token.is_cancelled() {
        server.tick();

        next_tick += tick_interval;
        let now = Instant::now();
        if next_tick > now {
            thread::sleep(next_tick - now);
        } else {
            let behind = now - next_tick;
            if behind > tick_interval * 20 {
                log::warn!(
                    "Can't keep up! Skipping {} ticks",
                    behind.as_millis() / tick_interval.as_millis().max(1)
                );
                next_tick = now;
            }
        }
    }
    log::info!("Simulation stopped after {} ticks", server.tick_count());
}
