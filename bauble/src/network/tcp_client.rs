use std::{net::SocketAddr, sync::Arc};

use bauble_core::{
    InboundEvent,
    player::{SessionId, connection::NetworkConnection},
};
use bauble_protocol::{
    frame::RawPacket,
    packets::SBoundPacket,
    utils::PacketError,
};
use crossbeam::channel::Sender;
use tokio::{
    io::{BufReader, BufWriter},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    select,
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

/// A connected client as seen by the network layer.
///
/// Decoded packets go to the simulation thread through `inbound`; packets for
/// the client arrive through [`NetworkConnection::send_raw`] and are written by
/// the outgoing task.
pub struct TcpClient {
    /// The session id shared with the simulation thread.
    pub id: SessionId,
    /// The client's address.
    pub address: SocketAddr,
    /// Cancelled when the connection closes, from either side.
    pub cancel_token: CancellationToken,
    /// A queue of encoded packets to send to the network.
    outgoing_queue: UnboundedSender<RawPacket>,
    tasks: TaskTracker,
    inbound: Sender<InboundEvent>,
    max_frame: usize,
}

impl TcpClient {
    /// Splits the stream and prepares both halves for the client tasks.
    pub fn new(
        tcp_stream: TcpStream,
        address: SocketAddr,
        id: SessionId,
        cancel_token: CancellationToken,
        inbound: Sender<InboundEvent>,
        max_frame: usize,
    ) -> (
        Self,
        UnboundedReceiver<RawPacket>,
        BufReader<OwnedReadHalf>,
        BufWriter<OwnedWriteHalf>,
    ) {
        let (read, write) = tcp_stream.into_split();
        let (send, recv) = mpsc::unbounded_channel();
        (
            Self {
                id,
                address,
                cancel_token,
                outgoing_queue: send,
                tasks: TaskTracker::new(),
                inbound,
                max_frame,
            },
            recv,
            BufReader::new(read),
            BufWriter::new(write),
        )
    }

    /// Announces the client to the simulation thread and starts both tasks.
    pub fn start(
        self: &Arc<Self>,
        outgoing: UnboundedReceiver<RawPacket>,
        reader: BufReader<OwnedReadHalf>,
        writer: BufWriter<OwnedWriteHalf>,
    ) -> Result<(), PacketError> {
        let connection: Arc<dyn NetworkConnection> = self.clone();
        self.inbound
            .send(InboundEvent::Connected {
                session: self.id,
                connection,
            })
            .map_err(|e| PacketError::SendError(e.to_string()))?;
        self.start_outgoing_packet_task(outgoing, writer);
        self.start_incoming_packet_task(reader);
        self.tasks.close();
        Ok(())
    }

    /// Waits until both tasks have finished.
    pub async fn await_tasks(&self) {
        self.tasks.wait().await;
    }

    /// Starts a task that writes packets from the outgoing queue to the socket.
    /// It runs until the client is closed or the cancellation token is cancelled.
    fn start_outgoing_packet_task(
        &self,
        mut sender_recv: UnboundedReceiver<RawPacket>,
        mut writer: BufWriter<OwnedWriteHalf>,
    ) {
        let cancel_token = self.cancel_token.clone();
        let id = self.id;

        self.tasks.spawn(async move {
            loop {
                select! {
                    () = cancel_token.cancelled() => break,
                    packet = sender_recv.recv() => {
                        let Some(packet) = packet else {
                            log::warn!("Outgoing queue closed for client {id}");
                            cancel_token.cancel();
                            break;
                        };
                        if let Err(err) = packet.write_async(&mut writer).await {
                            log::warn!("Failed to send packet to client {id}: {err}");
                            cancel_token.cancel();
                        }
                    }
                }
            }
        });
    }

    /// Starts a task that reads frames, decodes them and hands them to the simulation.
    fn start_incoming_packet_task(&self, mut reader: BufReader<OwnedReadHalf>) {
        let cancel_token = self.cancel_token.clone();
        let inbound = self.inbound.clone();
        let id = self.id;
        let max_frame = self.max_frame;

        self.tasks.spawn(async move {
            loop {
                select! {
                    () = cancel_token.cancelled() => break,
                    raw = RawPacket::read_async(&mut reader, max_frame) => {
                        let raw = match raw {
                            Ok(raw) => raw,
                            Err(err) => {
                                if !cancel_token.is_cancelled() {
                                    log::info!("Closing client {id}: {err}");
                                    cancel_token.cancel();
                                }
                                break;
                            }
                        };
                        match SBoundPacket::from_raw_packet(&raw) {
                            Ok(packet) => {
                                log::debug!("Received {} from client {id}", packet.name());
                                if inbound.send(InboundEvent::Packet { session: id, packet }).is_err() {
                                    cancel_token.cancel();
                                    break;
                                }
                            }
                            Err(err) => log::warn!("Failed to decode packet from client {id}: {err}"),
                        }
                    }
                }
            }
            // The simulation may already be gone during shutdown.
            let _ = inbound.send(InboundEvent::Disconnected { session: id });
        });
    }
}

impl NetworkConnection for TcpClient {
    fn send_raw(&self, packet: RawPacket) {
        if self.outgoing_queue.send(packet).is_err() && !self.cancel_token.is_cancelled() {
            log::warn!("Failed to queue packet for client {}", self.id);
            self.cancel_token.cancel();
        }
    }

    fn close(&self) {
        self.cancel_token.cancel();
    }

    fn closed(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bauble_protocol::packets::{
        CBoundPacket,
        game::{CContainerClose, SRequestCloseVanilla, SRequestOpen},
    };
    use crossbeam::channel::{self, Receiver};
    use tokio::{io::AsyncWriteExt, net::TcpListener};

    use super::*;

    fn next_event(rx: &Receiver<InboundEvent>) -> InboundEvent {
        rx.recv_timeout(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_client_forwards_packets_both_ways() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut remote = TcpStream::connect(listener.local_addr().unwrap())
            .await
            .unwrap();
        let (stream, address) = listener.accept().await.unwrap();

        let (tx, rx) = channel::unbounded();
        let (client, outgoing, reader, writer) =
            TcpClient::new(stream, address, 7, CancellationToken::new(), tx, 1024);
        let client = Arc::new(client);
        client.start(outgoing, reader, writer).unwrap();

        let InboundEvent::Connected { session, connection } = next_event(&rx) else {
            panic!("expected a connect event");
        };
        assert_eq!(session, 7);

        let open = SBoundPacket::from(SRequestOpen::new(0.25, 0.75));
        let frame = open.to_raw_packet().unwrap().to_frame().unwrap();
        remote.write_all(&frame).await.unwrap();
        match next_event(&rx) {
            InboundEvent::Packet {
                session: 7,
                packet: SBoundPacket::RequestOpen(packet),
            } => assert_eq!(packet, SRequestOpen::new(0.25, 0.75)),
            _ => panic!("expected the open request"),
        }

        let close = CBoundPacket::from(CContainerClose::new(3));
        connection.send_raw(close.to_raw_packet().unwrap());
        let raw = RawPacket::read_async(&mut remote, 1024).await.unwrap();
        assert!(matches!(
            CBoundPacket::from_raw_packet(&raw).unwrap(),
            CBoundPacket::ContainerClose(CContainerClose { container_id: 3 })
        ));

        drop(remote);
        assert!(matches!(
            next_event(&rx),
            InboundEvent::Disconnected { session: 7 }
        ));
        assert!(connection.closed());
        client.await_tasks().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_undecodable_packet_keeps_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut remote = TcpStream::connect(listener.local_addr().unwrap())
            .await
            .unwrap();
        let (stream, address) = listener.accept().await.unwrap();

        let (tx, rx) = channel::unbounded();
        let (client, outgoing, reader, writer) =
            TcpClient::new(stream, address, 1, CancellationToken::new(), tx, 1024);
        let client = Arc::new(client);
        client.start(outgoing, reader, writer).unwrap();
        assert!(matches!(next_event(&rx), InboundEvent::Connected { .. }));

        let unknown = RawPacket::new(0x7f, Vec::new()).to_frame().unwrap();
        remote.write_all(&unknown).await.unwrap();
        let close = SBoundPacket::from(SRequestCloseVanilla::default());
        let frame = close.to_raw_packet().unwrap().to_frame().unwrap();
        remote.write_all(&frame).await.unwrap();

        assert!(matches!(
            next_event(&rx),
            InboundEvent::Packet {
                packet: SBoundPacket::RequestCloseVanilla(_),
                ..
            }
        ));
        assert!(!client.closed());
    }
}
