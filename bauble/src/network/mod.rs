//! TCP front-end: one reader and one writer task per client.

mod tcp_client;

pub use tcp_client::TcpClient;
