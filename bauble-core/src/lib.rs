//! # Bauble Core
//!
//! The simulation side of the equipment system: per-entity slot collections,
//! the server loop that keeps clients in sync, the client mirror, admin
//! commands and configuration.

pub mod client;
pub mod command;
pub mod config;
pub mod entity;
pub mod equipment;
pub mod player;
pub mod server;

pub use client::{ClientWorld, MirrorError};
pub use config::{ConfigError, ServerConfig};
pub use server::{InboundEvent, Server};
