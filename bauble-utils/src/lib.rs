//! # Bauble Utils
//!
//! Small building blocks shared by every bauble crate: namespaced identifiers and
//! the blocking/async wire primitives.

pub mod codec;
pub mod identifier;
pub mod serial;

pub use identifier::{Identifier, IdentifierError};
