//! Errors produced while parsing or running an admin command.

use thiserror::Error;

/// Why a command could not be run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The command line was blank.
    #[error("Empty command")]
    Empty,
    /// No handler is registered under this name.
    #[error("Command {0} does not exist")]
    UnknownCommand(String),
    /// The arguments do not fit the command.
    #[error("Invalid syntax: {0}")]
    InvalidSyntax(String),
    /// A slot amount is larger than any group can hold.
    #[error("Amount {amount} is out of range (1 to {max})")]
    AmountOutOfRange {
        /// The amount that was given.
        amount: u64,
        /// The largest accepted amount.
        max: usize,
    },
    /// The server has no configuration to reload from.
    #[error("No configuration to reload from")]
    NoConfig,
    /// The target entity does not exist.
    #[error("No entity with id {0}")]
    UnknownTarget(i32),
}
