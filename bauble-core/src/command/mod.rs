//! This module contains everything needed for admin commands (parsing, dispatch and feedback).
pub mod curios;
pub mod error;
pub mod reload;

use std::{fmt, sync::Arc};

use rustc_hash::FxHashMap;

use crate::server::Server;
use error::CommandError;

/// The translatable message a successful command reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFeedback {
    /// Translation key of the message.
    pub key: &'static str,
    /// Values substituted into the message, in order.
    pub args: Vec<String>,
}

impl CommandFeedback {
    /// Creates a feedback message.
    #[must_use]
    pub fn new(key: &'static str, args: Vec<String>) -> Self {
        Self { key, args }
    }
}

impl fmt::Display for CommandFeedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)?;
        if !self.args.is_empty() {
            write!(f, " [{}]", self.args.join(", "))?;
        }
        Ok(())
    }
}

/// A command the dispatcher can run.
pub trait CommandHandler: Send + Sync {
    /// Runs the command with the words following its name.
    fn execute(&self, args: &[&str], server: &mut Server) -> Result<CommandFeedback, CommandError>;
}

/// A struct that parses and dispatches commands to their appropriate handlers.
pub struct CommandDispatcher {
    /// A map of command names to their handlers.
    handlers: FxHashMap<&'static str, Arc<dyn CommandHandler>>,
}

impl CommandDispatcher {
    /// Creates a new command dispatcher with no handlers.
    #[must_use]
    pub fn new() -> Self {
        CommandDispatcher {
            handlers: FxHashMap::default(),
        }
    }

    /// Executes a command line.
    pub fn execute(&self, command: &str, server: &mut Server) -> Result<CommandFeedback, CommandError> {
        let (name, args) = Self::split_command(command)?;
        let Some(handler) = self.handlers.get(name) else {
            return Err(CommandError::UnknownCommand(name.to_string()));
        };
        handler.execute(&args, server)
    }

    /// Splits a command line into its name and arguments.
    fn split_command(command: &str) -> Result<(&str, Vec<&str>), CommandError> {
        let mut words = command.trim().trim_start_matches('/').split_whitespace();
        let Some(name) = words.next() else {
            return Err(CommandError::Empty);
        };
        Ok((name, words.collect()))
    }

    /// Registers a command handler.
    pub fn register(&mut self, names: &[&'static str], handler: impl CommandHandler + 'static) {
        let handler: Arc<dyn CommandHandler> = Arc::new(handler);

        for &name in names {
            if self.handlers.insert(name, handler.clone()).is_some() {
                log::warn!("Command {name} is already registered");
            }
        }
    }

}

impl Default for CommandDispatcher {
    fn default() -> Self {
        let mut dispatcher = Self::new();
        dispatcher.register(&curios::NAMES, curios::CuriosCommandHandler);
        dispatcher.register(&reload::NAMES, reload::ReloadCommandHandler);
        dispatcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_command() {
        let (name, args) = CommandDispatcher::split_command("  /curios add ring 3 ").unwrap();
        assert_eq!(name, "curios");
        assert_eq!(args, ["add", "ring", "3"]);
        assert_eq!(
            CommandDispatcher::split_command("   "),
            Err(CommandError::Empty)
        );
    }

    #[test]
    fn test_unknown_command() {
        let mut server = Server::default();
        let dispatcher = CommandDispatcher::default();
        assert_eq!(
            dispatcher.execute("summon pig", &mut server),
            Err(CommandError::UnknownCommand("summon".to_string()))
        );
    }

    #[test]
    fn test_feedback_display() {
        let feedback = CommandFeedback::new("commands.curios.add.success", vec!["1".into(), "ring".into()]);
        assert_eq!(feedback.to_string(), "commands.curios.add.success [1, ring]");
    }
}
