//! The `reload` command: starts a new merge epoch from the server configuration.

use crate::{
    command::{CommandFeedback, CommandHandler, error::CommandError},
    server::Server,
};

/// Names the handler is registered under.
pub const NAMES: [&str; 1] = ["reload"];

/// Rebuilds the slot type registries.
pub struct ReloadCommandHandler;

impl CommandHandler for ReloadCommandHandler {
    fn execute(&self, args: &[&str], server: &mut Server) -> Result<CommandFeedback, CommandError> {
        if !args.is_empty() {
            return Err(CommandError::InvalidSyntax(
                "reload takes no arguments".to_string(),
            ));
        }
        let types = server.reload().ok_or(CommandError::NoConfig)?;
        Ok(CommandFeedback::new(
            "commands.reload.success",
            vec![types.to_string()],
        ))
    }
}

#[cfg(test)]
mod tests {
    use bauble_registry::TypeDeclaration;
    use bauble_utils::Identifier;

    use super::*;
    use crate::config::ServerConfig;

    #[test]
    fn test_reload_starts_a_new_epoch() {
        let config = ServerConfig::bundled().unwrap();
        let mut server = Server::from_config(&config);
        let known = server.registries.types.len();

        server
            .registries
            .types
            .declare(&TypeDeclaration::new("extra"), true);
        server
            .registries
            .types
            .declare(&TypeDeclaration::new("ring").enabled(false), false);
        // Contributions after the freeze never win.
        server
            .registries
            .icons
            .contribute("back", Identifier::new("zzz", "icon"));
        assert!(server.registries.icons.icon("back").is_none());

        let feedback = server.execute_command("reload").unwrap();
        assert_eq!(feedback.key, "commands.reload.success");
        assert_eq!(feedback.args, [known.to_string()]);
        assert!(server.registries.types.lookup("extra").is_none());
        assert!(server.registries.types.is_enabled("ring"));
        assert!(server.registries.icons.icon("back").is_none());
        assert_eq!(
            server.registries.icons.icon("ring"),
            Some(&Identifier::new("curios", "item/empty_ring_slot"))
        );
        assert!(!server.registries.icons.is_registering());
    }

    #[test]
    fn test_reload_clears_the_icon_freeze() {
        let config = ServerConfig::bundled().unwrap();
        let mut server = Server::from_config(&config);
        assert!(!server.registries.icons.is_registering());

        server.registries.reset();
        assert!(server.registries.icons.is_registering());
        assert!(server.registries.types.is_empty());

        server.reload_registries(&config);
        assert!(!server.registries.types.is_empty());
        assert!(!server.registries.icons.is_registering());
    }

    #[test]
    fn test_reload_needs_a_config() {
        let mut server = Server::default();
        assert_eq!(server.execute_command("reload"), Err(CommandError::NoConfig));
        assert!(matches!(
            server.execute_command("reload now"),
            Err(CommandError::InvalidSyntax(_))
        ));
    }
}
