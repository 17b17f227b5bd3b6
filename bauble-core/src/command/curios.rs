//! The `curios` admin command.
//!
//! Each sub-command maps onto one [`SlotCollection`](crate::equipment::SlotCollection)
//! operation on the target entity:
//!
//! ```text
//! curios add <slot> <target> [amount]
//! curios remove <slot> <target> [amount]
//! curios enable <slot> <target>
//! curios disable <slot> <target>
//! curios clear <target> [slot]
//! curios reset <target>
//! ```
//!
//! Targets without equipment are accepted and left unchanged.

use crate::{
    command::{CommandFeedback, CommandHandler, error::CommandError},
    equipment::MAX_GROUP_SIZE,
    server::Server,
};

/// Names the handler is registered under.
pub const NAMES: [&str; 1] = ["curios"];

/// A parsed `curios` sub-command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    /// Grow a slot group.
    Add {
        /// The slot type.
        slot: String,
        /// The target entity.
        target: i32,
        /// Slots to add.
        amount: usize,
    },
    /// Shrink a slot group.
    Remove {
        /// The slot type.
        slot: String,
        /// The target entity.
        target: i32,
        /// Slots to remove.
        amount: usize,
    },
    /// Give the target a group of a registered type.
    Enable {
        /// The slot type.
        slot: String,
        /// The target entity.
        target: i32,
    },
    /// Take a group away from the target.
    Disable {
        /// The slot type.
        slot: String,
        /// The target entity.
        target: i32,
    },
    /// Empty one group, or all of them.
    Clear {
        /// The target entity.
        target: i32,
        /// The slot type, or `None` for every group.
        slot: Option<String>,
    },
    /// Rebuild the target's groups from the registry defaults.
    Reset {
        /// The target entity.
        target: i32,
    },
}

fn parse_target(word: Option<&&str>) -> Result<i32, CommandError> {
    let word = word.ok_or_else(|| CommandError::InvalidSyntax("missing target".to_string()))?;
    word.parse()
        .map_err(|_| CommandError::InvalidSyntax(format!("invalid target \"{word}\"")))
}

fn parse_slot(word: Option<&&str>) -> Result<String, CommandError> {
    word.map(|slot| (*slot).to_string())
        .ok_or_else(|| CommandError::InvalidSyntax("missing slot".to_string()))
}

fn parse_amount(word: Option<&&str>) -> Result<usize, CommandError> {
    let Some(word) = word else {
        return Ok(1);
    };
    let amount: u64 = word
        .parse()
        .map_err(|_| CommandError::InvalidSyntax(format!("invalid amount \"{word}\"")))?;
    usize::try_from(amount)
        .ok()
        .filter(|amount| (1..=MAX_GROUP_SIZE).contains(amount))
        .ok_or(CommandError::AmountOutOfRange {
            amount,
            max: MAX_GROUP_SIZE,
        })
}

impl AdminCommand {
    /// Parses the words after `curios`.
    pub fn parse(args: &[&str]) -> Result<Self, CommandError> {
        let Some((op, rest)) = args.split_first() else {
            return Err(CommandError::InvalidSyntax("missing sub-command".to_string()));
        };
        let max_args = match *op {
            "add" | "remove" => 3,
            "enable" | "disable" | "clear" => 2,
            "reset" => 1,
            other => {
                return Err(CommandError::InvalidSyntax(format!(
                    "unknown sub-command \"{other}\""
                )));
            }
        };
        if rest.len() > max_args {
            return Err(CommandError::InvalidSyntax(format!(
                "too many arguments for {op}"
            )));
        }

        Ok(match *op {
            "add" => Self::Add {
                slot: parse_slot(rest.first())?,
                target: parse_target(rest.get(1))?,
                amount: parse_amount(rest.get(2))?,
            },
            "remove" => Self::Remove {
                slot: parse_slot(rest.first())?,
                target: parse_target(rest.get(1))?,
                amount: parse_amount(rest.get(2))?,
            },
            "enable" => Self::Enable {
                slot: parse_slot(rest.first())?,
                target: parse_target(rest.get(1))?,
            },
            "disable" => Self::Disable {
                slot: parse_slot(rest.first())?,
                target: parse_target(rest.get(1))?,
            },
            "clear" => Self::Clear {
                target: parse_target(rest.first())?,
                slot: rest.get(1).map(|slot| (*slot).to_string()),
            },
            _ => Self::Reset {
                target: parse_target(rest.first())?,
            },
        })
    }

    /// The entity the command acts on.
    #[must_use]
    pub fn target(&self) -> i32 {
        match self {
            Self::Add { target, .. }
            | Self::Remove { target, .. }
            | Self::Enable { target, .. }
            | Self::Disable { target, .. }
            | Self::Clear { target, .. }
            | Self::Reset { target } => *target,
        }
    }

    /// Runs the command against the server.
    pub fn execute(&self, server: &mut Server) -> Result<CommandFeedback, CommandError> {
        let target = self.target();
        if server.entity(target).is_none() {
            return Err(CommandError::UnknownTarget(target));
        }
        let target_name = target.to_string();

        let feedback = match self {
            Self::Add { slot, amount, .. } => {
                server.with_equipment(target, |equipment, _| {
                    equipment.add_slots(slot, *amount)
                });
                CommandFeedback::new(
                    "commands.curios.add.success",
                    vec![amount.to_string(), slot.clone(), target_name],
                )
            }
            Self::Remove { slot, amount, .. } => {
                server.with_equipment(target, |equipment, _| {
                    equipment.remove_slots(slot, *amount)
                });
                CommandFeedback::new(
                    "commands.curios.remove.success",
                    vec![amount.to_string(), slot.clone(), target_name],
                )
            }
            Self::Enable { slot, .. } => {
                server.with_equipment(target, |equipment, registries| {
                    equipment.enable(&registries.types, slot)
                });
                CommandFeedback::new(
                    "commands.curios.enable.success",
                    vec![slot.clone(), target_name],
                )
            }
            Self::Disable { slot, .. } => {
                server.with_equipment(target, |equipment, _| equipment.disable(slot));
                CommandFeedback::new(
                    "commands.curios.disable.success",
                    vec![slot.clone(), target_name],
                )
            }
            Self::Clear { slot, .. } => {
                server.with_equipment(target, |equipment, _| equipment.clear(slot.as_deref()));
                match slot {
                    Some(slot) => CommandFeedback::new(
                        "commands.curios.clear.success",
                        vec![slot.clone(), target_name],
                    ),
                    None => {
                        CommandFeedback::new("commands.curios.clearAll.success", vec![target_name])
                    }
                }
            }
            Self::Reset { .. } => {
                server.with_equipment(target, |equipment, registries| {
                    equipment.reset_to_defaults(&registries.types);
                });
                CommandFeedback::new("commands.curios.reset.success", vec![target_name])
            }
        };
        Ok(feedback)
    }
}

/// Runs `curios` sub-commands.
pub struct CuriosCommandHandler;

impl CommandHandler for CuriosCommandHandler {
    fn execute(&self, args: &[&str], server: &mut Server) -> Result<CommandFeedback, CommandError> {
        AdminCommand::parse(args)?.execute(server)
    }
}

#[cfg(test)]
mod tests {
    use bauble_registry::{DeclarationBus, ItemStack, Registries, TypeDeclaration};
    use bauble_utils::Identifier;

    use super::*;
    use crate::equipment::EquipmentSupport;

    fn server() -> (Server, i32) {
        let mut registries = Registries::default();
        let mut bus = DeclarationBus::new();
        bus.register_type("jewelry", TypeDeclaration::new("ring").size(2));
        bus.register_type("jewelry", TypeDeclaration::new("charm"));
        bus.register_type("jewelry", TypeDeclaration::new("belt").enabled(false));
        registries.process_declarations(&mut bus);

        let mut server = Server::new(registries, EquipmentSupport::from_kinds(["player"]));
        let player = server.spawn_entity("player");
        (server, player)
    }

    fn layout(server: &Server, entity: i32) -> Vec<(String, usize)> {
        server.equipment(entity).unwrap().layout()
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            AdminCommand::parse(&["add", "ring", "4"]).unwrap(),
            AdminCommand::Add {
                slot: "ring".to_string(),
                target: 4,
                amount: 1
            }
        );
        assert_eq!(
            AdminCommand::parse(&["clear", "4"]).unwrap(),
            AdminCommand::Clear {
                target: 4,
                slot: None
            }
        );
        for bad in [
            &["add", "ring"][..],
            &["add", "ring", "x"],
            &["add", "ring", "1", "-1"],
            &["reset", "1", "2"],
            &["grow", "1"],
            &[],
        ] {
            assert!(
                matches!(AdminCommand::parse(bad), Err(CommandError::InvalidSyntax(_))),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_amount_must_fit_a_group() {
        for amount in ["0", "257", "4294967295", "18446744073709551615"] {
            assert!(
                matches!(
                    AdminCommand::parse(&["add", "ring", "1", amount]),
                    Err(CommandError::AmountOutOfRange { max: MAX_GROUP_SIZE, .. })
                ),
                "{amount}"
            );
        }
        assert!(AdminCommand::parse(&["remove", "ring", "1", "256"]).is_ok());

        let (mut server, player) = server();
        assert_eq!(
            server.execute_command(&format!("curios add ring {player} 4294967295")),
            Err(CommandError::AmountOutOfRange {
                amount: 4_294_967_295,
                max: MAX_GROUP_SIZE
            })
        );
        assert_eq!(layout(&server, player)[1], ("ring".to_string(), 2));

        // Within range but past the cap once added to the existing slots.
        server
            .execute_command(&format!("curios add ring {player} 256"))
            .unwrap();
        assert_eq!(layout(&server, player)[1], ("ring".to_string(), 2));
    }

    #[test]
    fn test_add_remove_enable_disable() {
        let (mut server, player) = server();
        let run = |server: &mut Server, line: &str| server.execute_command(line).unwrap();

        let feedback = run(&mut server, &format!("curios add ring {player} 3"));
        assert_eq!(feedback.key, "commands.curios.add.success");
        assert_eq!(feedback.args, ["3", "ring", player.to_string().as_str()]);
        assert_eq!(layout(&server, player)[1], ("ring".to_string(), 5));

        run(&mut server, &format!("curios remove ring {player} 5"));
        assert_eq!(layout(&server, player)[1], ("ring".to_string(), 5));

        run(&mut server, &format!("curios disable charm {player}"));
        assert_eq!(layout(&server, player), [("ring".to_string(), 5)]);
        run(&mut server, &format!("curios enable charm {player}"));
        run(&mut server, &format!("curios enable belt {player}"));
        assert_eq!(
            layout(&server, player),
            [("charm".to_string(), 1), ("ring".to_string(), 5)]
        );
    }

    #[test]
    fn test_clear_and_reset() {
        let (mut server, player) = server();
        let gem = ItemStack::new(Identifier::new("bauble", "gem"));
        server.with_equipment(player, |equipment, _| {
            equipment.set_stack("ring", 1, gem.clone());
            equipment.set_stack("charm", 0, gem.clone());
            equipment.add_slots("ring", 2);
        });

        let feedback = server
            .execute_command(&format!("curios clear {player} ring"))
            .unwrap();
        assert_eq!(feedback.key, "commands.curios.clear.success");
        let equipment = server.equipment(player).unwrap();
        assert!(equipment.group("ring").unwrap().is_empty());
        assert!(!equipment.group("charm").unwrap().is_empty());

        let feedback = server
            .execute_command(&format!("curios clear {player}"))
            .unwrap();
        assert_eq!(feedback.key, "commands.curios.clearAll.success");
        assert!(server.equipment(player).unwrap().group("charm").unwrap().is_empty());

        server
            .execute_command(&format!("curios reset {player}"))
            .unwrap();
        assert_eq!(
            layout(&server, player),
            [("charm".to_string(), 1), ("ring".to_string(), 2)]
        );
    }

    #[test]
    fn test_targets() {
        let (mut server, _) = server();
        assert_eq!(
            server.execute_command("curios reset 999"),
            Err(CommandError::UnknownTarget(999))
        );

        let pig = server.spawn_entity("pig");
        let feedback = server
            .execute_command(&format!("curios add ring {pig}"))
            .unwrap();
        assert_eq!(feedback.key, "commands.curios.add.success");
        assert!(server.equipment(pig).is_none());
    }
}
