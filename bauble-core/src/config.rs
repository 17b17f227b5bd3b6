//! Server configuration loaded from a JSON5 file.

use std::{collections::BTreeMap, fs, io, path::Path};

use bauble_protocol::packets::game::MAX_SLOT_TYPE_LENGTH;
use bauble_registry::{DeclarationBus, Registries, RegistryExt, TypeDeclaration};
use bauble_utils::Identifier;
use log::LevelFilter;
use serde::Deserialize;
use thiserror::Error;

use crate::equipment::EquipmentSupport;

const DEFAULT_CONFIG: &str = include_str!("../../package-content/bauble_config.json5");

/// Reasons the configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the file failed.
    #[error("Failed to access config file: {0}")]
    Io(#[from] io::Error),
    /// The file is not valid JSON5 or does not match the expected shape.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json5::Error),
    /// A value is out of range.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Slot types and icons contributed by one producer.
#[derive(Debug, Clone, Deserialize)]
pub struct ProducerConfig {
    /// The producer name, used as the message sender.
    pub name: String,
    /// Declarations sent as `register_type`.
    #[serde(default)]
    pub register: Vec<TypeDeclaration>,
    /// Declarations sent as `modify_type`.
    #[serde(default)]
    pub modify: Vec<TypeDeclaration>,
    /// Icon candidates per slot type.
    #[serde(default)]
    pub icons: BTreeMap<String, Identifier>,
}

/// The server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// The port the server listens on.
    pub server_port: u16,
    /// Simulation ticks per second.
    pub tick_rate: u32,
    /// Default log filter, overridden by `RUST_LOG`.
    pub log_level: String,
    /// Namespace of the item tags that classify equippable items.
    pub tag_namespace: String,
    /// Entity kinds that get equipment.
    pub equipment_entities: Vec<String>,
    /// The producers whose declarations are merged at startup.
    pub producers: Vec<ProducerConfig>,
    /// Item tags, tag → items.
    #[serde(default)]
    pub item_tags: BTreeMap<Identifier, Vec<Identifier>>,
}

impl ServerConfig {
    /// Reads the config at `path`, writing the bundled default first if it is missing.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        let config = if path.exists() {
            Self::parse(&fs::read_to_string(path)?)?
        } else {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, DEFAULT_CONFIG)?;
            log::info!("Wrote default config to {}", path.display());
            Self::bundled()?
        };
        Ok(config)
    }

    /// Returns the config shipped with the server.
    pub fn bundled() -> Result<Self, ConfigError> {
        Self::parse(DEFAULT_CONFIG)
    }

    /// Parses and validates a config from JSON5 text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = serde_json5::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is in range and every slot type id fits on the wire.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::Invalid("Tick rate must be greater than 0".to_string()));
        }
        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "Unknown log level \"{}\"",
                self.log_level
            )));
        }
        if !Identifier::validate_namespace(&self.tag_namespace) {
            return Err(ConfigError::Invalid(format!(
                "Invalid tag namespace \"{}\"",
                self.tag_namespace
            )));
        }
        for producer in &self.producers {
            let slot_ids = producer
                .register
                .iter()
                .chain(&producer.modify)
                .map(|decl| decl.identifier.as_str())
                .chain(producer.icons.keys().map(String::as_str));
            for id in slot_ids {
                if !Identifier::validate_path(id) {
                    return Err(ConfigError::Invalid(format!(
                        "Producer {} declares invalid slot type \"{id}\"",
                        producer.name
                    )));
                }
                if id.len() > MAX_SLOT_TYPE_LENGTH {
                    return Err(ConfigError::Invalid(format!(
                        "Producer {} declares slot type \"{id}\" longer than {MAX_SLOT_TYPE_LENGTH} characters",
                        producer.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Builds fresh registries from the producers and item tags.
    #[must_use]
    pub fn build_registries(&self) -> Registries {
        let mut registries = Registries::new(self.tag_namespace.clone());
        self.populate(&mut registries);
        registries
    }

    /// Feeds the producers' declarations, icons and the item tags into `registries`.
    pub fn populate(&self, registries: &mut Registries) {
        let mut bus = DeclarationBus::new();
        for producer in &self.producers {
            for decl in &producer.register {
                bus.register_type(producer.name.clone(), decl.clone());
            }
            for decl in &producer.modify {
                bus.modify_type(producer.name.clone(), decl.clone());
            }
        }
        registries.process_declarations(&mut bus);

        for producer in &self.producers {
            for (slot, icon) in &producer.icons {
                registries.icons.contribute(slot, icon.clone());
            }
        }
        registries.freeze();

        for (tag, items) in &self.item_tags {
            registries.tags.add(tag.clone(), items.iter().cloned());
        }
    }

    /// Returns the table of entity kinds with equipment.
    #[must_use]
    pub fn equipment_support(&self) -> EquipmentSupport {
        EquipmentSupport::from_kinds(self.equipment_entities.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use super::*;

    #[test]
    fn test_bundled_config_is_valid() {
        let config = ServerConfig::bundled().unwrap();
        assert_eq!(config.tick_rate, 20);
        assert_eq!(config.log_level, "info");
        assert!(config.equipment_support().supports("player"));

        let mut registries = config.build_registries();
        assert_eq!(registries.types.lookup("ring").unwrap().size(), 2);
        assert!(registries.types.lookup("back").unwrap().is_hidden());
        assert!(!registries.icons.is_registering());
        assert_eq!(
            registries.icons.icon("ring"),
            Some(&Identifier::new("curios", "item/empty_ring_slot"))
        );
        let amulet_slots = registries.types_for_item(&Identifier::new("bauble", "amulet"));
        assert_eq!(
            amulet_slots.into_iter().collect::<Vec<_>>(),
            ["charm", "necklace"]
        );
    }

    #[test]
    fn test_modifications_apply_after_registrations() {
        let config = ServerConfig::parse(
            r#"{
                server_port: 1, tick_rate: 20, log_level: "debug", tag_namespace: "curios",
                equipment_entities: [],
                producers: [
                    { name: "tweaks", modify: [{ identifier: "amulet", size: 1, enabled: false }] },
                    { name: "jewelry", register: [{ identifier: "amulet", size: 2 }] },
                ],
            }"#,
        )
        .unwrap();
        let registries = config.build_registries();
        let amulet = registries.types.lookup("amulet").unwrap();
        assert_eq!(amulet.size(), 2);
        assert!(!amulet.is_enabled());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let base = |tick_rate: u32, namespace: &str, slot: &str| {
            format!(
                r#"{{ server_port: 1, tick_rate: {tick_rate}, log_level: "info",
                    tag_namespace: "{namespace}", equipment_entities: [],
                    producers: [{{ name: "p", register: [{{ identifier: "{slot}" }}] }}] }}"#
            )
        };
        assert!(ServerConfig::parse(&base(20, "curios", "ring")).is_ok());
        assert!(matches!(
            ServerConfig::parse(&base(0, "curios", "ring")),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ServerConfig::parse(&base(20, "Curios", "ring")),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ServerConfig::parse(&base(20, "curios", "Ring Slot")),
            Err(ConfigError::Invalid(_))
        ));
        let longest = "a".repeat(MAX_SLOT_TYPE_LENGTH);
        assert!(ServerConfig::parse(&base(20, "curios", &longest)).is_ok());
        assert!(matches!(
            ServerConfig::parse(&base(20, "curios", &format!("{longest}b"))),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ServerConfig::parse("{ tick_rate: 20 }"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_created() {
        let dir = env::temp_dir().join(format!("bauble-config-{}", std::process::id()));
        let path = dir.join("bauble_config.json5");
        let _ = fs::remove_dir_all(&dir);

        let created = ServerConfig::load_or_create(&path).unwrap();
        assert!(path.exists());
        let loaded = ServerConfig::load_or_create(&path).unwrap();
        assert_eq!(created.server_port, loaded.server_port);

        fs::remove_dir_all(&dir).unwrap();
    }
}
