//! Plugin configuration: descriptor documents plus user-facing messages.
//!
//! Four YAML files in the plugin data directory: `hats.yml`,
//! `backbling.yml`, `balloons.yml`, and `messages.yml`. A reload parses
//! everything fresh and swaps the loaded state wholesale; a parse failure
//! leaves the previous configuration in place.

use std::path::Path;

use serde::Deserialize;
use tracing::info;
use vanity_item::{ConfigError, CosmeticKind, DescriptorRegistry};

use crate::chat::colorize;

const DESCRIPTOR_FILES: &[(&str, CosmeticKind)] = &[
    ("hats.yml", CosmeticKind::Hat),
    ("backbling.yml", CosmeticKind::BackAccessory),
    ("balloons.yml", CosmeticKind::Balloon),
];

/// User-facing message templates, `&`-colorized at format time.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Messages {
    #[serde(rename = "equipped-message")]
    pub equipped: String,
    #[serde(rename = "given-message")]
    pub given: String,
    #[serde(rename = "unknown-item-message")]
    pub unknown_item: String,
    #[serde(rename = "player-not-found-message")]
    pub player_not_found: String,
    #[serde(rename = "no-permission-message")]
    pub no_permission: String,
    #[serde(rename = "reloaded-message")]
    pub reloaded: String,
    #[serde(rename = "storage-opened-message")]
    pub storage_opened: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            equipped: "&aYou equipped {item}!".into(),
            given: "&aGave {item} to {player}".into(),
            unknown_item: "&cItem ID not found in the config!".into(),
            player_not_found: "&cPlayer not found!".into(),
            no_permission: "&cYou don't have permission to use this!".into(),
            reloaded: "&aConfigurations reloaded!".into(),
            storage_opened: "&aOpening your cosmetics storage...".into(),
        }
    }
}

impl Messages {
    pub fn equipped(&self, item_name: &str) -> String {
        colorize(&self.equipped.replace("{item}", item_name))
    }

    pub fn given(&self, item_id: &str, player_name: &str) -> String {
        colorize(
            &self
                .given
                .replace("{item}", item_id)
                .replace("{player}", player_name),
        )
    }

    pub fn unknown_item(&self) -> String {
        colorize(&self.unknown_item)
    }

    pub fn player_not_found(&self) -> String {
        colorize(&self.player_not_found)
    }

    pub fn no_permission(&self) -> String {
        colorize(&self.no_permission)
    }

    pub fn reloaded(&self) -> String {
        colorize(&self.reloaded)
    }

    pub fn storage_opened(&self) -> String {
        colorize(&self.storage_opened)
    }
}

/// Everything loaded from the plugin data directory.
#[derive(Debug)]
pub struct CosmeticsConfig {
    pub registry: DescriptorRegistry,
    pub messages: Messages,
}

impl CosmeticsConfig {
    /// Load all configuration from `dir`. Missing files count as empty;
    /// unparseable files are errors.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let mut registry = DescriptorRegistry::new();
        for &(file, kind) in DESCRIPTOR_FILES {
            let path = dir.join(file);
            if !path.exists() {
                continue;
            }
            let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
            registry
                .load_document(kind, &contents)
                .map_err(|source| ConfigError::Parse {
                    path: path.display().to_string(),
                    source,
                })?;
        }

        let messages_path = dir.join("messages.yml");
        let messages = if messages_path.exists() {
            let contents =
                std::fs::read_to_string(&messages_path).map_err(|source| ConfigError::Io {
                    path: messages_path.display().to_string(),
                    source,
                })?;
            serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: messages_path.display().to_string(),
                source,
            })?
        } else {
            Messages::default()
        };

        info!(descriptors = registry.len(), "cosmetics configuration loaded");
        Ok(Self { registry, messages })
    }

    /// Reload in place; on failure the previous configuration survives.
    pub fn reload(&mut self, dir: &Path) -> Result<(), ConfigError> {
        *self = Self::load(dir)?;
        Ok(())
    }
}
