//! Configuration type definitions.

use serde::Deserialize;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub discord: DiscordConfig,
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Discord bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    pub token: String,
}

/// Telegram bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub token: String,
}

/// On-disk storage locations.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path of the persisted bridge membership document.
    #[serde(default = "default_bridges_path")]
    pub bridges: String,
    /// Path of the correlation store database.
    #[serde(default = "default_message_map_path")]
    pub message_map: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bridges: default_bridges_path(),
            message_map: default_message_map_path(),
        }
    }
}

fn default_bridges_path() -> String {
    "data/bridges.json".to_string()
}

fn default_message_map_path() -> String {
    "data/message_map.sqlite3".to_string()
}
