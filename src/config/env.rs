//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `FERRYMAN_DISCORD_TOKEN` - Discord bot token
//! - `FERRYMAN_TELEGRAM_TOKEN` - Telegram bot token
//! - `FERRYMAN_BRIDGES_PATH` - Bridge membership document path
//! - `FERRYMAN_MESSAGE_MAP_PATH` - Correlation store database path

use std::env;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "FERRYMAN";

/// Apply environment variable overrides to a config.
///
/// This allows sensitive values like bot tokens to be provided via
/// environment variables instead of the config file.
pub fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(token) = env::var(format!("{}_DISCORD_TOKEN", ENV_PREFIX)) {
        config.discord.token = token;
    }
    if let Ok(token) = env::var(format!("{}_TELEGRAM_TOKEN", ENV_PREFIX)) {
        config.telegram.token = token;
    }
    if let Ok(path) = env::var(format!("{}_BRIDGES_PATH", ENV_PREFIX)) {
        config.storage.bridges = path;
    }
    if let Ok(path) = env::var(format!("{}_MESSAGE_MAP_PATH", ENV_PREFIX)) {
        config.storage.message_map = path;
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `FERRYMAN_CONFIG` environment variable, otherwise returns "ferryman.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "ferryman.conf".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::*;

    fn make_test_config() -> Config {
        Config {
            discord: DiscordConfig {
                token: "original_discord".to_string(),
            },
            telegram: TelegramConfig {
                token: "original_telegram".to_string(),
            },
            storage: StorageConfig::default(),
        }
    }

    #[test]
    fn test_get_config_path_default() {
        env::remove_var("FERRYMAN_CONFIG");
        assert_eq!(get_config_path(), "ferryman.conf");
    }

    #[test]
    fn test_apply_env_overrides_no_vars() {
        env::remove_var("FERRYMAN_DISCORD_TOKEN");
        env::remove_var("FERRYMAN_TELEGRAM_TOKEN");
        env::remove_var("FERRYMAN_BRIDGES_PATH");
        env::remove_var("FERRYMAN_MESSAGE_MAP_PATH");

        let result = apply_env_overrides(make_test_config());

        assert_eq!(result.discord.token, "original_discord");
        assert_eq!(result.telegram.token, "original_telegram");
        assert_eq!(result.storage.bridges, "data/bridges.json");
    }
}
