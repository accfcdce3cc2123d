//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.discord.token.is_empty() {
        errors.push("discord.token is required".to_string());
    }
    if config.discord.token == "YOUR_DISCORD_TOKEN_HERE" {
        errors.push("discord.token has not been configured (still using placeholder)".to_string());
    }

    if config.telegram.token.is_empty() {
        errors.push("telegram.token is required".to_string());
    }
    if config.telegram.token == "YOUR_TELEGRAM_TOKEN_HERE" {
        errors.push("telegram.token has not been configured (still using placeholder)".to_string());
    }

    if config.storage.bridges.is_empty() {
        errors.push("storage.bridges must not be empty".to_string());
    }
    if config.storage.message_map.is_empty() {
        errors.push("storage.message_map must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("; "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::*;

    fn make_valid_config() -> Config {
        Config {
            discord: DiscordConfig {
                token: "d-token".to_string(),
            },
            telegram: TelegramConfig {
                token: "t-token".to_string(),
            },
            storage: StorageConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&make_valid_config()).is_ok());
    }

    #[test]
    fn test_empty_tokens_rejected() {
        let mut config = make_valid_config();
        config.discord.token = String::new();
        config.telegram.token = String::new();

        let err = validate_config(&config).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("discord.token"));
        assert!(message.contains("telegram.token"));
    }

    #[test]
    fn test_placeholder_token_rejected() {
        let mut config = make_valid_config();
        config.discord.token = "YOUR_DISCORD_TOKEN_HERE".to_string();

        assert!(validate_config(&config).is_err());
    }
}
