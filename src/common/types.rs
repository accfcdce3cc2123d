//! Shared types used across the application.

use std::fmt;

/// The two chat platforms the relay connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Discord,
    Telegram,
}

impl Platform {
    /// Human-readable tag used in origin labels.
    pub fn tag(&self) -> &'static str {
        match self {
            Platform::Discord => "Discord",
            Platform::Telegram => "Telegram",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Maximum text length of a single Telegram message.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// Maximum text length of a single Discord message.
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;
