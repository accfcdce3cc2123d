//! Error types for the application.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Correlation store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to open correlation store '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Correlation store query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bridge registry persistence errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to write registry document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize registry document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Platform adapter send errors.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Discord send failed: {0}")]
    Discord(#[from] serenity::Error),

    #[error("Telegram send failed: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Destination {location_id} is not a sendable channel")]
    NotSendable { location_id: i64 },
}

/// Relay errors for a single destination delivery.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Send failed: {0}")]
    Send(#[from] AdapterError),

    #[error("Correlation store failed: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for registry mutations.
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
