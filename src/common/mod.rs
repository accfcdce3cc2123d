//! Shared types, messages, and errors.

pub mod error;
pub mod messages;
pub mod types;

pub use error::{AdapterError, RelayError, StoreError};
pub use messages::{Author, EventKind, InboundEvent, MediaKind, NormalizedMessage};
pub use types::{Platform, DISCORD_MESSAGE_LIMIT, TELEGRAM_MESSAGE_LIMIT};
