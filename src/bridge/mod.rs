//! Core relay machinery: registry, correlation store, chunking, relay engine.
//!
//! ## Module Structure
//!
//! - `registry`: bridge membership registry with JSON persistence
//! - `store`: correlation store linking message ids across platforms
//! - `chunk`: text splitting under platform length limits
//! - `normalize`: platform event to relayable payload conversion
//! - `relay`: fan-out delivery engine

pub mod chunk;
pub mod normalize;
pub mod registry;
pub mod relay;
pub mod store;

pub use registry::{normalize_bridge_name, BridgeRegistry};
pub use relay::{Direction, PlatformAdapter, RelayEngine, SourceMessage};
pub use store::CorrelationStore;

use crate::discord::DiscordAdapter;
use crate::telegram::TelegramAdapter;

/// Everything an event handler needs to relay a message.
///
/// Built once at startup and shared across both platform handlers.
pub struct BridgeContext {
    pub registry: BridgeRegistry,
    pub relay: RelayEngine,
    pub discord: DiscordAdapter,
    pub telegram: TelegramAdapter,
}
