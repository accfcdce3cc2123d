//! Bridge membership registry.
//!
//! A bridge is a named grouping of Discord channels and Telegram chats that
//! relay to each other. Membership is persisted as a JSON document and
//! rewritten in full after every mutation, so an acknowledged change is a
//! durable one. A malformed document on disk is replaced by an empty
//! registry at load time rather than failing startup.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::common::error::RegistryResult;

/// Name used when a bridge name is missing or blank.
pub const DEFAULT_BRIDGE_NAME: &str = "default";

/// Maximum length of a bridge name, in characters.
const BRIDGE_NAME_MAX_CHARS: usize = 64;

/// Normalize a user-supplied bridge name.
///
/// Trims surrounding whitespace and caps the length; a missing or blank
/// name collapses to [`DEFAULT_BRIDGE_NAME`]. Idempotent.
pub fn normalize_bridge_name(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        return DEFAULT_BRIDGE_NAME.to_string();
    }
    name.chars().take(BRIDGE_NAME_MAX_CHARS).collect()
}

/// Membership of a single bridge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeEntry {
    #[serde(default)]
    pub discord_channels: BTreeSet<i64>,
    #[serde(default)]
    pub telegram_chats: BTreeSet<i64>,
}

impl BridgeEntry {
    fn is_empty(&self) -> bool {
        self.discord_channels.is_empty() && self.telegram_chats.is_empty()
    }
}

/// The persisted document shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    bridges: BTreeMap<String, BridgeEntry>,
}

/// In-memory registry with write-through JSON persistence.
///
/// Mutations take the write lock and save the document before returning,
/// so they are serialized and durable on acknowledgement. Reads take the
/// shared lock against the last-committed snapshot.
#[derive(Clone)]
pub struct BridgeRegistry {
    path: PathBuf,
    inner: Arc<RwLock<RegistryDocument>>,
}

impl BridgeRegistry {
    /// Load the registry from disk.
    ///
    /// A missing file yields an empty registry; a malformed one is logged
    /// and likewise replaced by an empty registry.
    pub async fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();

        let document = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str::<RegistryDocument>(&raw) {
                Ok(document) => {
                    info!(
                        "Loaded {} bridge(s) from {}",
                        document.bridges.len(),
                        path.display()
                    );
                    document
                }
                Err(e) => {
                    warn!(
                        "Malformed registry document at {} ({}), starting empty",
                        path.display(),
                        e
                    );
                    RegistryDocument::default()
                }
            },
            Err(_) => RegistryDocument::default(),
        };

        Self {
            path,
            inner: Arc::new(RwLock::new(document)),
        }
    }

    /// Create an empty registry persisted at the given path (for testing).
    #[cfg(test)]
    pub fn empty(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            inner: Arc::new(RwLock::new(RegistryDocument::default())),
        }
    }

    async fn save(&self, document: &RegistryDocument) -> RegistryResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let mut raw = serde_json::to_string_pretty(document)?;
        raw.push('\n');
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }

    /// Names of all bridges containing the given Discord channel.
    pub async fn bridges_for_discord_channel(&self, channel_id: i64) -> Vec<String> {
        let document = self.inner.read().await;
        document
            .bridges
            .iter()
            .filter(|(_, entry)| entry.discord_channels.contains(&channel_id))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Names of all bridges containing the given Telegram chat.
    pub async fn bridges_for_telegram_chat(&self, chat_id: i64) -> Vec<String> {
        let document = self.inner.read().await;
        document
            .bridges
            .iter()
            .filter(|(_, entry)| entry.telegram_chats.contains(&chat_id))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Discord channels belonging to a bridge, in ascending order.
    pub async fn discord_channels(&self, bridge_name: &str) -> Vec<i64> {
        let document = self.inner.read().await;
        document
            .bridges
            .get(bridge_name)
            .map(|entry| entry.discord_channels.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Telegram chats belonging to a bridge, in ascending order.
    pub async fn telegram_chats(&self, bridge_name: &str) -> Vec<i64> {
        let document = self.inner.read().await;
        document
            .bridges
            .get(bridge_name)
            .map(|entry| entry.telegram_chats.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Snapshot of all bridges and their membership, sorted by name.
    pub async fn list_bridges(&self) -> BTreeMap<String, BridgeEntry> {
        self.inner.read().await.bridges.clone()
    }

    /// Add a Discord channel to a bridge.
    ///
    /// Returns `false` without touching disk when the channel is already a
    /// member; `true` once the updated document has been persisted.
    pub async fn add_discord_channel(
        &self,
        bridge_name: &str,
        channel_id: i64,
    ) -> RegistryResult<bool> {
        let bridge_name = normalize_bridge_name(bridge_name);
        let mut document = self.inner.write().await;

        let entry = document.bridges.entry(bridge_name).or_default();
        if !entry.discord_channels.insert(channel_id) {
            return Ok(false);
        }
        self.save(&document).await?;
        Ok(true)
    }

    /// Add a Telegram chat to a bridge.
    pub async fn add_telegram_chat(
        &self,
        bridge_name: &str,
        chat_id: i64,
    ) -> RegistryResult<bool> {
        let bridge_name = normalize_bridge_name(bridge_name);
        let mut document = self.inner.write().await;

        let entry = document.bridges.entry(bridge_name).or_default();
        if !entry.telegram_chats.insert(chat_id) {
            return Ok(false);
        }
        self.save(&document).await?;
        Ok(true)
    }

    /// Remove a Discord channel from a bridge.
    ///
    /// Returns `false` when the bridge or the membership does not exist.
    /// A bridge left with no members at all is pruned from the registry.
    pub async fn remove_discord_channel(
        &self,
        bridge_name: &str,
        channel_id: i64,
    ) -> RegistryResult<bool> {
        let bridge_name = normalize_bridge_name(bridge_name);
        let mut document = self.inner.write().await;

        let Some(entry) = document.bridges.get_mut(&bridge_name) else {
            return Ok(false);
        };
        if !entry.discord_channels.remove(&channel_id) {
            return Ok(false);
        }
        if entry.is_empty() {
            document.bridges.remove(&bridge_name);
        }
        self.save(&document).await?;
        Ok(true)
    }

    /// Remove a Telegram chat from a bridge.
    pub async fn remove_telegram_chat(
        &self,
        bridge_name: &str,
        chat_id: i64,
    ) -> RegistryResult<bool> {
        let bridge_name = normalize_bridge_name(bridge_name);
        let mut document = self.inner.write().await;

        let Some(entry) = document.bridges.get_mut(&bridge_name) else {
            return Ok(false);
        };
        if !entry.telegram_chats.remove(&chat_id) {
            return Ok(false);
        }
        if entry.is_empty() {
            document.bridges.remove(&bridge_name);
        }
        self.save(&document).await?;
        Ok(true)
    }
}
