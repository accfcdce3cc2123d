//! Discord send adapter.
//!
//! Owns the HTTP client and a channel-handle cache keyed by channel id.
//! A destination id is resolved to a guild channel once, cached, and the
//! cache entry is evicted whenever a fetch or send against it fails, so a
//! deleted or inaccessible channel is re-probed on the next attempt.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serenity::builder::{CreateAllowedMentions, CreateMessage};
use serenity::http::Http;
use serenity::model::channel::{Channel, ChannelType, GuildChannel, MessageReference};
use serenity::model::id::{ChannelId, MessageId};
use tokio::sync::Mutex;
use tracing::debug;

use crate::bridge::relay::PlatformAdapter;
use crate::common::error::AdapterError;
use crate::common::types::{Platform, DISCORD_MESSAGE_LIMIT};

pub struct DiscordAdapter {
    http: Arc<Http>,
    channels: Mutex<HashMap<i64, GuildChannel>>,
}

impl DiscordAdapter {
    pub fn new(http: Arc<Http>) -> Self {
        Self {
            http,
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a channel id to a sendable guild channel, consulting the
    /// cache first.
    async fn resolve_channel(&self, location_id: i64) -> Result<GuildChannel, AdapterError> {
        if let Some(channel) = self.channels.lock().await.get(&location_id) {
            return Ok(channel.clone());
        }

        let channel = self
            .http
            .get_channel(ChannelId::new(location_id as u64))
            .await?;

        let Channel::Guild(channel) = channel else {
            return Err(AdapterError::NotSendable { location_id });
        };
        if matches!(channel.kind, ChannelType::Category | ChannelType::Forum) {
            return Err(AdapterError::NotSendable { location_id });
        }

        self.channels
            .lock()
            .await
            .insert(location_id, channel.clone());
        Ok(channel)
    }

    async fn evict(&self, location_id: i64) {
        if self.channels.lock().await.remove(&location_id).is_some() {
            debug!(location_id, "Evicted cached Discord channel handle");
        }
    }
}

#[async_trait]
impl PlatformAdapter for DiscordAdapter {
    fn platform(&self) -> Platform {
        Platform::Discord
    }

    fn message_limit(&self) -> usize {
        DISCORD_MESSAGE_LIMIT
    }

    async fn send_text(
        &self,
        location_id: i64,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<i64, AdapterError> {
        let channel = self.resolve_channel(location_id).await?;

        // Relayed text must never ping anyone on the Discord side.
        let mut message = CreateMessage::new()
            .content(text)
            .allowed_mentions(CreateAllowedMentions::new());

        if let Some(parent_id) = reply_to {
            let mut reference = MessageReference::from((
                ChannelId::new(location_id as u64),
                MessageId::new(parent_id as u64),
            ));
            // The parent may have been deleted since it was recorded.
            reference.fail_if_not_exists = Some(false);
            message = message.reference_message(reference);
        }

        match channel.id.send_message(&self.http, message).await {
            Ok(sent) => Ok(sent.id.get() as i64),
            Err(e) => {
                self.evict(location_id).await;
                Err(e.into())
            }
        }
    }
}
