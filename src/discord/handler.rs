//! Discord message event handling.
//!
//! Translates serenity events into the bridge-agnostic event shape and
//! hands relayable ones to the relay engine. All raw-type gating (bots,
//! webhooks, non-guild messages, non-default message types) happens here
//! at the adapter boundary.

use std::sync::Arc;

use serenity::async_trait;
use serenity::model::channel::{Message, MessageType};
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tracing::error;

use crate::bridge::normalize::normalize;
use crate::bridge::relay::{Direction, SourceMessage};
use crate::bridge::BridgeContext;
use crate::common::messages::{Author, EventKind, InboundEvent};
use crate::common::types::Platform;
use crate::discord::commands::CommandHandler;

/// Discord event handler.
pub struct DiscordHandler {
    app: Arc<BridgeContext>,
    command_handler: CommandHandler,
}

impl DiscordHandler {
    pub fn new(app: Arc<BridgeContext>) -> Self {
        let command_handler = CommandHandler::new(app.registry.clone());
        Self {
            app,
            command_handler,
        }
    }

    /// Build the bridge-agnostic event for a guild message.
    ///
    /// Cache reads stay inside this synchronous helper so no cache guard is
    /// ever held across an await point.
    fn to_inbound_event(&self, ctx: &Context, msg: &Message) -> InboundEvent {
        let location_title = msg.guild_id.and_then(|guild_id| {
            ctx.cache.guild(guild_id).map(|guild| {
                match guild.channels.get(&msg.channel_id) {
                    Some(channel) => format!("{}#{}", guild.name, channel.name),
                    None => format!("{}#{}", guild.name, msg.channel_id),
                }
            })
        });

        InboundEvent {
            platform: Platform::Discord,
            location_id: msg.channel_id.get() as i64,
            location_title,
            author: Author {
                id: msg.author.id.get() as i64,
                display_name: Some(msg.author.display_name().to_string()),
                username: Some(msg.author.name.clone()),
                automated: msg.author.bot || msg.webhook_id.is_some(),
            },
            kind: EventKind::Text {
                body: msg.content.clone(),
                attachments: msg.attachments.iter().map(|a| a.url.clone()).collect(),
            },
            message_id: msg.id.get() as i64,
            parent_id: msg
                .message_reference
                .as_ref()
                .and_then(|r| r.message_id)
                .map(|id| id.get() as i64),
        }
    }
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn message(&self, ctx: Context, msg: Message) {
        // Never relay our own output or other automated senders.
        if msg.author.bot || msg.webhook_id.is_some() {
            return;
        }
        // Only plain guild messages (and inline replies to them) are relayable.
        if msg.guild_id.is_none() {
            return;
        }
        if !matches!(msg.kind, MessageType::Regular | MessageType::InlineReply) {
            return;
        }

        let content = msg.content.trim();
        if content.starts_with('!') {
            match self
                .command_handler
                .handle_command(&ctx, &msg, content)
                .await
            {
                Ok(true) => return,
                Ok(false) => {}
                Err(e) => {
                    error!("Command handler error: {}", e);
                    return;
                }
            }
        }

        let channel_id = msg.channel_id.get() as i64;
        let bridges = self.app.registry.bridges_for_discord_channel(channel_id).await;
        if bridges.is_empty() {
            return;
        }

        let event = self.to_inbound_event(&ctx, &msg);
        let Some(normalized) = normalize(&event) else {
            return;
        };
        let text = normalized.render();
        let source = SourceMessage {
            location_id: channel_id,
            message_id: event.message_id,
            parent_id: normalized.parent_id,
        };

        for bridge in bridges {
            let chats = self.app.registry.telegram_chats(&bridge).await;
            if chats.is_empty() {
                continue;
            }
            self.app
                .relay
                .fan_out(
                    &self.app.telegram,
                    Direction::DiscordToTelegram,
                    &bridge,
                    &source,
                    &text,
                    &chats,
                )
                .await;
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        tracing::info!("Discord bot connected as {}", ready.user.name);
    }
}
