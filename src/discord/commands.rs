//! Discord bot commands (!here, !unhere, !bridges).
//!
//! Handles command parsing and execution for bridge administration.

use serenity::model::channel::Message;
use serenity::prelude::*;
use tracing::{debug, error, info};

use crate::bridge::registry::{normalize_bridge_name, BridgeRegistry};

/// Command handler for the Discord bot.
pub struct CommandHandler {
    registry: BridgeRegistry,
}

impl CommandHandler {
    pub fn new(registry: BridgeRegistry) -> Self {
        Self { registry }
    }

    /// Parse and execute a command from Discord.
    ///
    /// Returns `true` if the message was a command, `false` otherwise.
    pub async fn handle_command(
        &self,
        ctx: &Context,
        msg: &Message,
        content: &str,
    ) -> anyhow::Result<bool> {
        if content.len() > 100 {
            return Ok(false);
        }
        if !content.starts_with('!') {
            return Ok(false);
        }

        let parts: Vec<&str> = content[1..].splitn(2, ' ').collect();
        let command = parts[0].to_lowercase();
        let args = parts.get(1).map(|s| s.trim().to_string());

        debug!("Processing command: {} with args: {:?}", command, args);

        match command.as_str() {
            "here" => {
                self.handle_here(ctx, msg, args).await?;
                Ok(true)
            }
            "unhere" => {
                self.handle_unhere(ctx, msg, args).await?;
                Ok(true)
            }
            "bridges" => {
                self.handle_bridges(ctx, msg).await?;
                Ok(true)
            }
            "help" => {
                self.handle_help(ctx, msg).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Handle !here: add this channel to a bridge.
    async fn handle_here(
        &self,
        ctx: &Context,
        msg: &Message,
        args: Option<String>,
    ) -> anyhow::Result<()> {
        let bridge = normalize_bridge_name(args.as_deref().unwrap_or(""));
        info!(
            "!here command from {} for bridge '{}'",
            msg.author.name, bridge
        );

        let reply = match self
            .registry
            .add_discord_channel(&bridge, msg.channel_id.get() as i64)
            .await
        {
            Ok(true) => format!("Added this channel to bridge `{}`.", bridge),
            Ok(false) => format!("This channel is already in bridge `{}`.", bridge),
            Err(e) => {
                error!("Failed to persist bridge membership: {}", e);
                "Failed to update bridge configuration.".to_string()
            }
        };
        msg.channel_id.say(&ctx.http, reply).await?;
        Ok(())
    }

    /// Handle !unhere: remove this channel from a bridge.
    async fn handle_unhere(
        &self,
        ctx: &Context,
        msg: &Message,
        args: Option<String>,
    ) -> anyhow::Result<()> {
        let bridge = normalize_bridge_name(args.as_deref().unwrap_or(""));
        info!(
            "!unhere command from {} for bridge '{}'",
            msg.author.name, bridge
        );

        let reply = match self
            .registry
            .remove_discord_channel(&bridge, msg.channel_id.get() as i64)
            .await
        {
            Ok(true) => format!("Removed this channel from bridge `{}`.", bridge),
            Ok(false) => format!("This channel is not in bridge `{}`.", bridge),
            Err(e) => {
                error!("Failed to persist bridge membership: {}", e);
                "Failed to update bridge configuration.".to_string()
            }
        };
        msg.channel_id.say(&ctx.http, reply).await?;
        Ok(())
    }

    /// Handle !bridges: list configured bridges with membership counts.
    async fn handle_bridges(&self, ctx: &Context, msg: &Message) -> anyhow::Result<()> {
        let bridges = self.registry.list_bridges().await;
        if bridges.is_empty() {
            msg.channel_id
                .say(&ctx.http, "No bridges configured.")
                .await?;
            return Ok(());
        }

        let lines: Vec<String> = bridges
            .iter()
            .map(|(name, entry)| {
                format!(
                    "- {}: dc={}, tg={}",
                    name,
                    entry.discord_channels.len(),
                    entry.telegram_chats.len()
                )
            })
            .collect();
        msg.channel_id.say(&ctx.http, lines.join("\n")).await?;
        Ok(())
    }

    /// Handle !help.
    async fn handle_help(&self, ctx: &Context, msg: &Message) -> anyhow::Result<()> {
        let help = "**Ferryman commands:**\n\
            `!here [bridge]` - Add this channel to a bridge (default: default)\n\
            `!unhere [bridge]` - Remove this channel from a bridge\n\
            `!bridges` - List bridges with membership counts";
        msg.channel_id.say(&ctx.http, help).await?;
        Ok(())
    }
}
