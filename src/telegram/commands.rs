//! Telegram bot commands (/here, /unhere, /bridges).

use teloxide::prelude::*;
use tracing::{debug, error, info};

use crate::bridge::registry::{normalize_bridge_name, BridgeRegistry};

/// Parse and execute a command from Telegram.
///
/// Returns `true` if the message was a recognized command, `false`
/// otherwise. Command tokens tolerate the `@botname` suffix Telegram
/// appends in group chats.
pub async fn handle_command(
    bot: &Bot,
    msg: &Message,
    registry: &BridgeRegistry,
    text: &str,
) -> ResponseResult<bool> {
    if text.len() > 100 {
        return Ok(false);
    }

    let parts: Vec<&str> = text[1..].splitn(2, ' ').collect();
    let command = parts[0]
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();
    let args = parts.get(1).map(|s| s.trim().to_string());

    debug!("Processing command: {} with args: {:?}", command, args);

    match command.as_str() {
        "here" => {
            handle_here(bot, msg, registry, args).await?;
            Ok(true)
        }
        "unhere" => {
            handle_unhere(bot, msg, registry, args).await?;
            Ok(true)
        }
        "bridges" => {
            handle_bridges(bot, msg, registry).await?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Handle /here: add this chat to a bridge.
async fn handle_here(
    bot: &Bot,
    msg: &Message,
    registry: &BridgeRegistry,
    args: Option<String>,
) -> ResponseResult<()> {
    let bridge = normalize_bridge_name(args.as_deref().unwrap_or(""));
    info!("/here command in chat {} for bridge '{}'", msg.chat.id, bridge);

    let reply = match registry.add_telegram_chat(&bridge, msg.chat.id.0).await {
        Ok(true) => format!("Added this chat to bridge '{}'.", bridge),
        Ok(false) => format!("This chat is already in bridge '{}'.", bridge),
        Err(e) => {
            error!("Failed to persist bridge membership: {}", e);
            "Failed to update bridge configuration.".to_string()
        }
    };
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

/// Handle /unhere: remove this chat from a bridge.
async fn handle_unhere(
    bot: &Bot,
    msg: &Message,
    registry: &BridgeRegistry,
    args: Option<String>,
) -> ResponseResult<()> {
    let bridge = normalize_bridge_name(args.as_deref().unwrap_or(""));
    info!(
        "/unhere command in chat {} for bridge '{}'",
        msg.chat.id, bridge
    );

    let reply = match registry.remove_telegram_chat(&bridge, msg.chat.id.0).await {
        Ok(true) => format!("Removed this chat from bridge '{}'.", bridge),
        Ok(false) => format!("This chat is not in bridge '{}'.", bridge),
        Err(e) => {
            error!("Failed to persist bridge membership: {}", e);
            "Failed to update bridge configuration.".to_string()
        }
    };
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

/// Handle /bridges: list configured bridges with membership counts.
async fn handle_bridges(bot: &Bot, msg: &Message, registry: &BridgeRegistry) -> ResponseResult<()> {
    let bridges = registry.list_bridges().await;
    if bridges.is_empty() {
        bot.send_message(msg.chat.id, "No bridges configured.")
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
    bot.send_message(msg.chat.id, lines.join("\n")).await?;
    Ok(())
}
