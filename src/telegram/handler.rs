//! Telegram message event handling.
//!
//! Runs the teloxide dispatcher, translates updates into the
//! bridge-agnostic event shape, and hands relayable ones to the relay
//! engine. Raw-type gating (missing sender, broadcast channels) happens
//! here at the adapter boundary.

use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::User;
use tracing::{debug, info};

use crate::bridge::normalize::normalize;
use crate::bridge::relay::{Direction, SourceMessage};
use crate::bridge::BridgeContext;
use crate::common::messages::{Author, EventKind, InboundEvent, MediaKind};
use crate::common::types::Platform;
use crate::telegram::commands;

/// Run the Telegram dispatcher until shutdown.
pub async fn run(bot: Bot, app: Arc<BridgeContext>) -> Result<()> {
    info!("Starting Telegram dispatcher...");

    let handler = Update::filter_message().endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![app])
        .default_handler(|upd| async move {
            debug!("Unhandled Telegram update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_message(bot: Bot, msg: Message, app: Arc<BridgeContext>) -> ResponseResult<()> {
    let Some(user) = msg.from.clone() else {
        return Ok(());
    };
    // Broadcast channels have no conversation to thread; only groups and
    // private chats are bridged.
    if msg.chat.is_channel() {
        return Ok(());
    }

    if let Some(text) = msg.text() {
        if text.starts_with('/')
            && commands::handle_command(&bot, &msg, &app.registry, text).await?
        {
            return Ok(());
        }
    }

    let chat_id = msg.chat.id.0;
    let bridges = app.registry.bridges_for_telegram_chat(chat_id).await;
    if bridges.is_empty() {
        return Ok(());
    }

    let event = to_inbound_event(&msg, &user);
    let Some(normalized) = normalize(&event) else {
        return Ok(());
    };
    let text = normalized.render();
    let source = SourceMessage {
        location_id: chat_id,
        message_id: event.message_id,
        parent_id: normalized.parent_id,
    };

    for bridge in bridges {
        let channels = app.registry.discord_channels(&bridge).await;
        if channels.is_empty() {
            continue;
        }
        app.relay
            .fan_out(
                &app.discord,
                Direction::TelegramToDiscord,
                &bridge,
                &source,
                &text,
                &channels,
            )
            .await;
    }

    Ok(())
}

/// Build the bridge-agnostic event for a Telegram message.
fn to_inbound_event(msg: &Message, user: &User) -> InboundEvent {
    let kind = if let Some(text) = msg.text() {
        EventKind::Text {
            body: text.to_string(),
            attachments: Vec::new(),
        }
    } else if let Some(kind) = media_kind(msg) {
        EventKind::Media {
            kind,
            caption: msg.caption().map(str::to_string),
        }
    } else if let Some(caption) = msg.caption() {
        // Captioned media outside the recognized kinds still relays its text.
        EventKind::Text {
            body: caption.to_string(),
            attachments: Vec::new(),
        }
    } else {
        EventKind::Unsupported
    };

    let display_name = {
        let name = user.full_name();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    };

    InboundEvent {
        platform: Platform::Telegram,
        location_id: msg.chat.id.0,
        location_title: msg
            .chat
            .title()
            .map(str::to_string)
            .or_else(|| msg.chat.username().map(str::to_string)),
        author: Author {
            id: user.id.0 as i64,
            display_name,
            username: user.username.clone(),
            automated: user.is_bot,
        },
        kind,
        message_id: i64::from(msg.id.0),
        parent_id: msg.reply_to_message().map(|parent| i64::from(parent.id.0)),
    }
}

fn media_kind(msg: &Message) -> Option<MediaKind> {
    if msg.photo().is_some() {
        Some(MediaKind::Photo)
    } else if msg.document().is_some() {
        Some(MediaKind::Document)
    } else if msg.sticker().is_some() {
        Some(MediaKind::Sticker)
    } else if msg.voice().is_some() {
        Some(MediaKind::Voice)
    } else if msg.video().is_some() {
        Some(MediaKind::Video)
    } else {
        None
    }
}
