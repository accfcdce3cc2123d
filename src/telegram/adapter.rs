//! Telegram send adapter.

use async_trait::async_trait;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{LinkPreviewOptions, MessageId, ReplyParameters};

use crate::bridge::relay::PlatformAdapter;
use crate::common::error::AdapterError;
use crate::common::types::{Platform, TELEGRAM_MESSAGE_LIMIT};

pub struct TelegramAdapter {
    bot: Bot,
}

impl TelegramAdapter {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

/// Relayed text is full of raw URLs; previews would flood the chat.
fn disabled_link_preview() -> LinkPreviewOptions {
    LinkPreviewOptions {
        is_disabled: true,
        url: None,
        prefer_small_media: false,
        prefer_large_media: false,
        show_above_text: false,
    }
}

#[async_trait]
impl PlatformAdapter for TelegramAdapter {
    fn platform(&self) -> Platform {
        Platform::Telegram
    }

    fn message_limit(&self) -> usize {
        TELEGRAM_MESSAGE_LIMIT
    }

    async fn send_text(
        &self,
        location_id: i64,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<i64, AdapterError> {
        let mut request = self
            .bot
            .send_message(ChatId(location_id), text)
            .link_preview_options(disabled_link_preview());

        if let Some(parent_id) = reply_to {
            // The parent may have been deleted since it was recorded.
            let mut parameters = ReplyParameters::new(MessageId(parent_id as i32));
            parameters.allow_sending_without_reply = Some(true);
            request = request.reply_parameters(parameters);
        }

        let sent = request.await?;
        Ok(i64::from(sent.id.0))
    }
}
