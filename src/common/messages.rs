//! Canonical message types for relay communication.
//!
//! This module defines the single source of truth for the event shape the
//! relay core operates on. Platform adapters translate their native event
//! objects into `InboundEvent` at the boundary; nothing past that boundary
//! touches serenity or teloxide types.

use crate::common::types::Platform;

/// Kind of media carried by an event that has no text body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Document,
    Sticker,
    Voice,
    Video,
}

impl MediaKind {
    /// Lowercase label used for the `[kind]` body placeholder.
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Document => "document",
            MediaKind::Sticker => "sticker",
            MediaKind::Voice => "voice",
            MediaKind::Video => "video",
        }
    }
}

/// Closed set of event payload variants the normalizer understands.
#[derive(Debug, Clone)]
pub enum EventKind {
    /// A plain text message, with any attachment URLs in original order.
    Text {
        body: String,
        attachments: Vec<String>,
    },
    /// A media message with an optional caption.
    Media {
        kind: MediaKind,
        caption: Option<String>,
    },
    /// Anything outside the relayable allow-list (system events, polls, ...).
    Unsupported,
}

/// The author of an inbound event.
#[derive(Debug, Clone)]
pub struct Author {
    /// Platform-native numeric id.
    pub id: i64,
    /// Display name, if the platform provides one.
    pub display_name: Option<String>,
    /// Account/user name, if distinct from the display name concept.
    pub username: Option<String>,
    /// Whether the author is a bot, webhook, or other automated actor.
    pub automated: bool,
}

/// A platform event translated to the bridge-agnostic shape.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub platform: Platform,
    /// Channel id (Discord) or chat id (Telegram) the event arrived in.
    pub location_id: i64,
    /// Human-readable location name ("Guild#channel", chat title), if known.
    pub location_title: Option<String>,
    pub author: Author,
    pub kind: EventKind,
    /// The event's own message id on its platform.
    pub message_id: i64,
    /// Message id this event replies to, on the same platform.
    pub parent_id: Option<i64>,
}

/// Relayable text payload produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedMessage {
    /// Origin label line, e.g. `[Telegram lounge] Alice (@alice):`.
    pub origin: String,
    /// Body text; never empty.
    pub body: String,
    /// Parent message id carried through from the inbound event.
    pub parent_id: Option<i64>,
}

impl NormalizedMessage {
    /// Render the payload as the text actually sent to destinations.
    pub fn render(&self) -> String {
        format!("{}\n{}", self.origin, self.body)
    }
}
