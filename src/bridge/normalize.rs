//! Message normalization.
//!
//! Pure mapping from an [`InboundEvent`] to the text payload relayed to the
//! other platform, or `None` when the event is not relayable: automated
//! authors (which would loop our own relayed messages back in), unsupported
//! event kinds, and events whose assembled body comes out empty.

use crate::common::messages::{Author, EventKind, InboundEvent, NormalizedMessage};

/// Normalize an inbound event into a relayable payload.
pub fn normalize(event: &InboundEvent) -> Option<NormalizedMessage> {
    if event.author.automated {
        return None;
    }

    let body = assemble_body(&event.kind)?;

    Some(NormalizedMessage {
        origin: origin_label(event),
        body,
        parent_id: event.parent_id,
    })
}

/// Assemble the body text for an event, one line per part.
///
/// Text events contribute their trimmed body plus each attachment URL in
/// order; media events contribute the caption, or a bracketed kind label
/// when there is none. Returns `None` when nothing remains.
fn assemble_body(kind: &EventKind) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();

    match kind {
        EventKind::Text { body, attachments } => {
            let body = body.trim();
            if !body.is_empty() {
                parts.push(body);
            }
            for url in attachments {
                parts.push(url);
            }
        }
        EventKind::Media { kind, caption } => {
            match caption.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
                Some(caption) => parts.push(caption),
                None => return Some(format!("[{}]", kind.label())),
            }
        }
        EventKind::Unsupported => return None,
    }

    let body = parts.join("\n");
    if body.trim().is_empty() {
        None
    } else {
        Some(body)
    }
}

/// Build the origin label line: platform tag, location, author.
fn origin_label(event: &InboundEvent) -> String {
    let location = event
        .location_title
        .clone()
        .unwrap_or_else(|| event.location_id.to_string());

    format!(
        "[{} {}] {}:",
        event.platform.tag(),
        location,
        author_label(&event.author)
    )
}

/// The author portion of the origin label.
///
/// Display name, falling back to username, falling back to the numeric id;
/// a username distinct from the shown name is appended parenthetically.
fn author_label(author: &Author) -> String {
    let display = author
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    let username = author
        .username
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    match (display, username) {
        (Some(display), Some(username)) if display != username => {
            format!("{} (@{})", display, username)
        }
        (Some(display), _) => display.to_string(),
        (None, Some(username)) => username.to_string(),
        (None, None) => author.id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::messages::MediaKind;
    use crate::common::types::Platform;

    fn make_event(kind: EventKind) -> InboundEvent {
        InboundEvent {
            platform: Platform::Telegram,
            location_id: -100200,
            location_title: Some("lounge".to_string()),
            author: Author {
                id: 7,
                display_name: Some("Alice".to_string()),
                username: Some("alice".to_string()),
                automated: false,
            },
            kind,
            message_id: 1,
            parent_id: None,
        }
    }

    #[test]
    fn test_text_message() {
        let event = make_event(EventKind::Text {
            body: "hello there".to_string(),
            attachments: vec![],
        });

        let normalized = normalize(&event).expect("text should be relayable");
        assert_eq!(normalized.origin, "[Telegram lounge] Alice (@alice):");
        assert_eq!(normalized.body, "hello there");
        assert_eq!(
            normalized.render(),
            "[Telegram lounge] Alice (@alice):\nhello there"
        );
    }

    #[test]
    fn test_attachments_append_as_lines() {
        let event = make_event(EventKind::Text {
            body: "look".to_string(),
            attachments: vec![
                "https://cdn.example/a.png".to_string(),
                "https://cdn.example/b.png".to_string(),
            ],
        });

        let normalized = normalize(&event).unwrap();
        assert_eq!(
            normalized.body,
            "look\nhttps://cdn.example/a.png\nhttps://cdn.example/b.png"
        );
    }

    #[test]
    fn test_attachments_without_text() {
        let event = make_event(EventKind::Text {
            body: "   ".to_string(),
            attachments: vec!["https://cdn.example/a.png".to_string()],
        });

        let normalized = normalize(&event).unwrap();
        assert_eq!(normalized.body, "https://cdn.example/a.png");
    }

    #[test]
    fn test_empty_body_not_relayable() {
        let event = make_event(EventKind::Text {
            body: "   ".to_string(),
            attachments: vec![],
        });
        assert!(normalize(&event).is_none());
    }

    #[test]
    fn test_automated_author_not_relayable() {
        let mut event = make_event(EventKind::Text {
            body: "beep".to_string(),
            attachments: vec![],
        });
        event.author.automated = true;
        assert!(normalize(&event).is_none());
    }

    #[test]
    fn test_unsupported_kind_not_relayable() {
        assert!(normalize(&make_event(EventKind::Unsupported)).is_none());
    }

    #[test]
    fn test_media_caption_is_body() {
        let event = make_event(EventKind::Media {
            kind: MediaKind::Photo,
            caption: Some("sunset".to_string()),
        });
        assert_eq!(normalize(&event).unwrap().body, "sunset");
    }

    #[test]
    fn test_captionless_media_gets_kind_placeholder() {
        let event = make_event(EventKind::Media {
            kind: MediaKind::Voice,
            caption: None,
        });
        assert_eq!(normalize(&event).unwrap().body, "[voice]");
    }

    #[test]
    fn test_location_falls_back_to_id() {
        let mut event = make_event(EventKind::Text {
            body: "hi".to_string(),
            attachments: vec![],
        });
        event.location_title = None;

        let normalized = normalize(&event).unwrap();
        assert!(normalized.origin.starts_with("[Telegram -100200]"));
    }

    #[test]
    fn test_author_fallbacks() {
        let mut event = make_event(EventKind::Text {
            body: "hi".to_string(),
            attachments: vec![],
        });

        // Same display name and username: no parenthetical.
        event.author.display_name = Some("alice".to_string());
        assert_eq!(
            normalize(&event).unwrap().origin,
            "[Telegram lounge] alice:"
        );

        // No display name: username alone.
        event.author.display_name = None;
        assert_eq!(
            normalize(&event).unwrap().origin,
            "[Telegram lounge] alice:"
        );

        // Neither: numeric id.
        event.author.username = None;
        assert_eq!(normalize(&event).unwrap().origin, "[Telegram lounge] 7:");
    }

    #[test]
    fn test_parent_id_carried_through() {
        let mut event = make_event(EventKind::Text {
            body: "reply".to_string(),
            attachments: vec![],
        });
        event.parent_id = Some(99);
        assert_eq!(normalize(&event).unwrap().parent_id, Some(99));
    }

    #[test]
    fn test_discord_origin_label() {
        let event = InboundEvent {
            platform: Platform::Discord,
            location_id: 4242,
            location_title: Some("Guild#general".to_string()),
            author: Author {
                id: 1,
                display_name: Some("Bob".to_string()),
                username: Some("bob42".to_string()),
                automated: false,
            },
            kind: EventKind::Text {
                body: "ping".to_string(),
                attachments: vec![],
            },
            message_id: 5,
            parent_id: None,
        };

        assert_eq!(
            normalize(&event).unwrap().origin,
            "[Discord Guild#general] Bob (@bob42):"
        );
    }
}
