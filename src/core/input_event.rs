//! Structured input events delivered to pages and widgets.

use crate::core::keys::{parse_key, parse_text};

pub const PASTE_START: &str = "\x1b[200~";
pub const PASTE_END: &str = "\x1b[201~";

/// Input event delivered to components.
///
/// `raw` is the exact sequence received from the terminal. `key_id` is the
/// normalized identifier used for keybinding lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key { raw: String, key_id: String },
    Text { raw: String, text: String },
    Paste { raw: String, text: String },
    Resize { columns: u16, rows: u16 },
    Unknown { raw: String },
}

impl InputEvent {
    /// Key identifier for key events, `None` otherwise.
    pub fn key_id(&self) -> Option<&str> {
        match self {
            Self::Key { key_id, .. } => Some(key_id.as_str()),
            _ => None,
        }
    }

    /// Builds a key event from a key identifier. Used by tests and replayed input.
    pub fn key(key_id: impl Into<String>) -> Self {
        let key_id = key_id.into();
        Self::Key {
            raw: key_id.clone(),
            key_id,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::Text {
            raw: text.clone(),
            text,
        }
    }
}

/// Converts one input sequence (as split by the terminal reader) into events.
///
/// Bracketed paste blocks may be embedded anywhere in `data`; the text around
/// them is parsed on its own.
pub fn parse_input_events(data: &str) -> Vec<InputEvent> {
    let mut events = Vec::new();
    let mut remaining = data;

    while !remaining.is_empty() {
        let Some(start) = remaining.find(PASTE_START) else {
            events.extend(parse_sequence(remaining));
            break;
        };

        events.extend(parse_sequence(&remaining[..start]));

        let after_start = &remaining[start + PASTE_START.len()..];
        let Some(end) = after_start.find(PASTE_END) else {
            events.push(InputEvent::Unknown {
                raw: remaining[start..].to_string(),
            });
            break;
        };

        let raw_end = start + PASTE_START.len() + end + PASTE_END.len();
        events.push(InputEvent::Paste {
            raw: remaining[start..raw_end].to_string(),
            text: after_start[..end].to_string(),
        });
        remaining = &remaining[raw_end..];
    }

    events
}

fn parse_sequence(data: &str) -> Option<InputEvent> {
    if data.is_empty() {
        return None;
    }

    // A lone space is typed text, not the `space` key.
    if let Some(text) = parse_text(data) {
        return Some(InputEvent::Text {
            raw: data.to_string(),
            text,
        });
    }

    if let Some(key_id) = parse_key(data) {
        return Some(InputEvent::Key {
            raw: data.to_string(),
            key_id,
        });
    }

    Some(InputEvent::Unknown {
        raw: data.to_string(),
    })
}
