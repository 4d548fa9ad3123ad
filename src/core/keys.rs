//! Key parsing for legacy xterm sequences and the kitty CSI-u encoding.
//!
//! Key identifiers are lowercase-modifier strings such as `ctrl+u`, `alt+enter`,
//! `shift+tab` or `pageDown`. Modifiers are always emitted in the order
//! `ctrl`, `alt`, `shift` so identifiers can be compared as plain strings.

const MOD_SHIFT: u8 = 1;
const MOD_ALT: u8 = 2;
const MOD_CTRL: u8 = 4;

/// Parsed key identifier (`ctrl+alt+x` → modifiers + base key).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub name: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Key {
    fn new(name: impl Into<String>, modifier: u8) -> Self {
        Self {
            name: name.into(),
            ctrl: modifier & MOD_CTRL != 0,
            alt: modifier & MOD_ALT != 0,
            shift: modifier & MOD_SHIFT != 0,
        }
    }

    /// Parses a key identifier like `ctrl+s` or `shift+Tab`.
    pub fn parse(key_id: &str) -> Option<Self> {
        let key_id = key_id.trim();
        if key_id.is_empty() {
            return None;
        }

        // `alt++` and `ctrl++` name the plus key itself.
        let (modifiers, name) = match key_id.strip_suffix("++") {
            Some(prefix) => (prefix, "+"),
            None => match key_id.rsplit_once('+') {
                Some((prefix, name)) if !name.is_empty() => (prefix, name),
                _ => ("", key_id),
            },
        };

        let mut modifier = 0u8;
        for part in modifiers.split('+').filter(|part| !part.is_empty()) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => modifier |= MOD_CTRL,
                "alt" | "option" | "meta" => modifier |= MOD_ALT,
                "shift" => modifier |= MOD_SHIFT,
                _ => return None,
            }
        }

        Some(Self::new(normalize_name(name), modifier))
    }

    /// Canonical identifier for this key.
    pub fn id(&self) -> String {
        let mut id = String::new();
        if self.ctrl {
            id.push_str("ctrl+");
        }
        if self.alt {
            id.push_str("alt+");
        }
        if self.shift {
            id.push_str("shift+");
        }
        id.push_str(&self.name);
        id
    }
}

fn normalize_name(name: &str) -> String {
    match name.to_ascii_lowercase().as_str() {
        "esc" | "escape" => "escape".to_string(),
        "return" | "enter" => "enter".to_string(),
        "pageup" | "pgup" => "pageUp".to_string(),
        "pagedown" | "pgdown" => "pageDown".to_string(),
        "del" | "delete" => "delete".to_string(),
        "bs" | "backspace" => "backspace".to_string(),
        "space" | " " => "space".to_string(),
        _ if name.chars().count() == 1 => name.to_string(),
        lower => lower.to_string(),
    }
}

/// Returns whether the raw input sequence `data` produces `key_id`.
pub fn matches_key(data: &str, key_id: &str) -> bool {
    let Some(expected) = Key::parse(key_id) else {
        return false;
    };
    parse_key(data).is_some_and(|actual| actual == expected.id())
}

/// Parses one raw terminal sequence into a canonical key identifier.
pub fn parse_key(data: &str) -> Option<String> {
    if data.is_empty() {
        return None;
    }

    if let Some(key) = parse_csi_u(data) {
        return Some(key.id());
    }

    if let Some(key) = legacy_sequence_key(data) {
        return Some(key.to_string());
    }

    let mut chars = data.chars();
    let first = chars.next()?;
    let rest = chars.as_str();

    if first == '\x1b' && !rest.is_empty() {
        let inner = parse_key(rest)?;
        if inner.starts_with("alt+") || rest.starts_with('\x1b') {
            return None;
        }
        return Some(format!("alt+{inner}").replace("alt+ctrl+", "ctrl+alt+"));
    }

    if !rest.is_empty() {
        return None;
    }

    control_char_key(first)
}

fn control_char_key(ch: char) -> Option<String> {
    let key = match ch {
        '\r' => "enter".to_string(),
        '\t' => "tab".to_string(),
        '\x1b' => "escape".to_string(),
        '\x7f' | '\x08' => "backspace".to_string(),
        '\x00' => "ctrl+space".to_string(),
        '\n' => "ctrl+j".to_string(),
        '\x1c' => "ctrl+\\".to_string(),
        '\x1d' => "ctrl+]".to_string(),
        '\x1e' => "ctrl+^".to_string(),
        '\x1f' => "ctrl+_".to_string(),
        ' ' => "space".to_string(),
        '\x01'..='\x1a' => {
            let letter = (b'a' + (ch as u8 - 1)) as char;
            format!("ctrl+{letter}")
        }
        ch if !ch.is_control() => ch.to_string(),
        _ => return None,
    };
    Some(key)
}

fn legacy_sequence_key(data: &str) -> Option<&'static str> {
    let key = match data {
        "\x1b[A" | "\x1bOA" => "up",
        "\x1b[B" | "\x1bOB" => "down",
        "\x1b[C" | "\x1bOC" => "right",
        "\x1b[D" | "\x1bOD" => "left",
        "\x1b[H" | "\x1bOH" | "\x1b[1~" | "\x1b[7~" => "home",
        "\x1b[F" | "\x1bOF" | "\x1b[4~" | "\x1b[8~" => "end",
        "\x1b[2~" => "insert",
        "\x1b[3~" => "delete",
        "\x1b[5~" => "pageUp",
        "\x1b[6~" => "pageDown",
        "\x1b[Z" => "shift+tab",
        "\x1b\r" => "alt+enter",
        "\x1b\x7f" | "\x1b\x08" => "alt+backspace",
        "\x1b[1;2A" => "shift+up",
        "\x1b[1;2B" => "shift+down",
        "\x1b[1;2C" => "shift+right",
        "\x1b[1;2D" => "shift+left",
        "\x1b[1;3A" => "alt+up",
        "\x1b[1;3B" => "alt+down",
        "\x1b[1;3C" => "alt+right",
        "\x1b[1;3D" => "alt+left",
        "\x1b[1;5A" => "ctrl+up",
        "\x1b[1;5B" => "ctrl+down",
        "\x1b[1;5C" => "ctrl+right",
        "\x1b[1;5D" => "ctrl+left",
        "\x1b[3;3~" => "alt+delete",
        _ => return None,
    };
    Some(key)
}

/// Parses kitty keyboard protocol sequences (`CSI code[:alt] ; modifier u`).
fn parse_csi_u(data: &str) -> Option<Key> {
    let body = data.strip_prefix("\x1b[")?.strip_suffix('u')?;
    let mut parts = body.split(';');
    let code_part = parts.next()?;
    let codepoint: u32 = code_part.split(':').next()?.parse().ok()?;
    let modifier = match parts.next() {
        Some(raw) => {
            let value: u8 = raw.split(':').next()?.parse().ok()?;
            value.saturating_sub(1) & (MOD_SHIFT | MOD_ALT | MOD_CTRL)
        }
        None => 0,
    };

    let name = match codepoint {
        27 => "escape".to_string(),
        13 | 57414 => "enter".to_string(),
        9 => "tab".to_string(),
        32 => "space".to_string(),
        127 => "backspace".to_string(),
        code => char::from_u32(code)?.to_string(),
    };
    Some(Key::new(name, modifier))
}

/// Returns printable text for `data`, or `None` when it is a key sequence.
pub fn parse_text(data: &str) -> Option<String> {
    if data.is_empty() || data.chars().any(char::is_control) {
        return None;
    }
    Some(data.to_string())
}

#[cfg(test)]
mod tests {
    use super::{matches_key, parse_key, parse_text, Key};

    #[test]
    fn control_characters_map_to_ctrl_letters() {
        assert_eq!(parse_key("\x15").as_deref(), Some("ctrl+u"));
        assert_eq!(parse_key("\x04").as_deref(), Some("ctrl+d"));
        assert_eq!(parse_key("\x13").as_deref(), Some("ctrl+s"));
        assert_eq!(parse_key("\r").as_deref(), Some("enter"));
        assert_eq!(parse_key("\t").as_deref(), Some("tab"));
    }

    #[test]
    fn escape_prefix_becomes_alt() {
        assert_eq!(parse_key("\x1bc").as_deref(), Some("alt+c"));
        assert_eq!(parse_key("\x1b\r").as_deref(), Some("alt+enter"));
        assert_eq!(parse_key("\x1b\x01").as_deref(), Some("ctrl+alt+a"));
    }

    #[test]
    fn legacy_arrow_and_navigation_sequences() {
        assert_eq!(parse_key("\x1b[A").as_deref(), Some("up"));
        assert_eq!(parse_key("\x1bOB").as_deref(), Some("down"));
        assert_eq!(parse_key("\x1b[Z").as_deref(), Some("shift+tab"));
        assert_eq!(parse_key("\x1b[6~").as_deref(), Some("pageDown"));
    }

    #[test]
    fn kitty_sequences_decode_modifiers() {
        assert_eq!(parse_key("\x1b[115;5u").as_deref(), Some("ctrl+s"));
        assert_eq!(parse_key("\x1b[13;3u").as_deref(), Some("alt+enter"));
        assert_eq!(parse_key("\x1b[27u").as_deref(), Some("escape"));
    }

    #[test]
    fn key_ids_are_normalized_before_matching() {
        assert!(matches_key("\x1b", "esc"));
        assert!(matches_key("\x1b[5~", "pgup"));
        assert!(matches_key("\x1b[Z", "Shift+Tab"));
        assert!(!matches_key("\x15", "ctrl+d"));
        assert_eq!(Key::parse("alt++").map(|key| key.id()).as_deref(), Some("alt++"));
    }

    #[test]
    fn printable_text_is_not_a_key_event() {
        assert_eq!(parse_text("abc").as_deref(), Some("abc"));
        assert_eq!(parse_text("\x1b[A"), None);
        assert_eq!(parse_text("\r"), None);
    }
}
