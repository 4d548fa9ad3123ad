//! Single-line text input.

use unicode_segmentation::UnicodeSegmentation;

use crate::core::component::{Component, Focusable};
use crate::core::input_event::InputEvent;
use crate::core::keybindings::{lock_keybindings, KeyAction, KeybindingsHandle};
use crate::core::style;
use crate::core::text::width::grapheme_width;
use crate::core::text::{pad_to_width, visible_width};

/// Single-line input with horizontal scrolling.
///
/// Enter and escape are left to the owner; the input only edits its value.
/// `secure` inputs echo `*` per grapheme, `numeric` inputs reject anything
/// that cannot appear in a number.
pub struct Input {
    value: String,
    cursor: usize,
    focused: bool,
    prompt: String,
    placeholder: String,
    secure: bool,
    numeric: bool,
    keybindings: KeybindingsHandle,
}

impl Input {
    pub fn new(keybindings: KeybindingsHandle) -> Self {
        Self {
            value: String::new(),
            cursor: 0,
            focused: false,
            prompt: String::new(),
            placeholder: String::new(),
            secure: false,
            numeric: false,
            keybindings,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replaces the value and moves the cursor to the end.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.len();
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn set_placeholder(&mut self, placeholder: impl Into<String>) {
        self.placeholder = placeholder.into();
    }

    pub fn set_secure(&mut self, secure: bool) {
        self.secure = secure;
    }

    pub fn set_numeric(&mut self, numeric: bool) {
        self.numeric = numeric;
    }

    fn insert_text(&mut self, text: &str) {
        let text: String = if self.numeric {
            text.chars()
                .filter(|ch| ch.is_ascii_digit() || matches!(ch, '.' | '-' | '+' | 'e' | 'E'))
                .collect()
        } else {
            text.chars().filter(|ch| !ch.is_control()).collect()
        };
        if text.is_empty() {
            return;
        }
        self.value.insert_str(self.cursor, &text);
        self.cursor += text.len();
    }

    fn previous_boundary(&self) -> usize {
        self.value[..self.cursor]
            .grapheme_indices(true)
            .next_back()
            .map_or(0, |(idx, _)| idx)
    }

    fn next_boundary(&self) -> usize {
        self.value[self.cursor..]
            .graphemes(true)
            .next()
            .map_or(self.cursor, |g| self.cursor + g.len())
    }

    fn word_start_before_cursor(&self) -> usize {
        let mut idx = self.cursor;
        let mut seen_word = false;
        for (start, grapheme) in self.value[..self.cursor].grapheme_indices(true).rev() {
            let blank = grapheme.chars().all(char::is_whitespace);
            if blank && seen_word {
                break;
            }
            seen_word |= !blank;
            idx = start;
        }
        idx
    }

    fn word_end_after_cursor(&self) -> usize {
        let mut idx = self.cursor;
        let mut seen_word = false;
        for grapheme in self.value[self.cursor..].graphemes(true) {
            let blank = grapheme.chars().all(char::is_whitespace);
            if blank && seen_word {
                break;
            }
            seen_word |= !blank;
            idx += grapheme.len();
        }
        idx
    }

    fn apply_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::DeleteCharBackward => {
                let start = self.previous_boundary();
                self.value.replace_range(start..self.cursor, "");
                self.cursor = start;
            }
            KeyAction::DeleteCharForward => {
                let end = self.next_boundary();
                self.value.replace_range(self.cursor..end, "");
            }
            KeyAction::DeleteWordBackward => {
                let start = self.word_start_before_cursor();
                self.value.replace_range(start..self.cursor, "");
                self.cursor = start;
            }
            KeyAction::DeleteToLineStart => {
                self.value.replace_range(..self.cursor, "");
                self.cursor = 0;
            }
            KeyAction::DeleteToLineEnd => self.value.truncate(self.cursor),
            KeyAction::CursorLeft => self.cursor = self.previous_boundary(),
            KeyAction::CursorRight => self.cursor = self.next_boundary(),
            KeyAction::CursorLineStart => self.cursor = 0,
            KeyAction::CursorLineEnd => self.cursor = self.value.len(),
            KeyAction::CursorWordLeft => self.cursor = self.word_start_before_cursor(),
            KeyAction::CursorWordRight => self.cursor = self.word_end_after_cursor(),
            _ => {}
        }
    }

    fn display_graphemes(&self) -> (Vec<String>, usize) {
        let mut graphemes = Vec::new();
        let mut cursor_index = 0;
        for (idx, grapheme) in self.value.grapheme_indices(true) {
            if idx < self.cursor {
                cursor_index += 1;
            }
            graphemes.push(if self.secure {
                "*".to_string()
            } else {
                grapheme.to_string()
            });
        }
        (graphemes, cursor_index)
    }
}

const EDIT_ACTIONS: [KeyAction; 11] = [
    KeyAction::DeleteCharBackward,
    KeyAction::DeleteCharForward,
    KeyAction::DeleteWordBackward,
    KeyAction::DeleteToLineStart,
    KeyAction::DeleteToLineEnd,
    KeyAction::CursorLeft,
    KeyAction::CursorRight,
    KeyAction::CursorLineStart,
    KeyAction::CursorLineEnd,
    KeyAction::CursorWordLeft,
    KeyAction::CursorWordRight,
];

impl Component for Input {
    fn render(&mut self, width: usize) -> Vec<String> {
        let prompt_width = visible_width(&self.prompt);
        let available = width.saturating_sub(prompt_width);
        if available == 0 {
            return vec![self.prompt.clone()];
        }

        if self.value.is_empty() && !self.placeholder.is_empty() {
            let cursor = if self.focused { style::reverse(" ") } else { String::new() };
            let placeholder =
                crate::core::text::truncate_to_width(&self.placeholder, available.saturating_sub(1), "…");
            let line = format!("{}{cursor}{}", self.prompt, style::dim(&placeholder));
            return vec![pad_to_width(&line, width)];
        }

        let (graphemes, cursor_index) = self.display_graphemes();
        // Keep one column for the cursor cell.
        let budget = available.saturating_sub(1).max(1);
        let mut start = 0;
        while start < cursor_index
            && graphemes[start..cursor_index]
                .iter()
                .map(|g| grapheme_width(g))
                .sum::<usize>()
                > budget
        {
            start += 1;
        }

        let mut line = self.prompt.clone();
        let mut used = 0;
        for (idx, grapheme) in graphemes.iter().enumerate().skip(start) {
            let cell = grapheme_width(grapheme);
            if used + cell > available {
                break;
            }
            if idx == cursor_index && self.focused {
                line.push_str(&style::reverse(grapheme));
            } else {
                line.push_str(grapheme);
            }
            used += cell;
        }
        if cursor_index == graphemes.len() && self.focused && used < available {
            line.push_str(&style::reverse(" "));
        }

        vec![pad_to_width(&line, width)]
    }

    fn handle_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Text { text, .. } => self.insert_text(text),
            InputEvent::Paste { text, .. } => self.insert_text(&text.replace(['\r', '\n'], " ")),
            InputEvent::Key { key_id, .. } => {
                if key_id == "space" {
                    self.insert_text(" ");
                    return;
                }
                let action = {
                    let keybindings = lock_keybindings(&self.keybindings);
                    EDIT_ACTIONS
                        .into_iter()
                        .find(|action| keybindings.matches(key_id, *action))
                };
                if let Some(action) = action {
                    self.apply_action(action);
                }
            }
            _ => {}
        }
    }

    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }
}

impl Focusable for Input {
    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn is_focused(&self) -> bool {
        self.focused
    }
}

#[cfg(test)]
mod tests {
    use super::Input;
    use crate::core::component::{Component, Focusable};
    use crate::core::input_event::parse_input_events;
    use crate::core::keybindings::default_keybindings_handle;
    use crate::core::text::{strip_ansi, visible_width};

    fn send(input: &mut Input, data: &str) {
        for event in parse_input_events(data) {
            input.handle_event(&event);
        }
    }

    #[test]
    fn edits_and_moves_cursor() {
        let mut input = Input::new(default_keybindings_handle());
        send(&mut input, "hello");
        assert_eq!(input.value(), "hello");
        assert_eq!(input.cursor, 5);

        send(&mut input, "\x1b[D");
        send(&mut input, "\x1b[D");
        send(&mut input, "p");
        assert_eq!(input.value(), "helplo");

        send(&mut input, "\x7f");
        assert_eq!(input.value(), "hello");
        assert_eq!(input.cursor, 3);
    }

    #[test]
    fn delete_word_and_paste() {
        let mut input = Input::new(default_keybindings_handle());
        send(&mut input, "\x1b[200~hello\nworld\x1b[201~");
        assert_eq!(input.value(), "hello world");
        send(&mut input, "\x17");
        assert_eq!(input.value(), "hello ");
    }

    #[test]
    fn secure_input_masks_value() {
        let mut input = Input::new(default_keybindings_handle());
        input.set_secure(true);
        input.set_value("hunter2");
        let line = strip_ansi(&input.render(20)[0]);
        assert_eq!(line.trim_end(), "*******");
    }

    #[test]
    fn numeric_input_drops_letters() {
        let mut input = Input::new(default_keybindings_handle());
        input.set_numeric(true);
        send(&mut input, "4a2.5x");
        assert_eq!(input.value(), "42.5");
    }

    #[test]
    fn long_values_scroll_to_keep_cursor_visible() {
        let mut input = Input::new(default_keybindings_handle());
        input.set_focused(true);
        input.set_prompt("> ");
        input.set_value("abcdefghijklmnopqrstuvwxyz");
        let line = input.render(10).remove(0);
        assert_eq!(visible_width(&line), 10);
        assert!(strip_ansi(&line).contains('z'));
    }

    #[test]
    fn placeholder_shows_when_empty() {
        let mut input = Input::new(default_keybindings_handle());
        input.set_placeholder("Search...");
        assert!(strip_ansi(&input.render(20)[0]).starts_with("Search..."));
    }
}
