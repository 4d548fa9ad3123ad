//! Multi-line text area.

use unicode_segmentation::UnicodeSegmentation;

use crate::core::component::{Component, Focusable};
use crate::core::input_event::InputEvent;
use crate::core::keybindings::{lock_keybindings, KeyAction, KeybindingsHandle};
use crate::core::style;
use crate::core::text::{pad_to_width, truncate_to_width};

const DEFAULT_HEIGHT: usize = 5;

/// Multi-line editor where enter inserts a newline.
///
/// Lines are not soft-wrapped; long lines are truncated on screen. The view
/// scrolls vertically to keep the cursor row visible.
pub struct TextArea {
    lines: Vec<String>,
    row: usize,
    col: usize,
    scroll: usize,
    height: usize,
    focused: bool,
    placeholder: String,
    keybindings: KeybindingsHandle,
}

impl TextArea {
    pub fn new(keybindings: KeybindingsHandle) -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
            scroll: 0,
            height: DEFAULT_HEIGHT,
            focused: false,
            placeholder: String::new(),
            keybindings,
        }
    }

    pub fn value(&self) -> String {
        self.lines.join("\n")
    }

    pub fn set_value(&mut self, value: &str) {
        self.lines = value.split('\n').map(str::to_string).collect();
        self.row = self.lines.len() - 1;
        self.col = self.lines[self.row].len();
        self.scroll_to_cursor();
    }

    pub fn set_placeholder(&mut self, placeholder: impl Into<String>) {
        self.placeholder = placeholder.into();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    fn current(&self) -> &str {
        &self.lines[self.row]
    }

    fn insert(&mut self, text: &str) {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        for (index, part) in normalized.split('\n').enumerate() {
            if index > 0 {
                self.newline();
            }
            let part: String = part.chars().filter(|ch| !ch.is_control() || *ch == '\t').collect();
            let col = self.col;
            self.lines[self.row].insert_str(col, &part);
            self.col += part.len();
        }
    }

    fn newline(&mut self) {
        let tail = self.lines[self.row].split_off(self.col);
        self.row += 1;
        self.lines.insert(self.row, tail);
        self.col = 0;
    }

    fn column_index(&self) -> usize {
        self.current()[..self.col].graphemes(true).count()
    }

    fn set_column_index(&mut self, index: usize) {
        self.col = self
            .current()
            .grapheme_indices(true)
            .nth(index)
            .map_or(self.current().len(), |(idx, _)| idx);
    }

    fn move_vertical(&mut self, down: bool) {
        let index = self.column_index();
        if down && self.row + 1 < self.lines.len() {
            self.row += 1;
        } else if !down && self.row > 0 {
            self.row -= 1;
        } else {
            return;
        }
        self.set_column_index(index);
    }

    fn backspace(&mut self) {
        if self.col > 0 {
            let start = self.current()[..self.col]
                .grapheme_indices(true)
                .next_back()
                .map_or(0, |(idx, _)| idx);
            let col = self.col;
            self.lines[self.row].replace_range(start..col, "");
            self.col = start;
        } else if self.row > 0 {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.lines[self.row].len();
            self.lines[self.row].push_str(&line);
        }
    }

    fn delete_forward(&mut self) {
        if self.col < self.current().len() {
            let end = self.current()[self.col..]
                .graphemes(true)
                .next()
                .map_or(self.col, |g| self.col + g.len());
            let col = self.col;
            self.lines[self.row].replace_range(col..end, "");
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
        }
    }

    fn scroll_to_cursor(&mut self) {
        if self.row < self.scroll {
            self.scroll = self.row;
        } else if self.row >= self.scroll + self.height {
            self.scroll = self.row + 1 - self.height;
        }
    }

    fn apply_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::NewLine => self.newline(),
            KeyAction::DeleteCharBackward => self.backspace(),
            KeyAction::DeleteCharForward => self.delete_forward(),
            KeyAction::DeleteToLineStart => {
                let col = self.col;
                self.lines[self.row].replace_range(..col, "");
                self.col = 0;
            }
            KeyAction::DeleteToLineEnd => {
                let col = self.col;
                self.lines[self.row].truncate(col);
            }
            KeyAction::CursorUp => self.move_vertical(false),
            KeyAction::CursorDown => self.move_vertical(true),
            KeyAction::CursorLeft => {
                if self.col > 0 {
                    let index = self.column_index();
                    self.set_column_index(index - 1);
                } else if self.row > 0 {
                    self.row -= 1;
                    self.col = self.current().len();
                }
            }
            KeyAction::CursorRight => {
                if self.col < self.current().len() {
                    let index = self.column_index();
                    self.set_column_index(index + 1);
                } else if self.row + 1 < self.lines.len() {
                    self.row += 1;
                    self.col = 0;
                }
            }
            KeyAction::CursorLineStart => self.col = 0,
            KeyAction::CursorLineEnd => self.col = self.current().len(),
            _ => {}
        }
    }
}

const EDIT_ACTIONS: [KeyAction; 11] = [
    KeyAction::NewLine,
    KeyAction::DeleteCharBackward,
    KeyAction::DeleteCharForward,
    KeyAction::DeleteToLineStart,
    KeyAction::DeleteToLineEnd,
    KeyAction::CursorUp,
    KeyAction::CursorDown,
    KeyAction::CursorLeft,
    KeyAction::CursorRight,
    KeyAction::CursorLineStart,
    KeyAction::CursorLineEnd,
];

impl Component for TextArea {
    fn render(&mut self, width: usize) -> Vec<String> {
        if self.is_empty() && !self.placeholder.is_empty() {
            let mut out = vec![pad_to_width(
                &style::dim(&truncate_to_width(&self.placeholder, width, "…")),
                width,
            )];
            out.resize(self.height, " ".repeat(width));
            return out;
        }

        let mut out = Vec::with_capacity(self.height);
        for (row, line) in self
            .lines
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(self.height)
        {
            let rendered = if self.focused && row == self.row {
                let (before, after) = line.split_at(self.col);
                let mut graphemes = after.graphemes(true);
                let at = graphemes.next().unwrap_or(" ");
                format!("{before}{}{}", style::reverse(at), graphemes.as_str())
            } else {
                line.clone()
            };
            out.push(pad_to_width(&truncate_to_width(&rendered, width, "…"), width));
        }
        out.resize(self.height, " ".repeat(width));
        out
    }

    fn handle_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Text { text, .. } | InputEvent::Paste { text, .. } => self.insert(text),
            InputEvent::Key { key_id, .. } => {
                if key_id == "space" {
                    self.insert(" ");
                } else if key_id == "tab" {
                    return;
                } else {
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
            }
            _ => return,
        }
        self.scroll_to_cursor();
    }

    fn set_viewport_size(&mut self, _cols: usize, rows: usize) {
        self.height = rows.max(1);
        self.scroll_to_cursor();
    }

    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }
}

impl Focusable for TextArea {
    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn is_focused(&self) -> bool {
        self.focused
    }
}

#[cfg(test)]
mod tests {
    use super::TextArea;
    use crate::core::component::Component;
    use crate::core::input_event::{parse_input_events, InputEvent};
    use crate::core::keybindings::default_keybindings_handle;

    fn send(area: &mut TextArea, data: &str) {
        for event in parse_input_events(data) {
            area.handle_event(&event);
        }
    }

    #[test]
    fn enter_inserts_newlines() {
        let mut area = TextArea::new(default_keybindings_handle());
        send(&mut area, "one");
        area.handle_event(&InputEvent::key("enter"));
        send(&mut area, "two");
        assert_eq!(area.value(), "one\ntwo");
    }

    #[test]
    fn backspace_joins_lines() {
        let mut area = TextArea::new(default_keybindings_handle());
        area.set_value("ab\ncd");
        area.handle_event(&InputEvent::key("home"));
        area.handle_event(&InputEvent::key("backspace"));
        assert_eq!(area.value(), "abcd");
    }

    #[test]
    fn vertical_moves_keep_column() {
        let mut area = TextArea::new(default_keybindings_handle());
        area.set_value("abcdef\nxy");
        area.handle_event(&InputEvent::key("up"));
        send(&mut area, "!");
        assert_eq!(area.value(), "ab!cdef\nxy");
    }

    #[test]
    fn renders_fixed_height() {
        let mut area = TextArea::new(default_keybindings_handle());
        area.set_viewport_size(20, 3);
        area.set_value("1\n2\n3\n4");
        let lines = area.render(10);
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with('4'));
    }
}
