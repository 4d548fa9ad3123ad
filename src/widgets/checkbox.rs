//! Boolean toggle.

use crate::core::component::{Component, Focusable};
use crate::core::input_event::InputEvent;
use crate::core::style;
use crate::core::text::{pad_to_width, truncate_to_width};

pub struct Checkbox {
    checked: bool,
    label: String,
    focused: bool,
}

impl Checkbox {
    pub fn new(label: impl Into<String>, checked: bool) -> Self {
        Self {
            checked,
            label: label.into(),
            focused: false,
        }
    }

    pub fn checked(&self) -> bool {
        self.checked
    }

    pub fn toggle(&mut self) {
        self.checked = !self.checked;
    }
}

impl Component for Checkbox {
    fn render(&mut self, width: usize) -> Vec<String> {
        let mark = if self.checked { "[x]" } else { "[ ]" };
        let mark = if self.focused {
            style::cyan(mark)
        } else {
            mark.to_string()
        };
        let line = if self.label.is_empty() {
            mark
        } else {
            format!("{mark} {}", self.label)
        };
        vec![pad_to_width(&truncate_to_width(&line, width, "…"), width)]
    }

    fn handle_event(&mut self, event: &InputEvent) {
        let toggles = match event {
            InputEvent::Key { key_id, .. } => key_id == "enter" || key_id == "space",
            InputEvent::Text { text, .. } => text == " ",
            _ => false,
        };
        if toggles {
            self.toggle();
        }
    }

    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }
}

impl Focusable for Checkbox {
    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn is_focused(&self) -> bool {
        self.focused
    }
}
