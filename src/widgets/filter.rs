//! Fuzzy-filtered, scrollable item list.

use std::cmp::Ordering;

use crate::core::component::Component;
use crate::core::fuzzy;
use crate::core::input_event::InputEvent;
use crate::core::keybindings::{lock_keybindings, KeyAction, KeybindingsHandle};
use crate::core::style;
use crate::core::text::{pad_to_width, truncate_to_width, visible_width};

/// Item that can be listed by a [`Filter`].
pub trait FilterItem {
    /// Stable identifier used to restore the selection after a reload.
    fn id(&self) -> &str;
    /// Text the query is matched against.
    fn filter_value(&self) -> String;
    /// One line, at most `width` columns.
    fn render(&self, width: usize, selected: bool) -> String;
}

pub type Comparator<T> = Box<dyn Fn(&T, &T) -> Ordering>;

/// Ordered subset of items matching a query plus a cursor window.
///
/// Invariant: `min_index <= cursor < min_index + visible_count()` whenever the
/// filtered set is non-empty.
pub struct Filter<T: FilterItem> {
    items: Vec<T>,
    filtered: Vec<usize>,
    query: String,
    cursor: usize,
    min_index: usize,
    width: usize,
    height: usize,
    separators: bool,
    less: Option<Comparator<T>>,
    empty_text: String,
    keybindings: KeybindingsHandle,
}

impl<T: FilterItem> Filter<T> {
    pub fn new(keybindings: KeybindingsHandle) -> Self {
        Self {
            items: Vec::new(),
            filtered: Vec::new(),
            query: String::new(),
            cursor: 0,
            min_index: 0,
            width: 0,
            height: 1,
            separators: false,
            less: None,
            empty_text: String::new(),
            keybindings,
        }
    }

    pub fn set_separators(&mut self, separators: bool) {
        self.separators = separators;
        self.clamp_window();
    }

    pub fn set_empty_text(&mut self, text: impl Into<String>) {
        self.empty_text = text.into();
    }

    /// Secondary ordering applied (stably) after scoring.
    pub fn set_less(&mut self, less: Comparator<T>) {
        self.less = Some(less);
    }

    /// Replaces the items and re-applies the current query.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        let query = std::mem::take(&mut self.query);
        self.filter_items(&query);
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Filtered items in display order.
    pub fn filtered(&self) -> impl Iterator<Item = &T> + '_ {
        self.filtered.iter().map(|index| &self.items[*index])
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// Recomputes the filtered set for `query` and resets the cursor.
    pub fn filter_items(&mut self, query: &str) {
        self.query = query.to_string();

        let mut filtered: Vec<usize> = if query.is_empty() {
            (0..self.items.len()).collect()
        } else {
            let mut scored: Vec<(usize, i32)> = self
                .items
                .iter()
                .enumerate()
                .map(|(index, item)| (index, fuzzy::score(query, &item.filter_value())))
                .filter(|(_, score)| *score > 0)
                .collect();
            scored.sort_by(|a, b| b.1.cmp(&a.1));
            scored.into_iter().map(|(index, _)| index).collect()
        };

        if let Some(less) = self.less.as_ref() {
            filtered.sort_by(|a, b| less(&self.items[*a], &self.items[*b]));
        }

        self.filtered = filtered;
        self.cursor = 0;
        self.min_index = 0;
    }

    pub fn selection(&self) -> Option<&T> {
        self.filtered
            .get(self.cursor)
            .map(|index| &self.items[*index])
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn min_index(&self) -> usize {
        self.min_index
    }

    fn item_height(&self) -> usize {
        if self.separators {
            2
        } else {
            1
        }
    }

    pub fn visible_count(&self) -> usize {
        (self.height / self.item_height()).max(1)
    }

    pub fn cursor_down(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        if self.cursor + 1 < self.filtered.len() {
            self.cursor += 1;
            if self.cursor >= self.min_index + self.visible_count() {
                self.min_index = self.cursor + 1 - self.visible_count();
            }
        } else {
            self.cursor = 0;
            self.min_index = 0;
        }
    }

    pub fn cursor_up(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        if self.cursor > 0 {
            self.cursor -= 1;
            if self.cursor < self.min_index {
                self.min_index = self.cursor;
            }
        } else {
            self.cursor = self.filtered.len() - 1;
            self.min_index = self.filtered.len().saturating_sub(self.visible_count());
        }
    }

    /// Moves up by one viewport without wrapping.
    pub fn page_up(&mut self) {
        let shift = self.visible_count().min(self.cursor);
        for _ in 0..shift {
            self.cursor_up();
        }
    }

    /// Moves down by one viewport without wrapping.
    pub fn page_down(&mut self) {
        let remaining = self.filtered.len().saturating_sub(self.cursor + 1);
        let shift = self.visible_count().min(remaining);
        for _ in 0..shift {
            self.cursor_down();
        }
    }

    /// Moves the cursor to the item with `id`. Returns whether it was found.
    pub fn select(&mut self, id: &str) -> bool {
        let Some(position) = self
            .filtered
            .iter()
            .position(|index| self.items[*index].id() == id)
        else {
            return false;
        };
        self.cursor = position;
        self.clamp_window();
        true
    }

    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.clamp_window();
    }

    fn clamp_window(&mut self) {
        let visible = self.visible_count();
        if self.cursor < self.min_index {
            self.min_index = self.cursor;
        } else if self.cursor >= self.min_index + visible {
            self.min_index = self.cursor + 1 - visible;
        }
        let max_start = self.filtered.len().saturating_sub(visible);
        self.min_index = self.min_index.min(max_start).min(self.cursor);
    }

    /// Applies a navigation key. Returns whether the key was consumed.
    pub fn handle_key(&mut self, key_id: &str) -> bool {
        let action = {
            let keybindings = lock_keybindings(&self.keybindings);
            [
                KeyAction::SelectUp,
                KeyAction::SelectDown,
                KeyAction::SelectPageUp,
                KeyAction::SelectPageDown,
            ]
            .into_iter()
            .find(|action| keybindings.matches(key_id, *action))
        };
        match action {
            Some(KeyAction::SelectUp) => self.cursor_up(),
            Some(KeyAction::SelectDown) => self.cursor_down(),
            Some(KeyAction::SelectPageUp) => self.page_up(),
            Some(KeyAction::SelectPageDown) => self.page_down(),
            _ => return false,
        }
        true
    }

    fn render_empty(&self) -> Vec<String> {
        let text = if !self.empty_text.is_empty() {
            self.empty_text.as_str()
        } else if !self.items.is_empty() {
            "No matches"
        } else {
            "No items"
        };
        let text = style::dim(&truncate_to_width(text, self.width, "…"));
        let left = self.width.saturating_sub(visible_width(&text)) / 2;
        let mut lines = vec![" ".repeat(self.width); self.height];
        if let Some(middle) = lines.get_mut(self.height / 2) {
            *middle = pad_to_width(&format!("{}{text}", " ".repeat(left)), self.width);
        }
        lines
    }
}

impl<T: FilterItem> Component for Filter<T> {
    /// Renders exactly `height` lines.
    fn render(&mut self, width: usize) -> Vec<String> {
        if width != self.width {
            self.width = width;
        }
        if self.filtered.is_empty() {
            return self.render_empty();
        }

        let item_width = width.saturating_sub(2);
        let mut lines = Vec::with_capacity(self.height);
        for (offset, index) in self
            .filtered
            .iter()
            .enumerate()
            .skip(self.min_index)
            .take(self.visible_count())
        {
            if self.separators && offset > self.min_index {
                lines.push(format!(" {} ", style::dim(&"─".repeat(item_width))));
            }
            let line = self.items[*index].render(item_width, offset == self.cursor);
            lines.push(format!(" {} ", pad_to_width(&line, item_width)));
        }
        lines.truncate(self.height.max(1));
        lines.resize(self.height, " ".repeat(width));
        lines
    }

    fn handle_event(&mut self, event: &InputEvent) {
        if let Some(key_id) = event.key_id() {
            self.handle_key(key_id);
        }
    }

    fn set_viewport_size(&mut self, cols: usize, rows: usize) {
        self.set_size(cols, rows);
    }
}
