//! Searchable select: a text input over a small fuzzy-filtered list.

use crate::core::component::{Component, Focusable};
use crate::core::input_event::InputEvent;
use crate::core::keybindings::KeybindingsHandle;
use crate::core::style;
use crate::core::text::truncate_to_width;
use crate::widgets::filter::{Filter, FilterItem};
use crate::widgets::input::Input;

const LIST_HEIGHT: usize = 3;

/// One choice offered by a [`Dropdown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownOption {
    pub title: String,
    /// Position in the option list passed to [`Dropdown::new`].
    pub index: usize,
    id: String,
}

impl FilterItem for DropdownOption {
    fn id(&self) -> &str {
        &self.id
    }

    fn filter_value(&self) -> String {
        self.title.clone()
    }

    fn render(&self, width: usize, selected: bool) -> String {
        let title = truncate_to_width(&self.title, width.saturating_sub(2), "…");
        if selected {
            format!("{} {}", style::cyan(">"), style::bold(&title))
        } else {
            format!("  {title}")
        }
    }
}

pub struct Dropdown {
    input: Input,
    filter: Filter<DropdownOption>,
    selected: Option<usize>,
    focused: bool,
}

impl Dropdown {
    pub fn new(titles: Vec<String>, keybindings: KeybindingsHandle) -> Self {
        let options = titles
            .into_iter()
            .enumerate()
            .map(|(index, title)| DropdownOption {
                id: index.to_string(),
                title,
                index,
            })
            .collect();
        let mut filter = Filter::new(keybindings.clone());
        filter.set_size(0, LIST_HEIGHT);
        filter.set_items(options);

        let mut input = Input::new(keybindings);
        input.set_placeholder("Select an option");
        Self {
            input,
            filter,
            selected: None,
            focused: false,
        }
    }

    /// Index of the chosen option, if the input text still names it.
    pub fn value(&self) -> Option<usize> {
        let selected = self.selected?;
        let option = self.filter.items().get(selected)?;
        (option.title == self.input.value()).then_some(option.index)
    }

    /// Chooses the option at `index` and shows its title in the input.
    pub fn select(&mut self, index: usize) {
        let Some(title) = self.filter.items().get(index).map(|option| option.title.clone()) else {
            return;
        };
        self.selected = Some(index);
        self.input.set_value(title);
        self.filter.filter_items("");
        self.filter.select(&index.to_string());
    }

    /// Whether the list is hidden because the input names the chosen option.
    pub fn has_match(&self) -> bool {
        self.value().is_some()
    }

    /// Handles an event. Returns `true` when the event was consumed.
    pub fn update(&mut self, event: &InputEvent) -> bool {
        if let Some(key_id) = event.key_id() {
            if key_id == "enter" {
                if self.has_match() {
                    return false;
                }
                if let Some(option) = self.filter.selection() {
                    let index = option.index;
                    self.select(index);
                }
                return true;
            }
            if !self.has_match() && self.filter.handle_key(key_id) {
                return true;
            }
        }

        let before = self.input.value().to_string();
        self.input.handle_event(event);
        if self.input.value() != before {
            let query = self.input.value().to_string();
            self.filter.filter_items(&query);
            return true;
        }
        false
    }
}

impl Component for Dropdown {
    fn render(&mut self, width: usize) -> Vec<String> {
        let mut lines = self.input.render(width);
        if self.focused && !self.has_match() {
            lines.extend(self.filter.render(width));
        }
        lines
    }

    fn handle_event(&mut self, event: &InputEvent) {
        self.update(event);
    }

    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }
}

impl Focusable for Dropdown {
    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        self.input.set_focused(focused);
    }

    fn is_focused(&self) -> bool {
        self.focused
    }
}
