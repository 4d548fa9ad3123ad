use sunbeam_protocol::Action;
use sunbeam_tui::core::style;
use sunbeam_tui::{
    lock_keybindings, pad_to_width, truncate_to_width, visible_width, Component, Filter,
    FilterItem, Focusable, Input, InputEvent, KeyAction, KeybindingsHandle,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ActionBarEvent {
    None,
    Selected(Action),
    Close,
}

struct ActionEntry {
    id: String,
    title: String,
    hint: String,
}

impl FilterItem for ActionEntry {
    fn id(&self) -> &str {
        &self.id
    }

    fn filter_value(&self) -> String {
        self.title.clone()
    }

    fn render(&self, width: usize, selected: bool) -> String {
        let hint = style::dim(&self.hint);
        let title_width = width.saturating_sub(visible_width(&self.hint) + 1);
        let title = truncate_to_width(&self.title, title_width, "…");
        let title = if selected {
            style::cyan(&style::bold(&title))
        } else {
            title
        };
        format!("{}{hint}", pad_to_width(&title, title_width + 1))
    }
}

/// Searchable menu of every action of the selected item.
pub struct ActionBar {
    actions: Vec<Action>,
    input: Input,
    filter: Filter<ActionEntry>,
    keybindings: KeybindingsHandle,
}

impl ActionBar {
    pub fn new(actions: Vec<Action>, keybindings: KeybindingsHandle) -> Self {
        let entries = actions
            .iter()
            .enumerate()
            .map(|(index, action)| ActionEntry {
                id: index.to_string(),
                title: action.display_title(),
                hint: shortcut_hint(index, action),
            })
            .collect();
        let mut filter = Filter::new(keybindings.clone());
        filter.set_items(entries);
        let mut input = Input::new(keybindings.clone());
        input.set_placeholder("Search actions...");
        input.set_focused(true);
        Self {
            actions,
            input,
            filter,
            keybindings,
        }
    }

    pub fn handle_event(&mut self, event: &InputEvent) -> ActionBarEvent {
        if let Some(key_id) = event.key_id() {
            let (cancel, confirm) = {
                let keybindings = lock_keybindings(&self.keybindings);
                (
                    keybindings.matches(key_id, KeyAction::Cancel)
                        || keybindings.matches(key_id, KeyAction::ShowActions),
                    keybindings.matches(key_id, KeyAction::Confirm),
                )
            };
            if cancel {
                return ActionBarEvent::Close;
            }
            if confirm {
                return self
                    .filter
                    .selection()
                    .and_then(|entry| entry.id.parse::<usize>().ok())
                    .and_then(|index| self.actions.get(index))
                    .map_or(ActionBarEvent::None, |action| {
                        ActionBarEvent::Selected(action.clone())
                    });
            }
            if self.filter.handle_key(key_id) {
                return ActionBarEvent::None;
            }
        }

        let before = self.input.value().to_string();
        self.input.handle_event(event);
        if self.input.value() != before {
            let query = self.input.value().to_string();
            self.filter.filter_items(&query);
        }
        ActionBarEvent::None
    }

    pub fn render(&mut self, width: usize, height: usize) -> Vec<String> {
        let mut lines: Vec<String> = self
            .input
            .render(width.saturating_sub(1))
            .into_iter()
            .map(|line| format!(" {line}"))
            .collect();
        self.filter.set_size(width, height.saturating_sub(lines.len()));
        lines.extend(self.filter.render(width));
        lines
    }
}

fn shortcut_hint(index: usize, action: &Action) -> String {
    match (index, action.key.as_deref()) {
        (0, _) => "enter".to_string(),
        (1, _) => "alt+enter".to_string(),
        (_, Some(key)) => format!("alt+{key}"),
        _ => String::new(),
    }
}
