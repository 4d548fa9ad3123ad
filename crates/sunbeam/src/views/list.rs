use sunbeam_protocol::{Action, List, ListItem};
use sunbeam_tui::core::style;
use sunbeam_tui::{
    lock_keybindings, pad_to_width, truncate_to_width, visible_width, Comparator, Component,
    Filter, FilterItem, Focusable, Input, InputEvent, KeyAction, KeybindingsHandle,
};

use super::{chrome, footer, ActionBar, ActionBarEvent, ViewEvent, CHROME_ROWS};
use crate::actions::shortcut;

pub struct ListEntry {
    id: String,
    pub item: ListItem,
}

impl ListEntry {
    pub fn new(item: ListItem) -> Self {
        Self {
            id: item.id().to_string(),
            item,
        }
    }
}

impl FilterItem for ListEntry {
    fn id(&self) -> &str {
        &self.id
    }

    fn filter_value(&self) -> String {
        self.item.filter_value()
    }

    fn render(&self, width: usize, selected: bool) -> String {
        let accessories = style::dim(&self.item.accessories.join("  "));
        let accessories_width = visible_width(&accessories);
        let main_width = width.saturating_sub(accessories_width + 1);

        let title = if selected {
            style::cyan(&style::bold(&self.item.title))
        } else {
            self.item.title.clone()
        };
        let mut main = title;
        if let Some(subtitle) = self.item.subtitle.as_deref().filter(|text| !text.is_empty()) {
            main.push(' ');
            main.push_str(&style::dim(subtitle));
        }
        let marker = if selected { style::cyan("›") } else { " ".to_string() };
        let main = truncate_to_width(&format!("{marker} {main}"), main_width, "…");
        format!("{}{accessories}", pad_to_width(&main, width.saturating_sub(accessories_width)))
    }
}

/// Search input over a filtered list, with an action bar on demand.
pub struct ListView {
    title: String,
    list: List,
    input: Input,
    filter: Filter<ListEntry>,
    action_bar: Option<ActionBar>,
    keybindings: KeybindingsHandle,
    loading: bool,
    width: usize,
    height: usize,
}

impl ListView {
    pub fn new(title: impl Into<String>, list: List, keybindings: KeybindingsHandle) -> Self {
        let mut input = Input::new(keybindings.clone());
        input.set_placeholder("Search...");
        input.set_focused(true);
        let mut view = Self {
            title: title.into(),
            list: List::default(),
            input,
            filter: Filter::new(keybindings.clone()),
            action_bar: None,
            keybindings,
            loading: false,
            width: 0,
            height: 0,
        };
        view.set_list(list);
        view
    }

    /// Orders items when the query is empty or ties on score.
    pub fn set_less(&mut self, less: Comparator<ListEntry>) {
        self.filter.set_less(less);
        self.refilter();
    }

    /// Swaps in a new list, keeping the query and the selected item.
    pub fn set_list(&mut self, list: List) {
        let selected = self.selected_id().map(str::to_string);
        if let Some(title) = list.title.clone() {
            self.title = title;
        }
        if let Some(text) = list.empty_view.as_ref().and_then(|empty| empty.text.clone()) {
            self.filter.set_empty_text(text);
        }
        let entries = list.items.iter().cloned().map(ListEntry::new).collect();
        self.list = list;
        self.filter.set_items(entries);
        self.refilter();
        if let Some(id) = selected {
            self.filter.select(&id);
        }
        self.action_bar = None;
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn query(&self) -> &str {
        self.input.value()
    }

    pub fn is_dynamic(&self) -> bool {
        self.list.dynamic
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.filter.selection().map(|entry| entry.id())
    }

    pub fn visible_titles(&self) -> Vec<&str> {
        self.filter.filtered().map(|entry| entry.item.title.as_str()).collect()
    }

    /// Actions of the selected item followed by the list-wide ones. With no
    /// items, the empty view's actions take the item's place.
    pub fn actions(&self) -> Vec<Action> {
        let mut actions = match self.filter.selection() {
            Some(entry) => entry.item.actions.clone(),
            None if self.filter.filtered_len() == 0 => self
                .list
                .empty_view
                .as_ref()
                .map(|empty| empty.actions.clone())
                .unwrap_or_default(),
            None => Vec::new(),
        };
        actions.extend(self.list.actions.iter().cloned());
        actions
    }

    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.filter
            .set_size(width, height.saturating_sub(CHROME_ROWS).max(1));
    }

    pub fn handle_event(&mut self, event: &InputEvent) -> ViewEvent {
        if let Some(bar) = self.action_bar.as_mut() {
            return match bar.handle_event(event) {
                ActionBarEvent::Selected(action) => {
                    self.action_bar = None;
                    ViewEvent::Action(action)
                }
                ActionBarEvent::Close => {
                    self.action_bar = None;
                    ViewEvent::None
                }
                ActionBarEvent::None => ViewEvent::None,
            };
        }

        if let Some(key_id) = event.key_id() {
            let (cancel, show_actions) = {
                let keybindings = lock_keybindings(&self.keybindings);
                (
                    keybindings.matches(key_id, KeyAction::Cancel),
                    keybindings.matches(key_id, KeyAction::ShowActions),
                )
            };
            if cancel {
                if self.query().is_empty() {
                    return ViewEvent::Cancel;
                }
                self.input.set_value("");
                return self.query_changed();
            }
            let actions = self.actions();
            if show_actions {
                if !actions.is_empty() {
                    self.action_bar = Some(ActionBar::new(actions, self.keybindings.clone()));
                }
                return ViewEvent::None;
            }
            if let Some(action) = shortcut(&actions, key_id, &self.keybindings) {
                return ViewEvent::Action(action.clone());
            }
            if self.filter.handle_key(key_id) {
                return ViewEvent::None;
            }
        }

        let before = self.query().to_string();
        self.input.handle_event(event);
        if self.query() != before {
            return self.query_changed();
        }
        ViewEvent::None
    }

    pub fn render(&mut self) -> Vec<String> {
        let width = self.width;
        let input_line = self
            .input
            .render(width.saturating_sub(3))
            .into_iter()
            .next()
            .unwrap_or_default();
        let spinner = if self.loading { style::dim("…") } else { String::new() };
        let header = format!(" {input_line}{spinner}");

        let body_height = self.height.saturating_sub(CHROME_ROWS);
        let actions = self.actions();
        let body = match self.action_bar.as_mut() {
            Some(bar) => bar.render(width, body_height),
            None => self.filter.render(width),
        };
        let count = format!("{} · {} items", self.title, self.filter.filtered_len());
        let footer = footer(&count, &actions, width);
        chrome(header, body, footer, width, self.height)
    }

    fn query_changed(&mut self) -> ViewEvent {
        if self.list.dynamic {
            return ViewEvent::QueryChanged(self.query().to_string());
        }
        self.refilter();
        ViewEvent::None
    }

    fn refilter(&mut self) {
        let query = if self.list.dynamic {
            String::new()
        } else {
            self.query().to_string()
        };
        self.filter.filter_items(&query);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sunbeam_protocol::{Action, EmptyView, List, ListItem};
    use sunbeam_tui::{default_keybindings_handle, strip_ansi, InputEvent};

    use super::ListView;
    use crate::views::ViewEvent;

    fn item(title: &str, copy: &str) -> ListItem {
        ListItem {
            actions: vec![
                Action::copy(copy).with_title("Copy"),
                Action::run("show").with_title("Show"),
            ],
            ..ListItem::new(title)
        }
    }

    fn view(items: Vec<ListItem>) -> ListView {
        let list = List {
            items,
            ..List::default()
        };
        let mut view = ListView::new("Repos", list, default_keybindings_handle());
        view.set_size(40, 10);
        view
    }

    fn type_text(view: &mut ListView, text: &str) -> ViewEvent {
        let mut last = ViewEvent::None;
        for ch in text.chars() {
            last = view.handle_event(&InputEvent::text(ch.to_string()));
        }
        last
    }

    #[test]
    fn typing_filters_items() {
        let mut view = view(vec![item("alpha", "a"), item("beta", "b")]);
        type_text(&mut view, "bet");
        assert_eq!(view.visible_titles(), vec!["beta"]);
    }

    #[test]
    fn enter_and_alt_enter_pick_first_and_second_action() {
        let mut view = view(vec![item("alpha", "a")]);
        match view.handle_event(&InputEvent::key("enter")) {
            ViewEvent::Action(action) => assert_eq!(action.text.as_deref(), Some("a")),
            other => panic!("unexpected {other:?}"),
        }
        match view.handle_event(&InputEvent::key("alt+enter")) {
            ViewEvent::Action(action) => assert_eq!(action.command.as_deref(), Some("show")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn escape_clears_query_before_cancelling() {
        let mut view = view(vec![item("alpha", "a")]);
        type_text(&mut view, "x");
        assert_eq!(view.handle_event(&InputEvent::key("escape")), ViewEvent::None);
        assert_eq!(view.query(), "");
        assert_eq!(view.handle_event(&InputEvent::key("escape")), ViewEvent::Cancel);
    }

    #[test]
    fn dynamic_lists_report_query_changes_without_filtering() {
        let list = List {
            items: vec![item("alpha", "a"), item("beta", "b")],
            dynamic: true,
            ..List::default()
        };
        let mut view = ListView::new("Search", list, default_keybindings_handle());
        view.set_size(40, 10);
        assert_eq!(type_text(&mut view, "z"), ViewEvent::QueryChanged("z".to_string()));
        assert_eq!(view.visible_titles(), vec!["alpha", "beta"]);
    }

    #[test]
    fn set_list_keeps_query_and_selection() {
        let mut view = view(vec![item("alpha", "a"), item("alps", "b"), item("beta", "c")]);
        type_text(&mut view, "al");
        view.handle_event(&InputEvent::key("down"));
        let chosen = view.selected_id().map(str::to_string);
        assert!(chosen.is_some());
        assert_ne!(chosen, view.visible_titles().first().map(|title| title.to_string()));

        view.set_list(List {
            items: vec![item("alpha", "a"), item("alps", "b"), item("beta", "c")],
            ..List::default()
        });
        assert_eq!(view.query(), "al");
        assert_eq!(view.selected_id().map(str::to_string), chosen);
    }

    #[test]
    fn empty_view_actions_apply_without_items() {
        let list = List {
            empty_view: Some(EmptyView {
                text: Some("Nothing here".to_string()),
                actions: vec![Action::run("create").with_title("Create")],
            }),
            ..List::default()
        };
        let mut view = ListView::new("Notes", list, default_keybindings_handle());
        view.set_size(40, 10);
        let text = strip_ansi(&view.render().join("\n"));
        assert!(text.contains("Nothing here"));
        match view.handle_event(&InputEvent::key("enter")) {
            ViewEvent::Action(action) => assert_eq!(action.command.as_deref(), Some("create")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn render_fills_height() {
        let mut view = view(vec![item("alpha", "a")]);
        let lines = view.render();
        assert_eq!(lines.len(), 10);
        assert!(strip_ansi(&lines[2]).contains("alpha"));
    }

    #[test]
    fn tab_opens_the_action_bar() {
        let mut view = view(vec![item("alpha", "a")]);
        view.handle_event(&InputEvent::key("tab"));
        view.handle_event(&InputEvent::key("down"));
        match view.handle_event(&InputEvent::key("enter")) {
            ViewEvent::Action(action) => assert_eq!(action.display_title(), "Show"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
