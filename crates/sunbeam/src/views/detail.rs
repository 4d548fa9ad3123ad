use sunbeam_protocol::{Action, Detail};
use sunbeam_tui::{
    highlight_code, lock_keybindings, wrap_text, Component, InputEvent, KeyAction,
    KeybindingsHandle, Markdown,
};

use super::{chrome, footer, title_header, ActionBar, ActionBarEvent, ViewEvent, CHROME_ROWS};
use crate::actions::shortcut;

enum Content {
    Markdown(Markdown),
    Code { text: String, language: String },
    Text(String),
}

impl Content {
    fn lines(&mut self, width: usize) -> Vec<String> {
        match self {
            Self::Markdown(markdown) => markdown.render(width),
            Self::Code { text, language } => highlight_code(text, Some(language)),
            Self::Text(text) => wrap_text(text, width),
        }
    }
}

/// Scrollable text, markdown or highlighted source.
pub struct DetailView {
    title: String,
    content: Content,
    actions: Vec<Action>,
    action_bar: Option<ActionBar>,
    keybindings: KeybindingsHandle,
    scroll: usize,
    loading: bool,
    width: usize,
    height: usize,
}

impl DetailView {
    pub fn new(title: impl Into<String>, detail: Detail, keybindings: KeybindingsHandle) -> Self {
        let title = detail.title.clone().unwrap_or_else(|| title.into());
        let content = match (detail.markdown, detail.text, detail.language) {
            (Some(markdown), _, _) => Content::Markdown(Markdown::new(markdown)),
            (None, Some(text), Some(language)) => Content::Code { text, language },
            (None, text, _) => Content::Text(text.unwrap_or_default()),
        };
        Self {
            title,
            content,
            actions: detail.actions,
            action_bar: None,
            keybindings,
            scroll: 0,
            loading: false,
            width: 0,
            height: 0,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Content lines at the current width, before scrolling.
    pub fn content_lines(&mut self) -> Vec<String> {
        let width = self.width.saturating_sub(2).max(1);
        self.content.lines(width)
    }

    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
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

        let Some(key_id) = event.key_id() else {
            return ViewEvent::None;
        };
        let page = self.height.saturating_sub(CHROME_ROWS).max(1);
        let action = {
            let keybindings = lock_keybindings(&self.keybindings);
            [
                KeyAction::Cancel,
                KeyAction::ShowActions,
                KeyAction::SelectUp,
                KeyAction::SelectDown,
                KeyAction::SelectPageUp,
                KeyAction::SelectPageDown,
            ]
            .into_iter()
            .find(|action| keybindings.matches(key_id, *action))
        };
        match action {
            Some(KeyAction::Cancel) => return ViewEvent::Cancel,
            Some(KeyAction::ShowActions) => {
                if !self.actions.is_empty() {
                    self.action_bar = Some(ActionBar::new(
                        self.actions.clone(),
                        self.keybindings.clone(),
                    ));
                }
                return ViewEvent::None;
            }
            _ => {}
        }
        if let Some(action) = shortcut(&self.actions, key_id, &self.keybindings) {
            return ViewEvent::Action(action.clone());
        }
        match action {
            Some(KeyAction::SelectUp) => self.scroll = self.scroll.saturating_sub(1),
            Some(KeyAction::SelectDown) => self.scroll += 1,
            Some(KeyAction::SelectPageUp) => self.scroll = self.scroll.saturating_sub(page),
            Some(KeyAction::SelectPageDown) => self.scroll += page,
            _ => {}
        }
        self.clamp_scroll();
        ViewEvent::None
    }

    pub fn render(&mut self) -> Vec<String> {
        let width = self.width;
        let body_height = self.height.saturating_sub(CHROME_ROWS);
        self.clamp_scroll();
        let body = match self.action_bar.as_mut() {
            Some(bar) => bar.render(width, body_height),
            None => self
                .content_lines()
                .into_iter()
                .skip(self.scroll)
                .take(body_height)
                .map(|line| format!(" {line}"))
                .collect(),
        };
        let footer = footer(&self.title, &self.actions, width);
        chrome(
            title_header(&self.title, self.loading),
            body,
            footer,
            width,
            self.height,
        )
    }

    fn clamp_scroll(&mut self) {
        let body_height = self.height.saturating_sub(CHROME_ROWS);
        let total = self.content_lines().len();
        self.scroll = self.scroll.min(total.saturating_sub(body_height));
    }
}

#[cfg(test)]
mod tests {
    use sunbeam_protocol::{Action, Detail};
    use sunbeam_tui::{default_keybindings_handle, strip_ansi, InputEvent};

    use super::DetailView;
    use crate::views::ViewEvent;

    fn view(text: &str, height: usize) -> DetailView {
        let detail = Detail {
            text: Some(text.to_string()),
            actions: vec![Action::copy(text).with_title("Copy")],
            ..Detail::default()
        };
        let mut view = DetailView::new("Output", detail, default_keybindings_handle());
        view.set_size(30, height);
        view
    }

    #[test]
    fn renders_text_inside_chrome() {
        let mut view = view("pong", 6);
        let lines: Vec<String> = view.render().iter().map(|line| strip_ansi(line)).collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].contains("Output"));
        assert_eq!(lines[2].trim(), "pong");
    }

    #[test]
    fn scrolling_is_clamped_to_content() {
        let text = (1..=10).map(|n| n.to_string()).collect::<Vec<_>>().join("\n");
        let mut view = view(&text, 7);
        for _ in 0..20 {
            view.handle_event(&InputEvent::key("down"));
        }
        let lines: Vec<String> = view.render().iter().map(|line| strip_ansi(line)).collect();
        assert_eq!(lines[2].trim(), "8");
        assert_eq!(lines[4].trim(), "10");
    }

    #[test]
    fn enter_runs_primary_action_and_escape_cancels() {
        let mut view = view("pong", 6);
        match view.handle_event(&InputEvent::key("enter")) {
            ViewEvent::Action(action) => assert_eq!(action.text.as_deref(), Some("pong")),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(view.handle_event(&InputEvent::key("escape")), ViewEvent::Cancel);
    }

    #[test]
    fn markdown_wins_over_text() {
        let detail = Detail {
            markdown: Some("# Title".to_string()),
            text: Some("ignored".to_string()),
            ..Detail::default()
        };
        let mut view = DetailView::new("Doc", detail, default_keybindings_handle());
        view.set_size(30, 6);
        assert_eq!(view.content_lines().len(), 1);
        assert_eq!(strip_ansi(&view.content_lines()[0]), "Title");
    }
}
