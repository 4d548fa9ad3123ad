//! Page bodies: filtered lists, detail text and the action bar.

mod action_bar;
mod detail;
mod list;

pub use action_bar::{ActionBar, ActionBarEvent};
pub use detail::DetailView;
pub use list::{ListEntry, ListView};

use sunbeam_protocol::Action;
use sunbeam_tui::core::style;
use sunbeam_tui::{pad_to_width, truncate_to_width, visible_width};

/// Rows taken by the header, footer and their separators.
pub const CHROME_ROWS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    None,
    Action(Action),
    QueryChanged(String),
    Cancel,
}

/// Stacks header, body and footer into exactly `height` lines.
pub fn chrome(
    header: String,
    mut body: Vec<String>,
    footer: String,
    width: usize,
    height: usize,
) -> Vec<String> {
    let body_height = height.saturating_sub(CHROME_ROWS);
    body.truncate(body_height);
    body.resize(body_height, String::new());

    let separator = style::dim(&"─".repeat(width));
    let mut lines = Vec::with_capacity(height);
    lines.push(header);
    lines.push(separator.clone());
    lines.extend(body);
    lines.push(separator);
    lines.push(footer);
    lines.truncate(height);
    lines
        .into_iter()
        .map(|line| pad_to_width(&truncate_to_width(&line, width, "…"), width))
        .collect()
}

pub fn title_header(title: &str, loading: bool) -> String {
    let mut header = format!(" {}", style::bold(title));
    if loading {
        header.push_str(&style::dim(" …"));
    }
    header
}

/// `left` dimmed on the left, shortcut hints for `actions` on the right.
pub fn footer(left: &str, actions: &[Action], width: usize) -> String {
    let mut hints = Vec::new();
    if let Some(primary) = actions.first() {
        hints.push(format!("{} ↵", primary.display_title()));
    }
    if actions.len() > 1 {
        hints.push("Actions ⇥".to_string());
    }
    let right = hints.join(" · ");
    let left = format!(" {left}");
    let gap = width.saturating_sub(visible_width(&left) + visible_width(&right) + 1);
    style::dim(&format!("{left}{}{right} ", " ".repeat(gap)))
}
