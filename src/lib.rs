//! Terminal core for the sunbeam launcher.
//!
//! # Public API Overview
//! - [`Runtime`] owns the terminal and the event channel; workers report back
//!   through a [`RuntimeHandle`].
//! - Raw input is split into [`InputEvent`]s with [`parse_input_events`] and
//!   resolved against [`KeybindingsManager`].
//! - Widgets implement [`Component`] and render to plain `Vec<String>` lines.
//! - [`Filter`] is the fuzzy-filtered list shared by list pages, the action
//!   bar and searchable selects.

pub mod config;
pub mod logging;

pub mod core;
pub mod platform;
pub mod runtime;
pub mod widgets;

/// Built-in widgets.
pub use crate::widgets::{
    highlight_code, Checkbox, Comparator, Dropdown, DropdownOption, Filter, FilterItem, Input,
    Markdown, TextArea,
};

/// Fuzzy scoring.
pub use crate::core::fuzzy::{fuzzy_match, FuzzyMatch};

/// Keybinding configuration and default mappings.
pub use crate::core::keybindings::{
    default_keybindings_handle, lock_keybindings, KeyAction, KeyId, KeybindingsConfig,
    KeybindingsHandle, KeybindingsManager, DEFAULT_KEYBINDINGS,
};

/// Keyboard input parsing.
pub use crate::core::input_event::{parse_input_events, InputEvent};
pub use crate::core::keys::{matches_key, parse_key, Key};

/// Terminal interfaces and process-backed implementation.
pub use crate::core::terminal::Terminal;
pub use crate::platform::process_terminal::ProcessTerminal;

/// Component traits.
pub use crate::core::component::{Component, Focusable};

/// Event loop.
pub use crate::runtime::{Runtime, RuntimeEvent, RuntimeHandle};

/// ANSI-aware text helpers.
pub use crate::core::text::{pad_to_width, strip_ansi, truncate_to_width, visible_width, wrap_text};
