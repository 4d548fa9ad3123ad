//! Terminal-independent building blocks.

pub mod component;
pub mod fuzzy;
pub mod input_event;
pub mod keybindings;
pub mod keys;
pub mod style;
pub mod terminal;
pub mod text;
