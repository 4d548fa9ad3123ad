//! Widgets used by launcher pages.

pub mod checkbox;
pub mod dropdown;
pub mod filter;
pub mod input;
pub mod markdown;
pub mod textarea;

pub use checkbox::Checkbox;
pub use dropdown::{Dropdown, DropdownOption};
pub use filter::{Comparator, Filter, FilterItem};
pub use input::Input;
pub use markdown::{highlight_code, Markdown};
pub use textarea::TextArea;
