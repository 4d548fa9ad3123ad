//! ANSI-aware text helpers shared by widgets and pages.
//!
//! Everything here is string in, string out. Escape sequences count as zero
//! columns; graphemes are measured with `unicode-width`, with RGI emoji forced
//! to two columns.

pub mod ansi;
pub mod layout;
pub mod width;

pub use ansi::strip_ansi;
pub use layout::{pad_to_width, truncate_to_width, wrap_text};
pub use width::visible_width;
