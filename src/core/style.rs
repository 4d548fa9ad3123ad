//! SGR styling helpers.
//!
//! Styling is global: [`set_color_enabled`] is called once at startup from
//! [`crate::config::EnvConfig`] (`NO_COLOR`). When disabled every helper
//! returns its input untouched.

use std::sync::atomic::{AtomicBool, Ordering};

static COLOR_ENABLED: AtomicBool = AtomicBool::new(true);

pub fn set_color_enabled(enabled: bool) {
    COLOR_ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn color_enabled() -> bool {
    COLOR_ENABLED.load(Ordering::Relaxed)
}

fn wrap(open: &str, close: &str, text: &str) -> String {
    if !color_enabled() || text.is_empty() {
        return text.to_string();
    }
    format!("\x1b[{open}m{text}\x1b[{close}m")
}

pub fn bold(text: &str) -> String {
    wrap("1", "22", text)
}

pub fn dim(text: &str) -> String {
    wrap("2", "22", text)
}

pub fn italic(text: &str) -> String {
    wrap("3", "23", text)
}

pub fn underline(text: &str) -> String {
    wrap("4", "24", text)
}

pub fn reverse(text: &str) -> String {
    wrap("7", "27", text)
}

pub fn red(text: &str) -> String {
    wrap("31", "39", text)
}

pub fn green(text: &str) -> String {
    wrap("32", "39", text)
}

pub fn yellow(text: &str) -> String {
    wrap("33", "39", text)
}

pub fn blue(text: &str) -> String {
    wrap("34", "39", text)
}

pub fn cyan(text: &str) -> String {
    wrap("36", "39", text)
}

#[cfg(test)]
mod tests {
    use super::{bold, cyan};

    #[test]
    fn wraps_with_matching_close_codes() {
        assert_eq!(bold("x"), "\x1b[1mx\x1b[22m");
        assert_eq!(cyan("x"), "\x1b[36mx\x1b[39m");
        assert_eq!(bold(""), "");
    }
}
