//! Line-diff renderer for the alternate screen.

use crate::core::text::truncate_to_width;

const SYNC_START: &str = "\x1b[?2026h";
const SYNC_END: &str = "\x1b[?2026l";
const CLEAR_SCREEN: &str = "\x1b[H\x1b[2J";
const RESET_CLEAR_LINE: &str = "\x1b[0m\x1b[K";

/// Tracks the last frame and emits only the rows that changed.
#[derive(Debug, Default)]
pub struct Renderer {
    previous: Vec<String>,
    size: Option<(usize, usize)>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets the previous frame so the next render repaints everything.
    pub fn reset(&mut self) {
        self.previous.clear();
        self.size = None;
    }

    /// Returns the escape stream that turns the previous frame into `lines`.
    ///
    /// Lines beyond `height` are dropped and each line is clipped to `width`.
    /// An empty string means nothing changed.
    pub fn render(&mut self, lines: &[String], width: usize, height: usize) -> String {
        let frame: Vec<String> = lines
            .iter()
            .take(height)
            .map(|line| truncate_to_width(line, width, ""))
            .collect();

        let full = self.size != Some((width, height));
        let mut out = String::new();
        if full {
            out.push_str(CLEAR_SCREEN);
        }

        let rows = frame.len().max(if full { 0 } else { self.previous.len() });
        for row in 0..rows {
            let next = frame.get(row);
            if !full && next == self.previous.get(row) {
                continue;
            }
            out.push_str(&format!("\x1b[{};1H", row + 1));
            if let Some(line) = next {
                out.push_str(line);
            }
            out.push_str(RESET_CLEAR_LINE);
        }

        self.previous = frame;
        self.size = Some((width, height));

        if out.is_empty() {
            return out;
        }
        format!("{SYNC_START}{out}{SYNC_END}")
    }
}
