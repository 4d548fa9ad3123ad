//! Truncation, padding and word wrapping of styled lines.

use unicode_segmentation::UnicodeSegmentation;

use super::ansi::{is_sgr, is_sgr_reset, segments, Segment};
use super::width::{grapheme_width, visible_width};

const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone)]
enum Cell {
    Escape(String),
    Grapheme(String, usize),
}

fn cells(line: &str) -> Vec<Cell> {
    let mut out = Vec::new();
    for segment in segments(line) {
        match segment {
            Segment::Escape(code) => out.push(Cell::Escape(code.to_string())),
            Segment::Text(text) => out.extend(
                text.graphemes(true)
                    .map(|g| Cell::Grapheme(g.to_string(), grapheme_width(g))),
            ),
        }
    }
    out
}

/// Truncates `text` to `max_width` columns, appending `ellipsis` when cut.
///
/// Styling is reset after a cut so the ellipsis never inherits colors.
pub fn truncate_to_width(text: &str, max_width: usize, ellipsis: &str) -> String {
    if max_width == 0 {
        return String::new();
    }
    if visible_width(text) <= max_width {
        return text.to_string();
    }

    let ellipsis_width = visible_width(ellipsis);
    if ellipsis_width >= max_width {
        return ellipsis.chars().take(max_width).collect();
    }
    let budget = max_width - ellipsis_width;

    let mut out = String::with_capacity(text.len());
    let mut used = 0;
    let mut styled = false;
    for cell in cells(text) {
        match cell {
            Cell::Escape(code) => {
                styled |= is_sgr(&code) && !is_sgr_reset(&code);
                out.push_str(&code);
            }
            Cell::Grapheme(grapheme, width) => {
                if used + width > budget {
                    break;
                }
                out.push_str(&grapheme);
                used += width;
            }
        }
    }
    if styled {
        out.push_str(RESET);
    }
    out.push_str(ellipsis);
    out
}

/// Pads `text` with spaces up to `width` columns. Longer input is returned unchanged.
pub fn pad_to_width(text: &str, width: usize) -> String {
    let current = visible_width(text);
    if current >= width {
        return text.to_string();
    }
    format!("{text}{}", " ".repeat(width - current))
}

/// Word-wraps `text` to `width` columns.
///
/// Explicit newlines are kept. Words longer than `width` are split. Active
/// SGR styling is closed at each break and reopened on the next line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut active: Vec<String> = Vec::new();

    for logical in text.split('\n') {
        let mut current: Vec<Cell> = Vec::new();
        let mut current_width = 0;
        let mut prefix = active.concat();

        for cell in cells(logical) {
            match cell {
                Cell::Escape(code) => {
                    if is_sgr_reset(&code) {
                        active.clear();
                    } else if is_sgr(&code) {
                        active.push(code.clone());
                    }
                    current.push(Cell::Escape(code));
                }
                Cell::Grapheme(grapheme, cell_width) => {
                    if current_width + cell_width > width && current_width > 0 {
                        let carry = split_at_last_space(&mut current);
                        lines.push(finish_line(&prefix, &current, !active.is_empty()));
                        prefix = active.concat();
                        current = carry;
                        current_width = current
                            .iter()
                            .map(|cell| match cell {
                                Cell::Grapheme(_, w) => *w,
                                Cell::Escape(_) => 0,
                            })
                            .sum();
                        if current_width == 0 && grapheme == " " {
                            continue;
                        }
                    }
                    current_width += cell_width;
                    current.push(Cell::Grapheme(grapheme, cell_width));
                }
            }
        }
        lines.push(finish_line(&prefix, &current, !active.is_empty()));
    }

    lines
}

/// Removes everything after the last space in `line` (and the space itself),
/// returning the removed tail. An empty vector means a hard break.
fn split_at_last_space(line: &mut Vec<Cell>) -> Vec<Cell> {
    let Some(space) = line
        .iter()
        .rposition(|cell| matches!(cell, Cell::Grapheme(g, _) if g == " "))
    else {
        return Vec::new();
    };
    if space == 0 {
        return Vec::new();
    }
    let tail = line.split_off(space + 1);
    line.pop();
    tail
}

fn finish_line(prefix: &str, cells: &[Cell], close: bool) -> String {
    let mut out = String::from(prefix);
    for cell in cells {
        match cell {
            Cell::Escape(code) | Cell::Grapheme(code, _) => out.push_str(code),
        }
    }
    if close {
        out.push_str(RESET);
    }
    out
}
