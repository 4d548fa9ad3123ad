//! Column width of graphemes and styled strings.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

use super::ansi::{segments, Segment};

const TAB_WIDTH: usize = 4;

pub fn grapheme_width(grapheme: &str) -> usize {
    match grapheme {
        "" => 0,
        "\t" => TAB_WIDTH,
        _ if emojis::get(grapheme).is_some() => 2,
        _ => grapheme
            .chars()
            .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
            .sum(),
    }
}

/// Terminal columns occupied by `input`, ignoring escape sequences.
pub fn visible_width(input: &str) -> usize {
    segments(input)
        .into_iter()
        .map(|segment| match segment {
            Segment::Escape(_) => 0,
            Segment::Text(text) => text.graphemes(true).map(grapheme_width).sum(),
        })
        .sum()
}
