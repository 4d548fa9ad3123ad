//! Escape sequence scanning.

const ESC: u8 = 0x1b;
const BEL: u8 = 0x07;

/// Byte length of the escape sequence starting at `pos`, if any.
///
/// Recognizes CSI (`ESC [ … final`), OSC/DCS/APC strings terminated by BEL or
/// `ESC \`, and two-byte `ESC x` sequences.
pub fn escape_len(input: &str, pos: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    if bytes.get(pos) != Some(&ESC) {
        return None;
    }
    let kind = *bytes.get(pos + 1)?;
    match kind {
        b'[' => bytes[pos + 2..]
            .iter()
            .position(|b| (0x40..=0x7e).contains(b))
            .map(|offset| offset + 3),
        b']' | b'P' | b'_' => {
            let mut idx = pos + 2;
            while idx < bytes.len() {
                if bytes[idx] == BEL {
                    return Some(idx + 1 - pos);
                }
                if bytes[idx] == ESC && bytes.get(idx + 1) == Some(&b'\\') {
                    return Some(idx + 2 - pos);
                }
                idx += 1;
            }
            None
        }
        b if b.is_ascii() && !b.is_ascii_control() => Some(2),
        _ => None,
    }
}

/// A run of plain text or a single escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Escape(&'a str),
    Text(&'a str),
}

/// Splits `input` into alternating text and escape segments.
pub fn segments(input: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut text_start = 0;
    let mut idx = 0;
    while idx < input.len() {
        if let Some(len) = escape_len(input, idx) {
            if text_start < idx {
                out.push(Segment::Text(&input[text_start..idx]));
            }
            out.push(Segment::Escape(&input[idx..idx + len]));
            idx += len;
            text_start = idx;
            continue;
        }
        idx += input[idx..].chars().next().map_or(1, char::len_utf8);
    }
    if text_start < input.len() {
        out.push(Segment::Text(&input[text_start..]));
    }
    out
}

/// Removes every escape sequence from `input`.
pub fn strip_ansi(input: &str) -> String {
    segments(input)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Text(text) => Some(text),
            Segment::Escape(_) => None,
        })
        .collect()
}

/// Whether `code` is an SGR reset (`ESC[0m` or `ESC[m`).
pub fn is_sgr_reset(code: &str) -> bool {
    code == "\x1b[0m" || code == "\x1b[m"
}

/// Whether `code` is any SGR (`ESC[…m`) sequence.
pub fn is_sgr(code: &str) -> bool {
    code.starts_with("\x1b[") && code.ends_with('m')
}
