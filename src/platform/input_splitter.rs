//! Splits raw stdin bytes into individual key sequences.
//!
//! Terminals deliver input in arbitrary chunks: one read may hold several
//! keys, and one escape sequence may straddle two reads. The splitter keeps
//! incomplete sequences pending until the next read or until the caller
//! decides the sequence timed out (a lone `ESC` is the escape key).

use crate::core::input_event::{PASTE_END, PASTE_START};

/// Stateful splitter fed by the terminal input thread.
#[derive(Debug, Default)]
pub struct InputSplitter {
    pending: Vec<u8>,
}

impl InputSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Appends `bytes` and returns every complete sequence.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let mut out = Vec::new();

        loop {
            let Some(len) = complete_len(&self.pending) else {
                break;
            };
            let sequence: Vec<u8> = self.pending.drain(..len).collect();
            out.push(String::from_utf8_lossy(&sequence).into_owned());
        }

        out
    }

    /// Emits whatever is pending as one sequence.
    pub fn flush(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let sequence = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&sequence).into_owned())
    }
}

/// Length of the first complete sequence in `buf`, or `None` when more bytes are needed.
fn complete_len(buf: &[u8]) -> Option<usize> {
    let first = *buf.first()?;

    if buf.starts_with(PASTE_START.as_bytes()) {
        return find(buf, PASTE_END.as_bytes()).map(|end| end + PASTE_END.len());
    }
    if PASTE_START.as_bytes().starts_with(buf) && buf.len() > 1 {
        return None;
    }

    if first == 0x1b {
        return escape_len(buf);
    }

    if first < 0x20 || first == 0x7f {
        return Some(1);
    }

    // Group printable text up to the next control byte.
    let mut idx = 0;
    while idx < buf.len() {
        let byte = buf[idx];
        if byte < 0x20 || byte == 0x7f {
            break;
        }
        let width = utf8_len(byte);
        if idx + width > buf.len() {
            return if idx == 0 { None } else { Some(idx) };
        }
        idx += width;
    }
    Some(idx)
}

fn escape_len(buf: &[u8]) -> Option<usize> {
    let second = *buf.get(1)?;
    match second {
        b'[' => {
            // Legacy mouse reports carry three raw bytes after `M`.
            if buf.get(2) == Some(&b'M') {
                return (buf.len() >= 6).then_some(6);
            }
            buf[2..]
                .iter()
                .position(|b| (0x40..=0x7e).contains(b))
                .map(|offset| offset + 3)
        }
        b'O' => buf.get(2).map(|_| 3),
        0x1b => Some(1),
        _ => {
            let width = utf8_len(second);
            (buf.len() > width).then_some(1 + width)
        }
    }
}

fn utf8_len(lead: u8) -> usize {
    match lead {
        0xf0..=0xff => 4,
        0xe0..=0xef => 3,
        0xc0..=0xdf => 2,
        _ => 1,
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
