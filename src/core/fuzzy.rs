//! Smart-case fuzzy scoring.
//!
//! The scorer finds the leftmost subsequence match of the query, then walks
//! backwards from the last matched character to shrink the window before
//! scoring it. Matches at word boundaries and consecutive runs score higher;
//! gaps between matched characters are penalized.

const SCORE_MATCH: i32 = 16;
const SCORE_GAP_START: i32 = -3;
const SCORE_GAP_EXTENSION: i32 = -1;
const BONUS_BOUNDARY: i32 = 8;
const BONUS_NON_WORD: i32 = 8;
const BONUS_CAMEL_123: i32 = 7;
const BONUS_CONSECUTIVE: i32 = 4;
const BONUS_FIRST_CHAR_MULTIPLIER: i32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyMatch {
    pub score: i32,
    /// Char indices into the matched text.
    pub positions: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    White,
    NonWord,
    Lower,
    Upper,
    Digit,
}

fn char_class(ch: char) -> CharClass {
    if ch.is_lowercase() {
        CharClass::Lower
    } else if ch.is_uppercase() {
        CharClass::Upper
    } else if ch.is_numeric() {
        CharClass::Digit
    } else if ch.is_whitespace() {
        CharClass::White
    } else if ch.is_alphanumeric() {
        CharClass::Lower
    } else {
        CharClass::NonWord
    }
}

fn bonus_for(prev: CharClass, class: CharClass) -> i32 {
    match (prev, class) {
        (CharClass::White | CharClass::NonWord, CharClass::Lower | CharClass::Upper | CharClass::Digit) => {
            BONUS_BOUNDARY
        }
        (CharClass::Lower, CharClass::Upper) => BONUS_CAMEL_123,
        (CharClass::Lower | CharClass::Upper, CharClass::Digit) => BONUS_CAMEL_123,
        (_, CharClass::NonWord) => BONUS_NON_WORD,
        _ => 0,
    }
}

/// Returns whether `query` should be matched case-sensitively.
pub fn is_case_sensitive(query: &str) -> bool {
    query.chars().any(char::is_uppercase)
}

/// Scores `text` against `query`. `None` when `query` is not a subsequence.
///
/// An empty query matches everything with score 0.
pub fn fuzzy_match(query: &str, text: &str) -> Option<FuzzyMatch> {
    if query.is_empty() {
        return Some(FuzzyMatch {
            score: 0,
            positions: Vec::new(),
        });
    }

    let case_sensitive = is_case_sensitive(query);
    let fold = |ch: char| {
        if case_sensitive {
            ch
        } else {
            ch.to_lowercase().next().unwrap_or(ch)
        }
    };

    let pattern: Vec<char> = query.chars().map(fold).collect();
    let original: Vec<char> = text.chars().collect();
    let folded: Vec<char> = original.iter().copied().map(fold).collect();

    // Forward pass: leftmost greedy subsequence.
    let mut pattern_index = 0;
    let mut end = None;
    for (index, ch) in folded.iter().enumerate() {
        if *ch == pattern[pattern_index] {
            pattern_index += 1;
            if pattern_index == pattern.len() {
                end = Some(index);
                break;
            }
        }
    }
    let end = end?;

    // Backward pass: shrink the window to the tightest start.
    let mut pattern_index = pattern.len();
    let mut start = end;
    for index in (0..=end).rev() {
        if folded[index] == pattern[pattern_index - 1] {
            pattern_index -= 1;
            if pattern_index == 0 {
                start = index;
                break;
            }
        }
    }

    Some(score_window(&original, &folded, &pattern, start, end))
}

fn score_window(
    original: &[char],
    folded: &[char],
    pattern: &[char],
    start: usize,
    end: usize,
) -> FuzzyMatch {
    let mut score = 0;
    let mut positions = Vec::with_capacity(pattern.len());
    let mut pattern_index = 0;
    let mut in_gap = false;
    let mut consecutive = 0;
    let mut first_bonus = 0;
    let mut prev_class = if start > 0 {
        char_class(original[start - 1])
    } else {
        CharClass::White
    };

    for index in start..=end {
        let class = char_class(original[index]);
        if pattern_index < pattern.len() && folded[index] == pattern[pattern_index] {
            score += SCORE_MATCH;
            let mut bonus = bonus_for(prev_class, class);
            if consecutive == 0 {
                first_bonus = bonus;
            } else {
                if bonus == BONUS_BOUNDARY {
                    first_bonus = bonus;
                }
                bonus = bonus.max(first_bonus).max(BONUS_CONSECUTIVE);
            }
            if pattern_index == 0 {
                score += bonus * BONUS_FIRST_CHAR_MULTIPLIER;
            } else {
                score += bonus;
            }
            positions.push(index);
            pattern_index += 1;
            in_gap = false;
            consecutive += 1;
        } else {
            score += if in_gap {
                SCORE_GAP_EXTENSION
            } else {
                SCORE_GAP_START
            };
            in_gap = true;
            consecutive = 0;
            first_bonus = 0;
        }
        prev_class = class;
    }

    FuzzyMatch { score, positions }
}

/// Score of `text` for `query`, 0 when it does not match.
pub fn score(query: &str, text: &str) -> i32 {
    fuzzy_match(query, text).map_or(0, |matched| matched.score)
}
