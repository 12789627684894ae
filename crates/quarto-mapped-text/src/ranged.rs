//! Substrings that remember where they came from

use crate::text::newline_matches;
use crate::types::Range;

/// A substring paired with its provenance range in its immediate source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangedSubstring<'a> {
    pub substring: &'a str,
    pub range: Range,
}

/// Take `src[start..end]` together with the range it came from.
///
/// `start` and `end` are clamped to the bounds of `src`.
pub fn ranged_substring(src: &str, start: usize, end: usize) -> RangedSubstring<'_> {
    let start = start.min(src.len());
    let end = end.min(src.len()).max(start);
    RangedSubstring {
        substring: &src[start..end],
        range: Range { start, end },
    }
}

/// `ranged_substring` running to the end of `src`
pub fn ranged_substring_to_end(src: &str, start: usize) -> RangedSubstring<'_> {
    ranged_substring(src, start, src.len())
}

/// Split `text` at every `\r?\n`, one entry per line with the newline
/// excluded from both the substring and the range.
///
/// The remainder after the last newline is always emitted, so text ending in
/// a newline yields a final empty entry.
pub fn ranged_lines(text: &str) -> Vec<RangedSubstring<'_>> {
    let mut result = Vec::new();
    let mut start = 0;
    for (pos, len) in newline_matches(text) {
        result.push(RangedSubstring {
            substring: &text[start..pos],
            range: Range { start, end: pos },
        });
        start = pos + len;
    }
    result.push(RangedSubstring {
        substring: &text[start..],
        range: Range {
            start,
            end: text.len(),
        },
    });
    result
}
