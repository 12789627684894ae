//! Line splitting and offset/row-column conversion for flat strings

use serde::{Deserialize, Serialize};

use crate::binary_search::glb;
use crate::types::Location;

/// Byte offset and length of every `\r?\n` terminator in `text`, in order.
///
/// A lone `\r` is not a line break. For `\r\n` the reported offset is the
/// offset of the `\r`.
pub(crate) fn newline_matches(text: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    let bytes = text.as_bytes();
    text.char_indices().filter_map(move |(idx, ch)| {
        if ch != '\n' {
            return None;
        }
        if idx > 0 && bytes[idx - 1] == b'\r' {
            Some((idx - 1, 2))
        } else {
            Some((idx, 1))
        }
    })
}

/// Split `text` at every `\r?\n`.
///
/// A trailing newline yields a final empty line, matching the split behavior
/// the rest of the crate is built on.
pub fn lines(text: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut start = 0;
    for (pos, len) in newline_matches(text) {
        result.push(&text[start..pos]);
        start = pos + len;
    }
    result.push(&text[start..]);
    result
}

/// Byte offsets of every line-break match in `text` (the `\r` offset for
/// `\r\n` terminators).
pub fn line_break_positions(text: &str) -> Vec<usize> {
    newline_matches(text).map(|(pos, _)| pos).collect()
}

/// `0` followed by the offset of each line-break match.
///
/// Note that entries after the first address the newline characters
/// themselves, not the first character of the following line; `LineIndex`
/// builds its boundary convention on exactly this.
pub fn line_offsets(text: &str) -> Vec<usize> {
    let mut offsets = vec![0];
    offsets.extend(line_break_positions(text));
    offsets
}

/// Rejoin the lines of `text` with `\n`, dropping any `\r`s in terminators.
pub fn normalize_newlines(text: &str) -> String {
    lines(text).join("\n")
}

/// Which end of a line list `trim_empty_lines` strips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trim {
    Leading,
    Trailing,
    All,
}

/// Strip blank lines (empty or whitespace-only) from either or both ends of
/// `lines`, returning the surviving subslice. All-blank input yields an empty
/// slice.
pub fn trim_empty_lines<'a, 'b>(lines: &'a [&'b str], trim: Trim) -> &'a [&'b str] {
    let mut result = lines;
    if matches!(trim, Trim::All | Trim::Leading) {
        match result.iter().position(|line| !line.trim().is_empty()) {
            Some(first) => result = &result[first..],
            None => return &[],
        }
    }
    if matches!(trim, Trim::All | Trim::Trailing) {
        match result.iter().rposition(|line| !line.trim().is_empty()) {
            Some(last) => result = &result[..=last],
            None => return &[],
        }
    }
    result
}

/// Precomputed line-offset table for a text, enabling O(log n) conversion
/// between byte offsets and (row, column) positions.
///
/// The table stores newline positions, not line starts, so the newline
/// terminating row `n` is addressed as column 0 of row `n + 1`, and the first
/// character after it as column 1. `row_col` and `offset` are exact inverses
/// under this convention; it intentionally does not match editor column
/// numbering at line boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineIndex {
    offsets: Vec<usize>,
}

impl LineIndex {
    /// Build the offset table for `text`
    pub fn new(text: &str) -> Self {
        LineIndex {
            offsets: line_offsets(text),
        }
    }

    /// Convert a byte offset to a row/column position
    pub fn row_col(&self, offset: usize) -> Location {
        let row = glb(&self.offsets, &offset).unwrap_or(0);
        Location {
            offset,
            row,
            column: offset - self.offsets[row],
        }
    }

    /// Convert a row/column position back to a byte offset
    pub fn offset(&self, row: usize, column: usize) -> usize {
        self.offsets[row] + column
    }

    /// Number of entries in the offset table (lines addressed by `row_col`)
    pub fn line_count(&self) -> usize {
        self.offsets.len()
    }
}
