//! Derived text that remembers, for every byte, where it came from
//!
//! `MappedString` is the mechanism for maintaining offset information through
//! substrings. This comes up constantly in Quarto documents: a part of a
//! larger string is pulled out, handed to an interpreter or validator, and
//! error positions must then be reported against the file the user actually
//! wrote. A `MappedString` is assembled from literal ("new", unmappable)
//! pieces and byte-range slices of a parent text; `map` and `map_closest`
//! resolve offsets in the assembled value all the way back to the root text,
//! however many derivations deep the chain is.
//!
//! Values are immutable once constructed and share parents by reference
//! count, so deriving is cheap and a derived string can never observe its
//! parent changing.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::binary_search::{glb, glb_by};
use crate::error::{Error, Result};
use crate::text::{line_break_positions, LineIndex};
use crate::types::{Location, Range};

/// One input piece of a derived text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Piece {
    /// Synthetic text with no provenance
    Literal(String),
    /// A byte range into the parent text
    Range(Range),
}

impl From<&str> for Piece {
    fn from(text: &str) -> Self {
        Piece::Literal(text.to_string())
    }
}

impl From<String> for Piece {
    fn from(text: String) -> Self {
        Piece::Literal(text)
    }
}

impl From<Range> for Piece {
    fn from(range: Range) -> Self {
        Piece::Range(range)
    }
}

/// One segment of a derived value, with its start offset precomputed for
/// predecessor search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Segment {
    /// Start offset of this segment within the derived value
    offset: usize,
    /// Byte length of the segment text
    len: usize,
    /// Provenance range in the parent value; `None` for literal segments
    source: Option<Range>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
enum Repr {
    /// A root text; offsets map to themselves
    Original { file_name: Option<String> },
    /// Text assembled from literal and parent-range segments
    Pieces {
        parent: MappedString,
        segments: Vec<Segment>,
    },
    /// Concatenation of whole mapped strings, with each part's start offset
    /// in the joined value
    Concat {
        parts: Vec<MappedString>,
        starts: Vec<usize>,
    },
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Inner {
    value: String,
    repr: Repr,
}

/// An immutable value pairing derived text with the ability to recover, for
/// any offset in that text, the corresponding offset in the root text it was
/// ultimately derived from.
///
/// Cloning is cheap: the representation is shared behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedString {
    inner: Arc<Inner>,
}

impl MappedString {
    /// Seed a derivation chain from a root text; every offset maps to itself.
    pub fn original(text: impl Into<String>) -> Self {
        MappedString {
            inner: Arc::new(Inner {
                value: text.into(),
                repr: Repr::Original { file_name: None },
            }),
        }
    }

    /// `original`, additionally tagging the root with a file name for
    /// diagnostics.
    pub fn original_with_file(text: impl Into<String>, file_name: impl Into<String>) -> Self {
        MappedString {
            inner: Arc::new(Inner {
                value: text.into(),
                repr: Repr::Original {
                    file_name: Some(file_name.into()),
                },
            }),
        }
    }

    /// The derived text
    pub fn value(&self) -> &str {
        &self.inner.value
    }

    /// Byte length of the derived text
    pub fn len(&self) -> usize {
        self.inner.value.len()
    }

    /// True when the derived text is empty
    pub fn is_empty(&self) -> bool {
        self.inner.value.is_empty()
    }

    /// The root text this string was ultimately derived from.
    ///
    /// For concatenations this resolves through the first part only; parts
    /// rooted elsewhere still map correctly through `map`/`map_closest`, but
    /// are not represented here.
    pub fn original_string(&self) -> &str {
        let mut current = self;
        loop {
            match &current.inner.repr {
                Repr::Original { .. } => return &current.inner.value,
                Repr::Pieces { parent, .. } => current = parent,
                Repr::Concat { parts, .. } => current = &parts[0],
            }
        }
    }

    /// File name of the root text, when one was attached.
    ///
    /// Resolves like `original_string`: through the parent chain, and through
    /// the first part of a concatenation.
    pub fn file_name(&self) -> Option<&str> {
        let mut current = self;
        loop {
            match &current.inner.repr {
                Repr::Original { file_name } => return file_name.as_deref(),
                Repr::Pieces { parent, .. } => current = parent,
                Repr::Concat { parts, .. } => current = &parts[0],
            }
        }
    }

    /// Resolve an offset in the derived text to the corresponding offset in
    /// the root text, or `None` if the offset falls in literal text (or past
    /// the end) at any level of the chain.
    pub fn map(&self, offset: usize) -> Option<usize> {
        let mut current = self;
        let mut offset = offset;
        loop {
            match &current.inner.repr {
                Repr::Original { .. } => return Some(offset),
                Repr::Pieces { parent, segments } => {
                    let ix = glb_by(segments, &offset, |offset, segment| {
                        offset.cmp(&segment.offset)
                    })?;
                    let segment = &segments[ix];
                    let range = segment.source?;
                    let local = offset - segment.offset;
                    if local >= segment.len {
                        return None;
                    }
                    offset = range.start + local;
                    current = parent;
                }
                Repr::Concat { parts, starts } => {
                    if offset >= current.inner.value.len() {
                        return None;
                    }
                    let ix = glb(starts, &offset)?;
                    offset -= starts[ix];
                    current = &parts[ix];
                }
            }
        }
    }

    /// Like `map`, but an offset with no exact source position resolves to
    /// the nearest source position on the left: the last byte of the closest
    /// preceding source segment.
    ///
    /// Returns `None` only when nothing source-derived exists at or before
    /// the offset at some level of the chain. Never panics.
    pub fn map_closest(&self, offset: usize) -> Option<usize> {
        let mut current = self;
        let mut offset = offset;
        loop {
            match &current.inner.repr {
                Repr::Original { .. } => return Some(offset),
                Repr::Pieces { parent, segments } => {
                    let first_ix = glb_by(segments, &offset, |offset, segment| {
                        offset.cmp(&segment.offset)
                    })?;
                    let mut resolved = None;
                    for ix in (0..=first_ix).rev() {
                        let segment = &segments[ix];
                        let Some(range) = segment.source else {
                            continue;
                        };
                        if ix == first_ix {
                            let local = offset - segment.offset;
                            if local < segment.len {
                                resolved = Some(range.start + local);
                                break;
                            }
                        }
                        resolved = Some(range.end - 1);
                        break;
                    }
                    offset = resolved?;
                    current = parent;
                }
                Repr::Concat { parts, starts } => {
                    if offset >= current.inner.value.len() {
                        return None;
                    }
                    let ix = glb(starts, &offset)?;
                    offset -= starts[ix];
                    current = &parts[ix];
                }
            }
        }
    }
}

/// Assemble a new `MappedString` from pieces of `source`.
///
/// Range pieces are clamped to the bounds of `source.value()`; ranges left
/// empty after clamping are dropped and contribute no segment.
pub fn mapped_string(
    source: &MappedString,
    pieces: impl IntoIterator<Item = Piece>,
) -> MappedString {
    let src = source.value();
    let mut segments = Vec::new();
    let mut value = String::new();
    for piece in pieces {
        match piece {
            Piece::Literal(text) => {
                segments.push(Segment {
                    offset: value.len(),
                    len: text.len(),
                    source: None,
                });
                value.push_str(&text);
            }
            Piece::Range(range) => {
                let start = range.start.min(src.len());
                let end = range.end.min(src.len()).max(start);
                if start == end {
                    continue;
                }
                let text = &src[start..end];
                segments.push(Segment {
                    offset: value.len(),
                    len: text.len(),
                    source: Some(Range { start, end }),
                });
                value.push_str(text);
            }
        }
    }
    MappedString {
        inner: Arc::new(Inner {
            value,
            repr: Repr::Pieces {
                parent: source.clone(),
                segments,
            },
        }),
    }
}

/// `mapped_string` over a single range of `source`
pub fn mapped_substring(source: &MappedString, start: usize, end: usize) -> MappedString {
    mapped_string(source, [Piece::Range(Range { start, end })])
}

/// Concatenate mapped strings into one, delegating offset resolution to the
/// part owning each region of the joined value.
///
/// `original_string`/`file_name` of the result resolve through the first
/// part; parts rooted in other documents still map into their own roots.
/// Errors on an empty list.
pub fn mapped_concat(parts: &[MappedString]) -> Result<MappedString> {
    if parts.is_empty() {
        return Err(Error::EmptyConcat);
    }
    let mut starts = Vec::with_capacity(parts.len());
    let mut value = String::new();
    for part in parts {
        starts.push(value.len());
        value.push_str(part.value());
    }
    Ok(MappedString {
        inner: Arc::new(Inner {
            value,
            repr: Repr::Concat {
                parts: parts.to_vec(),
                starts,
            },
        }),
    })
}

/// Mapped newline normalization: the value is `source.value()` with every
/// `\r\n` collapsed to `\n`, and every surviving byte still maps to its
/// position in the root text.
pub fn mapped_normalize_newlines(source: &MappedString) -> MappedString {
    let value = source.value();
    let mut pieces = Vec::new();
    let mut start = 0;
    for brk in line_break_positions(value) {
        if value.as_bytes()[brk] != b'\r' {
            continue;
        }
        // contents up to the \r, then the \n on its own
        pieces.push(Piece::Range(Range { start, end: brk }));
        pieces.push(Piece::Range(Range {
            start: brk + 1,
            end: brk + 2,
        }));
        start = brk + 2;
    }
    if start != value.len() {
        pieces.push(Piece::Range(Range {
            start,
            end: value.len(),
        }));
    }
    mapped_string(source, pieces)
}

/// Translates offsets in a derived text to row/column positions in its root
/// text, for user-facing diagnostics.
#[derive(Debug, Clone)]
pub struct MappedLineIndex {
    text: MappedString,
    index: LineIndex,
}

impl MappedLineIndex {
    /// Precompute the line table of `text.original_string()`
    pub fn new(text: &MappedString) -> Self {
        MappedLineIndex {
            index: LineIndex::new(text.original_string()),
            text: text.clone(),
        }
    }

    /// Resolve `offset` through `map_closest` and convert to row/column in
    /// the root text.
    ///
    /// # Panics
    ///
    /// Panics when the offset has no source mapping at all. That means a
    /// derivation chain was built out of purely literal text and then asked
    /// for positions, which is a bug in the calling code, not a property of
    /// any document.
    pub fn row_col(&self, offset: usize) -> Location {
        let Some(original) = self.text.map_closest(offset) else {
            panic!("internal error: offset {offset} has no mapping into the original text");
        };
        self.index.row_col(original)
    }
}
