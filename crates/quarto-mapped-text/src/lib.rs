//! Mapped source text for Quarto documents
//!
//! This crate provides the text algebra underneath Quarto's literate-markdown
//! handling: deriving new strings from a document while preserving, for every
//! byte of the derived text, a path back to its exact position in the
//! original file. Extracted cell bodies, per-cell option blocks, and
//! normalized text all stay traceable to the file the user wrote, so
//! downstream validators and renderers can report positions that make sense.
//!
//! The pieces, leaves first:
//! - [`glb`]/[`glb_by`]: predecessor search over sorted sequences
//! - [`lines`], [`line_offsets`], [`LineIndex`]: line splitting and
//!   offset/row-column conversion
//! - [`ranged_lines`], [`RangedSubstring`]: line splitting that keeps
//!   provenance ranges
//! - [`MappedString`] with [`mapped_string`], [`mapped_substring`],
//!   [`mapped_concat`]: the derivation algebra itself
//! - [`MappedLineIndex`]: row/column positions in the root text for offsets
//!   in a derived text
//!
//! All offsets are byte offsets into UTF-8 text and must lie on `char`
//! boundaries.
//!
//! # Example
//!
//! ```rust
//! use quarto_mapped_text::{mapped_string, MappedString, Piece, Range};
//!
//! let doc = MappedString::original("abcdef");
//! let slice = mapped_string(&doc, [Piece::Range(Range::new(1, 4))]);
//! assert_eq!(slice.value(), "bcd");
//! assert_eq!(slice.map(0), Some(1));
//! ```

pub mod binary_search;
pub mod error;
pub mod mapped;
pub mod ranged;
pub mod text;
pub mod types;

// Re-export main types
pub use binary_search::{glb, glb_by};
pub use error::{Error, Result};
pub use mapped::{
    mapped_concat, mapped_normalize_newlines, mapped_string, mapped_substring, MappedLineIndex,
    MappedString, Piece,
};
pub use ranged::{ranged_lines, ranged_substring, ranged_substring_to_end, RangedSubstring};
pub use text::{
    line_break_positions, line_offsets, lines, normalize_newlines, trim_empty_lines, LineIndex,
    Trim,
};
pub use types::{Location, Range};
