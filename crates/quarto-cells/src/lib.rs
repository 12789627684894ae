//! # quarto-cells
//!
//! Breaks Quarto literate-markdown (`.qmd`) documents into typed cells:
//! YAML front matter, markdown prose, fenced executable cells tagged by
//! language, and display math. Every cell's text is a
//! [`MappedString`](quarto_mapped_text::MappedString), so positions inside a
//! cell — including inside its extracted YAML option block — resolve back to
//! the original document for diagnostics.
//!
//! Parsing is permissive by design: malformed or ambiguous structure never
//! fails, it falls back to markdown. This crate guarantees provenance of
//! text spans; it does not validate document semantics (legal option keys
//! are the YAML validator's business).
//!
//! ## Example
//!
//! ```rust
//! use quarto_cells::{break_quarto_md, CellType};
//! use quarto_mapped_text::MappedString;
//!
//! let doc = MappedString::original("```{r}\n#| echo: false\n1 + 1\n```\n");
//! let notebook = break_quarto_md(&doc);
//! assert_eq!(notebook.cells.len(), 1);
//! assert_eq!(
//!     notebook.cells[0].cell_type,
//!     CellType::Code { language: "r".to_string() }
//! );
//! assert_eq!(notebook.cells[0].source.value(), "1 + 1");
//! ```

pub mod break_quarto_md;
pub mod comment;
pub mod notebook;
pub mod partition;

pub use break_quarto_md::{break_quarto_md, break_quarto_md_with};
pub use comment::{CommentSyntax, CommentSyntaxTable};
pub use notebook::{Cell, CellType, Notebook};
pub use partition::{
    default_comment_table, partition_cell_options, partition_cell_options_with, PartitionedCell,
};
