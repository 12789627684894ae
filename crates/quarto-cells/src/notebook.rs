//! Cell and notebook types

use quarto_mapped_text::MappedString;
use serde::{Deserialize, Serialize};

/// Classification of a contiguous unit of a literate markdown document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellType {
    /// Markdown prose (also the fallback for anything unclassifiable)
    Markdown,
    /// YAML front matter, delimiter lines included
    Raw,
    /// A display math block
    Math,
    /// An executable fenced cell tagged with a language
    Code { language: String },
}

impl CellType {
    /// The language of a code cell, `None` otherwise
    pub fn language(&self) -> Option<&str> {
        match self {
            CellType::Code { language } => Some(language),
            _ => None,
        }
    }
}

/// A classified, contiguous unit of a document, with every text field still
/// mapped to the original file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub cell_type: CellType,
    /// Cell body. For code cells, the leading option lines are stripped.
    pub source: MappedString,
    /// Byte offset of the executable body within `source_verbatim`, for
    /// aligning reported positions with the text shown to users
    pub source_offset: usize,
    /// Number of option lines stripped from the top of `source`; callers
    /// correct reported line numbers inside the residual body by this much
    pub source_start_line: usize,
    /// The cell as displayed to users
    pub source_verbatim: MappedString,
    /// Per-cell YAML options, when the cell carried any
    pub options: Option<MappedString>,
}

/// An immutable snapshot of a document broken into cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,
}
