//! Error types for quarto-mapped-text

use thiserror::Error;

/// Result type alias for quarto-mapped-text operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the mapped-string algebra.
///
/// These signal caller contract violations, not malformed document input;
/// document parsing built on this crate is total.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("mapped_concat requires a non-empty list of strings")]
    EmptyConcat,
}
