//! Error types for readview.
//!
//! This module defines the error types returned by the parsing entry points.

/// Error type for article extraction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input document was empty (or whitespace only).
    #[error("No document to parse")]
    EmptyDocument,

    /// The document exceeds the configured element budget.
    #[error("Aborting parsing document; {0} elements found")]
    TooManyElements(usize),
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;
