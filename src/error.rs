//! Error types for docslice.

use crate::extract::ExtractionError;
use crate::highlights::HighlightsError;

/// Errors that can occur while chunking a document or running the
/// highlighting pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input text has zero length; there is nothing to chunk.
    #[error("empty input: cannot chunk a document with no text")]
    EmptyInput,

    /// A configuration value is unusable (zero chunk size, unparseable
    /// environment variable, unknown unit).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The token measurement backend could not be loaded.
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    /// Text extraction failed; chunking was not attempted.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The highlighting service call failed.
    #[error(transparent)]
    Highlights(#[from] HighlightsError),
}

/// Result type for docslice operations.
pub type Result<T> = std::result::Result<T, Error>;
