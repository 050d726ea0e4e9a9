//! # docslice
//!
//! Boundary-preserving text chunking for document highlighting pipelines.
//!
//! ## The Problem
//!
//! A highlighting service ranks passages of a document against a query, but
//! it only accepts passages up to some size. Extracted document text has no
//! such limit. It has to be cut into pieces that fit, and where it is cut
//! matters:
//!
//! - A cut mid-sentence hands the service half an argument
//! - A cut mid-word produces tokens that match nothing
//! - Dropping the separators at cut points makes it impossible to map a
//!   highlight back to the source
//!
//! ## Tiered Splitting
//!
//! [`TieredChunker`] tries the coarsest boundary first and only escalates
//! for the pieces that are still too large:
//!
//! ```text
//! Paragraph -> Line -> Sentence -> Clause -> Whitespace -> Character
//!
//! 1. Split on blank lines, pack paragraphs greedily up to the limit
//! 2. A packed chunk still over the limit? Split that chunk alone on lines
//! 3. ... then sentences (UAX #29), clauses (, ; :), whitespace
//! 4. Last resort: cut at the limit, even inside a word
//! ```
//!
//! A strategy that finds no break point in a chunk is skipped, so the
//! algorithm always makes progress and always terminates.
//!
//! Chunks are exact, contiguous slices of the input. Separators stay at the
//! end of the chunk they follow, and joining all chunks gives back the
//! original text.
//!
//! ## Quick Start
//!
//! ```rust
//! use docslice::{chunk, Chunker, SizeUnit, TieredChunker};
//!
//! let text = "Revenue grew in every region.\n\n\
//!             Costs fell, margins widened, and guidance was raised.";
//!
//! // Just the texts
//! let pieces = chunk(text, 40, SizeUnit::Characters).unwrap();
//! assert!(pieces.iter().all(|p| p.chars().count() <= 40));
//! assert_eq!(pieces.concat(), text);
//!
//! // With offsets and the strategy that produced each chunk
//! let chunker = TieredChunker::new(40, SizeUnit::Characters).unwrap();
//! for c in chunker.chunk(text).unwrap() {
//!     assert_eq!(&text[c.span()], c.text);
//! }
//! ```
//!
//! ## Units
//!
//! Limits are either characters (Unicode scalar values) or `cl100k_base`
//! tokens, see [`SizeUnit`]. Custom measures plug in through
//! [`ChunkSizer`] and [`TieredChunker::with_sizer`].
//!
//! ## Around the Chunker
//!
//! The crate also carries the pieces a highlighting pipeline needs around
//! the chunker: a [`TextExtractor`] seam with a filesystem implementation,
//! a [`HighlightsClient`] seam with wire types, payload batching and
//! ranking, environment [`Config`], and [`get_highlights_from_file`] tying
//! them together. The HTTP client lives behind the `http` feature.

mod boundary;
mod chunk;
mod config;
mod error;
mod extract;
mod highlights;
mod pipeline;
mod sizer;
mod tiered;

pub use boundary::Boundary;
pub use chunk::Chunk;
pub use config::{
    ChunkerConfig, Config, HighlightsConfig, StorageCredentials, DEFAULT_HIGHLIGHTS_ENDPOINT,
    DEFAULT_MAX_CHUNK_SIZE,
};
pub use error::{Error, Result};
pub use extract::{normalize_whitespace, Document, ExtractionError, FsExtractor, TextExtractor};
pub use highlights::{
    batch_ranges, rank, request_in_batches, Highlight, HighlightRequest, HighlightResponse,
    HighlightResult, HighlightsClient, HighlightsError, SimulatedHighlights,
};
#[cfg(feature = "http")]
pub use highlights::HttpHighlightsClient;
pub use pipeline::{get_highlights_from_file, HighlightReport};
pub use sizer::{CharacterSizer, ChunkSizer, SizeUnit, TokenSizer};
pub use tiered::TieredChunker;

/// A text chunking strategy.
///
/// ```rust
/// use docslice::{Chunker, SizeUnit, TieredChunker};
///
/// fn chunk_document(chunker: &dyn Chunker, text: &str) -> usize {
///     chunker.chunk(text).map(|chunks| chunks.len()).unwrap_or(0)
/// }
///
/// let chunker = TieredChunker::new(100, SizeUnit::Characters).unwrap();
/// assert_eq!(chunk_document(&chunker, "Hello world. This is a test."), 1);
/// ```
pub trait Chunker: Send + Sync {
    /// Split text into chunks.
    ///
    /// Fails with [`Error::EmptyInput`] on an empty string.
    fn chunk(&self, text: &str) -> Result<Vec<Chunk>>;

    /// Estimate the number of chunks for a given text length in bytes.
    ///
    /// Useful for pre-allocation. May be approximate.
    fn estimate_chunks(&self, text_len: usize) -> usize {
        (text_len / 500).max(1)
    }
}

/// Split `text` into chunks of at most `max_chunk_size` units, returning
/// their texts in order.
///
/// ```rust
/// use docslice::{chunk, Error, SizeUnit};
///
/// let word = "x".repeat(500);
/// let pieces = chunk(&word, 100, SizeUnit::Characters).unwrap();
/// assert_eq!(pieces.len(), 5);
///
/// assert!(matches!(chunk("", 100, SizeUnit::Characters), Err(Error::EmptyInput)));
/// assert!(matches!(
///     chunk("text", 0, SizeUnit::Characters),
///     Err(Error::InvalidConfiguration(_))
/// ));
/// ```
pub fn chunk(text: &str, max_chunk_size: usize, unit: SizeUnit) -> Result<Vec<String>> {
    let chunker = TieredChunker::new(max_chunk_size, unit)?;
    Ok(chunker.chunk(text)?.into_iter().map(|c| c.text).collect())
}
