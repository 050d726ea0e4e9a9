//! Extract, chunk, highlight.
//!
//! ```text
//! file id ──extract──▶ Document ──chunk──▶ [String] ──highlight──▶ ranked [Highlight]
//!                         │                                              │
//!                  errors stop here                           keep first max_highlights
//! ```

use tracing::debug;

use crate::extract::TextExtractor;
use crate::highlights::{Highlight, HighlightsClient};
use crate::{Chunker, Result};

/// Ranked highlights found in one file.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightReport {
    /// Id of the file that was searched.
    pub file_id: String,
    /// Display name of the file.
    pub file_name: String,
    /// The query that was asked.
    pub query: String,
    /// Number of chunks the document was split into.
    pub chunk_count: usize,
    /// Highlights, most relevant first.
    pub highlights: Vec<Highlight>,
}

impl std::fmt::Display for HighlightReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.highlights.is_empty() {
            return write!(
                f,
                "No relevant highlights found in file {} (ID: {}) for query: {}",
                self.file_name, self.file_id, self.query
            );
        }

        writeln!(
            f,
            "Highlights from {} (ID: {}) for query: {}",
            self.file_name, self.file_id, self.query
        )?;
        writeln!(f)?;
        for (i, highlight) in self.highlights.iter().enumerate() {
            writeln!(f, "{}. {}", i + 1, highlight.text)?;
        }
        Ok(())
    }
}

/// Find the passages of a file most relevant to `query`.
///
/// Extraction failures are returned as-is and nothing is chunked. The
/// highlighting client ranks its results; this keeps the first
/// `max_highlights` of them.
pub fn get_highlights_from_file(
    extractor: &dyn TextExtractor,
    chunker: &dyn Chunker,
    client: &dyn HighlightsClient,
    file_id: &str,
    query: &str,
    max_highlights: usize,
) -> Result<HighlightReport> {
    let document = extractor.extract_text(file_id)?;
    debug!(
        file_id,
        file_name = %document.name,
        bytes = document.text.len(),
        "extracted document"
    );

    let chunks: Vec<String> = chunker
        .chunk(&document.text)?
        .into_iter()
        .map(|c| c.text)
        .collect();
    debug!(file_id, chunks = chunks.len(), "chunked document");

    let mut highlights = client.request_highlights(&chunks, query)?;
    highlights.truncate(max_highlights);
    debug!(file_id, highlights = highlights.len(), "received highlights");

    Ok(HighlightReport {
        file_id: document.id,
        file_name: document.name,
        query: query.to_string(),
        chunk_count: chunks.len(),
        highlights,
    })
}
