//! Getting plain text out of stored files.
//!
//! Extraction sits in front of chunking: a [`TextExtractor`] turns a file
//! reference into a [`Document`], and any failure here stops the pipeline
//! before a chunker sees the text.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

/// Text extracted from one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Identifier the file was requested by.
    pub id: String,
    /// Display name of the file.
    pub name: String,
    /// Extracted text. Never empty or whitespace-only.
    pub text: String,
}

/// Why a file produced no usable text.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// No file with that id exists.
    #[error("file not found: {file_id}")]
    NotFound {
        /// The requested id.
        file_id: String,
    },

    /// The file's format cannot be read as text.
    #[error("unsupported format for {file_id}: {reason}")]
    Unsupported {
        /// The requested id.
        file_id: String,
        /// What made it unsupported.
        reason: String,
    },

    /// The file's bytes are not valid text.
    #[error("corrupt file {file_id}: {reason}")]
    Corrupt {
        /// The requested id.
        file_id: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The file contained no text.
    #[error("file {file_id} has no extractable text")]
    Empty {
        /// The requested id.
        file_id: String,
    },

    /// Reading the file failed.
    #[error("failed to read {file_id}: {source}")]
    Io {
        /// The requested id.
        file_id: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Turns a file reference into text.
pub trait TextExtractor: Send + Sync {
    /// Extract the full text of `file_id`.
    fn extract_text(&self, file_id: &str) -> Result<Document, ExtractionError>;
}

/// Collapse every whitespace run to a single space and trim the ends.
///
/// Text pulled out of PDFs is full of hard line wraps and column padding;
/// this flattens it. It also removes paragraph breaks, so only apply it
/// where those carry no meaning.
///
/// ```rust
/// use docslice::normalize_whitespace;
///
/// assert_eq!(normalize_whitespace("  a\tb\n\n c  "), "a b c");
/// ```
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reads UTF-8 files from a local directory.
///
/// File ids are paths relative to `root`. Ids that would escape the root
/// are reported as not found.
#[derive(Debug, Clone)]
pub struct FsExtractor {
    root: PathBuf,
    normalize: bool,
}

impl FsExtractor {
    /// Serve files below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            normalize: false,
        }
    }

    /// Collapse whitespace in extracted text (see [`normalize_whitespace`]).
    #[must_use]
    pub fn normalized(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    fn resolve(&self, file_id: &str) -> Option<PathBuf> {
        let relative = Path::new(file_id);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || file_id.is_empty() {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl TextExtractor for FsExtractor {
    fn extract_text(&self, file_id: &str) -> Result<Document, ExtractionError> {
        let not_found = || ExtractionError::NotFound {
            file_id: file_id.to_string(),
        };
        let path = self.resolve(file_id).ok_or_else(not_found)?;

        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if is_pdf {
            return Err(ExtractionError::Unsupported {
                file_id: file_id.to_string(),
                reason: "PDF parsing is not available".to_string(),
            });
        }

        let bytes = fs::read(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => not_found(),
            _ => ExtractionError::Io {
                file_id: file_id.to_string(),
                source,
            },
        })?;

        let text = String::from_utf8(bytes).map_err(|e| ExtractionError::Corrupt {
            file_id: file_id.to_string(),
            reason: e.utf8_error().to_string(),
        })?;

        let text = if self.normalize {
            normalize_whitespace(&text)
        } else {
            text
        };

        if text.trim().is_empty() {
            return Err(ExtractionError::Empty {
                file_id: file_id.to_string(),
            });
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_id.to_string());

        debug!(file_id, bytes = text.len(), "extracted text");

        Ok(Document {
            id: file_id.to_string(),
            name,
            text,
        })
    }
}
