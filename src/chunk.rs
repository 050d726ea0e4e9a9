//! The Chunk type: a bounded slice of document text with position metadata.

use serde::Serialize;

use crate::Boundary;

/// A contiguous piece of a document produced by a [`Chunker`](crate::Chunker).
///
/// ## Byte Offsets
///
/// `start` and `end` are byte offsets into the original text, so a chunk can
/// always be recovered by slicing:
///
/// ```rust
/// use docslice::{Boundary, Chunk};
///
/// let text = "Hello, world!";
/// let chunk = Chunk::new("world!", 7, 13, 0, 6, Some(Boundary::Whitespace));
///
/// assert_eq!(&text[chunk.span()], chunk.text);
/// ```
///
/// ## Separators
///
/// Chunks never overlap and never drop text. When a split happens on a
/// separator (a blank line, a newline, the space after a full stop), the
/// separator stays at the end of the chunk before the split:
///
/// ```text
/// Original: "First paragraph.\n\nSecond paragraph."
/// Chunk 0:  "First paragraph.\n\n"   [0..18]
/// Chunk 1:  "Second paragraph."      [18..35]
/// ```
///
/// Joining every chunk's text in order gives back the original document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// The chunk text.
    pub text: String,
    /// Byte offset where this chunk starts in the original document.
    pub start: usize,
    /// Byte offset where this chunk ends (exclusive) in the original document.
    pub end: usize,
    /// Zero-based index of this chunk in the sequence.
    pub index: usize,
    /// Size of the chunk in the chunker's measurement unit.
    pub size: usize,
    /// The strategy whose split produced this chunk.
    ///
    /// `None` when the whole input already fit in a single chunk.
    pub split_by: Option<Boundary>,
}

impl Chunk {
    /// Create a new chunk.
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        start: usize,
        end: usize,
        index: usize,
        size: usize,
        split_by: Option<Boundary>,
    ) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            index,
            size,
            split_by,
        }
    }

    /// The length of this chunk in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether this chunk is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The byte span of this chunk in the original document.
    #[must_use]
    pub fn span(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

impl std::fmt::Display for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let split = self.split_by.map_or("whole", Boundary::name);
        write!(
            f,
            "Chunk {{ index: {}, span: {}..{}, size: {}, split: {} }}",
            self.index, self.start, self.end, self.size, split
        )
    }
}
