//! Tiered, strategy-escalating splitting.
//!
//! ## The Algorithm
//!
//! Given a limit of `100` and the strategies of [`Boundary::ALL`]:
//!
//! ```text
//! 1. Whole text <= 100?            -> one chunk, done
//! 2. Split on paragraph breaks, then pack consecutive pieces greedily
//!    while the packed slice stays <= 100
//! 3. Any packed chunk still > 100? -> repeat step 2 on that chunk alone
//!    with the next finer strategy (line, sentence, clause, whitespace)
//! 4. A strategy with no break point inside the chunk is skipped
//! 5. Character strategy            -> cut at the longest prefix <= 100
//! ```
//!
//! Escalation is local. A single oversized paragraph is broken into
//! sentences while its neighbours stay whole paragraphs.
//!
//! Every chunk is an exact slice of the input and chunks are contiguous, so
//! joining their text in order reproduces the document byte for byte.

use std::ops::Range;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::ChunkerConfig;
use crate::sizer::{ChunkSizer, SizeUnit};
use crate::{Boundary, Chunk, Chunker, Error, Result};

type Piece = (Range<usize>, Boundary);

/// Adaptive chunker that keeps chunks under a size limit while splitting on
/// the coarsest boundary that works.
///
/// ## Example
///
/// ```rust
/// use docslice::{Chunker, SizeUnit, TieredChunker};
///
/// let chunker = TieredChunker::new(40, SizeUnit::Characters).unwrap();
/// let text = "Paragraph one.\n\nParagraph two is longer and needs its own chunk.";
/// let chunks = chunker.chunk(text).unwrap();
///
/// assert!(chunks.iter().all(|c| c.size <= 40));
/// assert_eq!(chunks.iter().map(|c| c.text.as_str()).collect::<String>(), text);
/// ```
#[derive(Clone)]
pub struct TieredChunker {
    max_chunk_size: usize,
    sizer: Arc<dyn ChunkSizer>,
}

impl TieredChunker {
    /// Create a chunker with a limit in the given unit.
    ///
    /// # Arguments
    ///
    /// * `max_chunk_size` - Maximum chunk size, must be > 0
    /// * `unit` - What the limit counts
    pub fn new(max_chunk_size: usize, unit: SizeUnit) -> Result<Self> {
        Self::with_sizer(max_chunk_size, unit.sizer()?)
    }

    /// Create a chunker that measures chunks with a custom sizer.
    pub fn with_sizer(max_chunk_size: usize, sizer: Arc<dyn ChunkSizer>) -> Result<Self> {
        if max_chunk_size == 0 {
            return Err(Error::InvalidConfiguration(
                "max_chunk_size must be > 0".to_string(),
            ));
        }
        Ok(Self {
            max_chunk_size,
            sizer,
        })
    }

    /// Create a chunker from loaded configuration.
    pub fn from_config(config: &ChunkerConfig) -> Result<Self> {
        Self::new(config.max_chunk_size, config.unit)
    }

    /// The size limit.
    #[must_use]
    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// The unit the limit is expressed in.
    #[must_use]
    pub fn unit(&self) -> SizeUnit {
        self.sizer.unit()
    }

    fn fits(&self, text: &str) -> bool {
        self.sizer.size(text) <= self.max_chunk_size
    }

    /// Split `span` starting at `boundary`, skipping strategies that find no
    /// break point.
    fn split_recursive(
        &self,
        text: &str,
        span: Range<usize>,
        boundary: Boundary,
        out: &mut Vec<Piece>,
    ) {
        let segment = &text[span.clone()];
        let mut strategy = Some(boundary);

        while let Some(current) = strategy {
            let points = current.break_points(segment);
            if !points.is_empty() {
                self.pack(text, span.start, segment, &points, current, out);
                return;
            }
            trace!(strategy = %current, bytes = segment.len(), "no break point, escalating");
            strategy = current.finer();
        }

        self.force_split(text, span, out);
    }

    /// Greedily join consecutive pieces while the joined slice fits.
    ///
    /// Each chunk is found with [`Self::longest_fit`] over the piece ends, so
    /// a chunk of `k` pieces costs `O(log k)` measurements instead of `k`.
    fn pack(
        &self,
        text: &str,
        offset: usize,
        segment: &str,
        points: &[usize],
        boundary: Boundary,
        out: &mut Vec<Piece>,
    ) {
        let ends: Vec<usize> = points
            .iter()
            .copied()
            .chain(std::iter::once(segment.len()))
            .collect();

        let mut start = 0;
        let mut first = 0;
        while first < ends.len() {
            let last = self.longest_fit(segment, start, &ends, first);
            self.emit(text, offset + start..offset + ends[last], boundary, out);
            start = ends[last];
            first = last + 1;
        }
    }

    fn emit(&self, text: &str, span: Range<usize>, boundary: Boundary, out: &mut Vec<Piece>) {
        if self.fits(&text[span.clone()]) {
            out.push((span, boundary));
            return;
        }
        match boundary.finer() {
            Some(finer) => self.split_recursive(text, span, finer, out),
            None => self.force_split(text, span, out),
        }
    }

    /// Cut at character boundaries, taking the longest prefix that fits each
    /// time.
    fn force_split(&self, text: &str, span: Range<usize>, out: &mut Vec<Piece>) {
        let segment = &text[span.clone()];
        let ends: Vec<usize> = segment
            .char_indices()
            .map(|(i, c)| i + c.len_utf8())
            .collect();

        let mut start = 0;
        let mut first = 0;
        while first < ends.len() {
            let last = self.longest_fit(segment, start, &ends, first);
            out.push((span.start + start..span.start + ends[last], Boundary::Character));
            start = ends[last];
            first = last + 1;
        }
    }

    /// Index into `ends` of the longest prefix of `segment[start..]` that
    /// fits. Never less than `first`: a piece that does not fit on its own
    /// is still taken alone.
    fn longest_fit(&self, segment: &str, start: usize, ends: &[usize], first: usize) -> usize {
        let fits = |last: usize| self.fits(&segment[start..ends[last]]);
        if !fits(first) {
            return first;
        }

        // Gallop to bracket the answer, then bisect.
        let mut good = first;
        let mut step = 1;
        let mut bad = loop {
            let probe = good + step;
            if probe >= ends.len() {
                break ends.len();
            }
            if fits(probe) {
                good = probe;
                step *= 2;
            } else {
                break probe;
            }
        };

        while bad - good > 1 {
            let mid = good + (bad - good) / 2;
            if fits(mid) {
                good = mid;
            } else {
                bad = mid;
            }
        }
        good
    }
}

impl std::fmt::Debug for TieredChunker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredChunker")
            .field("max_chunk_size", &self.max_chunk_size)
            .field("unit", &self.unit())
            .finish()
    }
}

impl Chunker for TieredChunker {
    fn chunk(&self, text: &str) -> Result<Vec<Chunk>> {
        if text.is_empty() {
            return Err(Error::EmptyInput);
        }

        let size = self.sizer.size(text);
        if size <= self.max_chunk_size {
            return Ok(vec![Chunk::new(text, 0, text.len(), 0, size, None)]);
        }

        let mut pieces = Vec::with_capacity(self.estimate_chunks(text.len()));
        self.split_recursive(text, 0..text.len(), Boundary::COARSEST, &mut pieces);

        let chunks: Vec<Chunk> = pieces
            .into_iter()
            .enumerate()
            .map(|(index, (span, boundary))| {
                let piece = &text[span.clone()];
                Chunk::new(
                    piece,
                    span.start,
                    span.end,
                    index,
                    self.sizer.size(piece),
                    Some(boundary),
                )
            })
            .collect();

        debug!(
            chunks = chunks.len(),
            size,
            max_chunk_size = self.max_chunk_size,
            unit = %self.unit(),
            "chunked text"
        );

        Ok(chunks)
    }

    fn estimate_chunks(&self, text_len: usize) -> usize {
        let per_chunk = match self.unit() {
            SizeUnit::Characters => self.max_chunk_size,
            // ~4 bytes per token for English prose
            SizeUnit::Tokens => self.max_chunk_size.saturating_mul(4),
        };
        text_len.div_ceil(per_chunk).max(1)
    }
}
