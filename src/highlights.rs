//! Client side of the highlighting service.
//!
//! The service takes a query plus an ordered list of chunk texts and
//! returns the passages most relevant to the query, each with a score.
//!
//! ## Wire Format
//!
//! ```text
//! POST {endpoint}
//! X-API-Key: {key}
//!
//! { "query": "...", "chunk_txts": ["...", "..."], "top_n": 10, "true_order": true }
//!
//! 200 OK
//! { "results": [ { "chunk_txt": "...", "chunk_score": 0.83, "original_index": 1 } ] }
//! ```
//!
//! Large documents are sent in several requests so that no payload carries
//! more than `max_payload_chars` characters of chunk text. Results from all
//! batches are merged and ranked by score, highest first.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A passage the service judged relevant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    /// The highlighted text.
    pub text: String,
    /// Relevance score; higher is more relevant.
    pub relevance: f64,
    /// Position of the source chunk in the submitted sequence.
    pub chunk_index: usize,
}

/// Errors from the highlighting service.
#[derive(Debug, thiserror::Error)]
pub enum HighlightsError {
    /// The query was empty or whitespace.
    #[error("highlight query must not be empty")]
    EmptyQuery,

    /// No API key is configured for a client that needs one.
    #[error("highlights API key is not configured")]
    MissingApiKey,

    /// The service answered with a non-success status.
    #[error("highlights service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The request never got a response.
    #[error("highlights request failed: {0}")]
    Transport(String),

    /// The response body was not the expected JSON.
    #[error("could not decode highlights response: {0}")]
    Decode(String),
}

/// Request body sent to the service.
#[derive(Debug, Clone, Serialize)]
pub struct HighlightRequest<'a> {
    /// What to look for.
    pub query: &'a str,
    /// Chunk texts, in document order.
    pub chunk_txts: &'a [String],
    /// Number of highlights to return.
    pub top_n: usize,
    /// Ask the service to keep results tied to their input order.
    pub true_order: bool,
}

impl<'a> HighlightRequest<'a> {
    /// Build a request for `chunks`.
    #[must_use]
    pub fn new(query: &'a str, chunks: &'a [String], top_n: usize) -> Self {
        Self {
            query,
            chunk_txts: chunks,
            top_n,
            true_order: true,
        }
    }
}

/// Response body returned by the service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HighlightResponse {
    /// Returned passages.
    #[serde(default)]
    pub results: Vec<HighlightResult>,
}

/// One passage in a [`HighlightResponse`].
#[derive(Debug, Clone, Deserialize)]
pub struct HighlightResult {
    /// Passage text.
    pub chunk_txt: String,
    /// Relevance score.
    pub chunk_score: f64,
    /// Index of the chunk within the request.
    #[serde(default)]
    pub original_index: usize,
}

impl HighlightResponse {
    /// Interpret a raw HTTP reply: anything but `200` is a
    /// [`HighlightsError::Status`], and a `200` body that is not a response
    /// object is a [`HighlightsError::Decode`].
    ///
    /// ```rust
    /// use docslice::{HighlightResponse, HighlightsError};
    ///
    /// let ok = HighlightResponse::from_http(200, r#"{"results": []}"#).unwrap();
    /// assert!(ok.results.is_empty());
    ///
    /// let err = HighlightResponse::from_http(401, "bad key").unwrap_err();
    /// assert!(matches!(err, HighlightsError::Status { status: 401, .. }));
    /// ```
    pub fn from_http(status: u16, body: &str) -> Result<Self, HighlightsError> {
        if status != 200 {
            return Err(HighlightsError::Status {
                status,
                body: body.to_string(),
            });
        }
        serde_json::from_str(body).map_err(|e| HighlightsError::Decode(e.to_string()))
    }

    /// Convert to highlights, shifting chunk indices by `offset` (the
    /// position of the request's first chunk in the full sequence).
    #[must_use]
    pub fn into_highlights(self, offset: usize) -> Vec<Highlight> {
        self.results
            .into_iter()
            .map(|r| Highlight {
                text: r.chunk_txt,
                relevance: r.chunk_score,
                chunk_index: offset + r.original_index,
            })
            .collect()
    }
}

/// A highlighting backend.
pub trait HighlightsClient: Send + Sync {
    /// Find the passages of `chunks` most relevant to `query`, ranked by
    /// relevance, highest first.
    fn request_highlights(
        &self,
        chunks: &[String],
        query: &str,
    ) -> Result<Vec<Highlight>, HighlightsError>;
}

/// Group consecutive chunks into batches of at most `max_payload_chars`
/// characters. A chunk larger than the limit gets a batch of its own.
///
/// ```rust
/// use docslice::batch_ranges;
///
/// let chunks: Vec<String> = ["aaaa", "bb", "cccccc", "d"].map(String::from).to_vec();
/// assert_eq!(batch_ranges(&chunks, 6), vec![0..2, 2..3, 3..4]);
/// ```
#[must_use]
pub fn batch_ranges(chunks: &[String], max_payload_chars: usize) -> Vec<Range<usize>> {
    let mut batches = Vec::new();
    let mut start = 0;
    let mut total = 0;

    for (i, chunk) in chunks.iter().enumerate() {
        let size = chunk.chars().count();
        if i > start && total + size > max_payload_chars {
            batches.push(start..i);
            start = i;
            total = 0;
        }
        total += size;
    }

    if start < chunks.len() {
        batches.push(start..chunks.len());
    }
    batches
}

/// Sort by relevance, highest first. Equal scores keep their order.
pub fn rank(highlights: &mut [Highlight]) {
    highlights.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
}

/// Send `chunks` batch by batch through `send`, then merge and rank.
///
/// This is the batching and aggregation every network client needs;
/// `send` only has to perform one request.
pub fn request_in_batches<F>(
    chunks: &[String],
    max_payload_chars: usize,
    mut send: F,
) -> Result<Vec<Highlight>, HighlightsError>
where
    F: FnMut(&[String]) -> Result<HighlightResponse, HighlightsError>,
{
    let mut highlights = Vec::new();
    for range in batch_ranges(chunks, max_payload_chars) {
        let offset = range.start;
        let response = send(&chunks[range])?;
        highlights.extend(response.into_highlights(offset));
    }
    rank(&mut highlights);
    Ok(highlights)
}

fn check_query(query: &str) -> Result<(), HighlightsError> {
    if query.trim().is_empty() {
        Err(HighlightsError::EmptyQuery)
    } else {
        Ok(())
    }
}

/// Offline stand-in used when no API key is configured.
///
/// Returns placeholder highlights for up to the first five chunks with
/// scores 0.95, 0.90, ... so the rest of the pipeline can run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedHighlights;

impl HighlightsClient for SimulatedHighlights {
    fn request_highlights(
        &self,
        chunks: &[String],
        query: &str,
    ) -> Result<Vec<Highlight>, HighlightsError> {
        check_query(query)?;
        warn!("using simulated highlights, no API key configured");

        Ok((0..chunks.len().min(5))
            .map(|i| Highlight {
                text: format!("Simulated highlight for query: {query} (chunk {i})"),
                relevance: 0.95 - 0.05 * i as f64,
                chunk_index: i,
            })
            .collect())
    }
}

#[cfg(feature = "http")]
pub use http::HttpHighlightsClient;

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use reqwest::blocking::Client;
    use tracing::debug;

    use super::{
        check_query, request_in_batches, Highlight, HighlightRequest, HighlightResponse,
        HighlightsClient, HighlightsError,
    };
    use crate::config::HighlightsConfig;

    /// Blocking HTTP client for the highlighting service. No retries.
    #[derive(Debug, Clone)]
    pub struct HttpHighlightsClient {
        client: Client,
        api_key: String,
        endpoint: String,
        top_n: usize,
        max_payload_chars: usize,
    }

    impl HttpHighlightsClient {
        /// Build a client from configuration. Fails without an API key.
        pub fn new(config: &HighlightsConfig) -> Result<Self, HighlightsError> {
            let api_key = config
                .api_key
                .clone()
                .ok_or(HighlightsError::MissingApiKey)?;
            let client = Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .map_err(|e| HighlightsError::Transport(e.to_string()))?;

            Ok(Self {
                client,
                api_key,
                endpoint: config.endpoint.clone(),
                top_n: config.top_n,
                max_payload_chars: config.max_payload_chars,
            })
        }

        fn send(
            &self,
            chunks: &[String],
            query: &str,
        ) -> Result<HighlightResponse, HighlightsError> {
            debug!(chunks = chunks.len(), query, "sending highlights request");
            let response = self
                .client
                .post(&self.endpoint)
                .header("X-API-Key", &self.api_key)
                .json(&HighlightRequest::new(query, chunks, self.top_n))
                .send()
                .map_err(|e| HighlightsError::Transport(e.to_string()))?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .map_err(|e| HighlightsError::Transport(e.to_string()))?;
            HighlightResponse::from_http(status, &body)
        }
    }

    impl HighlightsClient for HttpHighlightsClient {
        fn request_highlights(
            &self,
            chunks: &[String],
            query: &str,
        ) -> Result<Vec<Highlight>, HighlightsError> {
            check_query(query)?;
            request_in_batches(chunks, self.max_payload_chars, |batch| self.send(batch, query))
        }
    }
}
