//! End-to-end tests for extract, chunk, highlight.

use std::collections::HashMap;
use std::fs;
use std::sync::Mutex;

use docslice::{
    get_highlights_from_file, Document, Error, ExtractionError, FsExtractor, Highlight,
    HighlightsClient, HighlightsError, SimulatedHighlights, SizeUnit, TextExtractor, TieredChunker,
};

// =============================================================================
// Fakes
// =============================================================================

struct MemoryExtractor {
    files: HashMap<String, String>,
}

impl MemoryExtractor {
    fn with(id: &str, text: &str) -> Self {
        let mut files = HashMap::new();
        files.insert(id.to_string(), text.to_string());
        Self { files }
    }
}

impl TextExtractor for MemoryExtractor {
    fn extract_text(&self, file_id: &str) -> Result<Document, ExtractionError> {
        let text = self
            .files
            .get(file_id)
            .ok_or_else(|| ExtractionError::NotFound {
                file_id: file_id.to_string(),
            })?;
        Ok(Document {
            id: file_id.to_string(),
            name: format!("{file_id}.txt"),
            text: text.clone(),
        })
    }
}

/// Scores chunks by how often the query occurs in them and remembers what
/// it was sent.
#[derive(Default)]
struct RecordingClient {
    calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingClient {
    fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl HighlightsClient for RecordingClient {
    fn request_highlights(
        &self,
        chunks: &[String],
        query: &str,
    ) -> Result<Vec<Highlight>, HighlightsError> {
        self.calls.lock().unwrap().push(chunks.to_vec());

        let mut highlights: Vec<Highlight> = chunks
            .iter()
            .enumerate()
            .filter_map(|(i, chunk)| {
                let hits = chunk.matches(query).count();
                (hits > 0).then(|| Highlight {
                    text: chunk.clone(),
                    relevance: hits as f64,
                    chunk_index: i,
                })
            })
            .collect();
        docslice::rank(&mut highlights);
        Ok(highlights)
    }
}

fn chunker(max: usize) -> TieredChunker {
    TieredChunker::new(max, SizeUnit::Characters).unwrap()
}

const REPORT: &str = "Quarterly results were strong.\n\n\
    Datacenter revenue doubled. Datacenter margins widened. Datacenter capex rose.\n\n\
    Consumer revenue was flat.\n\n\
    Guidance for datacenter growth was raised.";

// =============================================================================
// Pipeline
// =============================================================================

#[test]
fn chunks_are_sent_in_order_and_within_limit() {
    let extractor = MemoryExtractor::with("q3", REPORT);
    let client = RecordingClient::default();

    let report =
        get_highlights_from_file(&extractor, &chunker(60), &client, "q3", "Datacenter", 5).unwrap();

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    let sent = &calls[0];
    assert_eq!(sent.len(), report.chunk_count);
    assert!(sent.iter().all(|c| c.chars().count() <= 60));
    assert_eq!(sent.concat(), REPORT);
}

#[test]
fn highlights_are_ranked_and_truncated() {
    let extractor = MemoryExtractor::with("q3", REPORT);
    let client = RecordingClient::default();

    let report =
        get_highlights_from_file(&extractor, &chunker(40), &client, "q3", "Datacenter", 2).unwrap();

    assert_eq!(report.highlights.len(), 2);
    assert!(report.highlights[0].relevance >= report.highlights[1].relevance);
    assert!(report.highlights.iter().all(|h| h.text.contains("Datacenter")));
    assert_eq!(report.file_name, "q3.txt");
    assert_eq!(report.query, "Datacenter");
}

#[test]
fn no_matches_gives_empty_report() {
    let extractor = MemoryExtractor::with("q3", REPORT);
    let client = RecordingClient::default();

    let report =
        get_highlights_from_file(&extractor, &chunker(60), &client, "q3", "spaceships", 5).unwrap();

    assert!(report.highlights.is_empty());
    assert!(report.to_string().starts_with("No relevant highlights found in file q3.txt"));
}

#[test]
fn extraction_failure_skips_chunking_and_highlighting() {
    let extractor = MemoryExtractor::with("q3", REPORT);
    let client = RecordingClient::default();

    let err =
        get_highlights_from_file(&extractor, &chunker(60), &client, "missing", "revenue", 5)
            .unwrap_err();

    assert!(matches!(err, Error::Extraction(ExtractionError::NotFound { .. })));
    assert!(client.calls().is_empty());
}

#[test]
fn empty_document_is_a_chunking_error() {
    let extractor = MemoryExtractor::with("blank", "");
    let client = RecordingClient::default();

    let err = get_highlights_from_file(&extractor, &chunker(60), &client, "blank", "revenue", 5)
        .unwrap_err();

    assert!(matches!(err, Error::EmptyInput));
    assert!(client.calls().is_empty());
}

#[test]
fn client_errors_propagate() {
    let extractor = MemoryExtractor::with("q3", REPORT);

    let err =
        get_highlights_from_file(&extractor, &chunker(60), &SimulatedHighlights, "q3", "  ", 5)
            .unwrap_err();

    assert!(matches!(err, Error::Highlights(HighlightsError::EmptyQuery)));
}

// =============================================================================
// Filesystem
// =============================================================================

#[test]
fn filesystem_document_with_simulated_highlights() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("report.txt"), REPORT).unwrap();

    let extractor = FsExtractor::new(dir.path());
    let report = get_highlights_from_file(
        &extractor,
        &chunker(50),
        &SimulatedHighlights,
        "report.txt",
        "datacenter",
        3,
    )
    .unwrap();

    assert_eq!(report.file_id, "report.txt");
    assert_eq!(report.file_name, "report.txt");
    assert!(report.chunk_count > 3);
    assert_eq!(report.highlights.len(), 3);
    assert!((report.highlights[0].relevance - 0.95).abs() < 1e-9);

    let rendered = report.to_string();
    let header = "Highlights from report.txt (ID: report.txt) for query: datacenter\n\n";
    assert!(rendered.starts_with(&format!("{header}1. ")));
    assert!(rendered.contains("\n3. "));
}

#[test]
fn normalized_extraction_collapses_whitespace() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("scan.txt"), "Page   one\n\n\n  text\tcontinues").unwrap();

    let document = FsExtractor::new(dir.path())
        .normalized(true)
        .extract_text("scan.txt")
        .unwrap();

    assert!(!document.text.contains("  "));
    assert!(document.text.contains("Page one"));
}
