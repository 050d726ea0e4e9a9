//! Worked scenarios for tiered chunking.
//!
//! Each test pins down the exact chunk layout for a small, hand-built
//! document so regressions in packing or escalation show up as diffs.

use docslice::{chunk, Boundary, Chunk, Chunker, Error, SizeUnit, TieredChunker};

fn chars(max: usize) -> TieredChunker {
    TieredChunker::new(max, SizeUnit::Characters).unwrap()
}

/// `len` characters of lowercase words, no trailing space.
fn words(len: usize) -> String {
    let mut text = "market ".repeat(len / 7 + 1);
    text.truncate(len);
    if text.ends_with(' ') {
        text.pop();
        text.push('s');
    }
    text
}

fn joined(chunks: &[Chunk]) -> String {
    chunks.iter().map(|c| c.text.as_str()).collect()
}

// =============================================================================
// Paragraphs
// =============================================================================

#[test]
fn three_paragraphs_become_three_chunks() {
    let text = format!("{}\n\n{}\n\n{}", words(80), words(80), words(86));
    assert_eq!(text.chars().count(), 250);

    let chunks = chars(100).chunk(&text).unwrap();

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].text, format!("{}\n\n", words(80)));
    assert_eq!(chunks[1].text, format!("{}\n\n", words(80)));
    assert_eq!(chunks[2].text, words(86));
    for chunk in &chunks {
        assert!(chunk.size <= 100);
        assert_eq!(chunk.split_by, Some(Boundary::Paragraph));
    }
    assert_eq!(joined(&chunks), text);
}

#[test]
fn small_paragraphs_share_a_chunk() {
    let text = format!("{}\n\n{}\n\n{}", words(30), words(30), words(80));
    let chunks = chars(100).chunk(&text).unwrap();

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].text, format!("{}\n\n{}\n\n", words(30), words(30)));
    assert_eq!(chunks[1].text, words(80));
}

// =============================================================================
// Forced cuts
// =============================================================================

#[test]
fn single_long_word_is_cut_evenly() {
    let text = "q".repeat(500);
    let chunks = chars(100).chunk(&text).unwrap();

    assert_eq!(chunks.len(), 5);
    for chunk in &chunks {
        assert_eq!(chunk.size, 100);
        assert_eq!(chunk.split_by, Some(Boundary::Character));
    }
}

#[test]
fn long_word_last_chunk_may_be_shorter() {
    let text = "q".repeat(530);
    let chunks = chars(100).chunk(&text).unwrap();

    assert_eq!(chunks.len(), 6);
    assert_eq!(chunks[5].size, 30);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn empty_input_is_an_error() {
    assert!(matches!(chars(100).chunk(""), Err(Error::EmptyInput)));
    assert!(matches!(chunk("", 100, SizeUnit::Characters), Err(Error::EmptyInput)));
}

#[test]
fn zero_limit_is_an_error() {
    let err = TieredChunker::new(0, SizeUnit::Characters).unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration(_)));
    assert!(matches!(
        chunk("some text", 0, SizeUnit::Characters),
        Err(Error::InvalidConfiguration(_))
    ));
}

#[test]
fn errors_have_distinct_messages() {
    let empty = chars(10).chunk("").unwrap_err().to_string();
    let config = TieredChunker::new(0, SizeUnit::Characters)
        .unwrap_err()
        .to_string();
    assert_ne!(empty, config);
    assert!(empty.contains("empty"));
}

// =============================================================================
// Mixed sentences
// =============================================================================

#[test]
fn long_sentence_fragments_while_short_ones_pack() {
    let long = format!("{}.", "datacenter ".repeat(27).trim_end());
    let short = ["Sentence number 01.", "Sentence number 02.", "Sentence number 03."];
    let text = format!("{long} {}", short.join(" "));
    assert!(long.chars().count() > 290);

    let chunks = chars(100).chunk(&text).unwrap();
    let (last, fragments) = chunks.split_last().unwrap();

    // The three short sentences stay together.
    assert_eq!(last.text, short.join(" "));
    assert_eq!(last.split_by, Some(Boundary::Sentence));

    // The long sentence was broken below sentence level.
    assert!(fragments.len() >= 3);
    for fragment in fragments {
        assert!(fragment.size <= 100);
        assert!(fragment.split_by > Some(Boundary::Sentence));
    }
    assert_eq!(joined(&chunks), text);
}

#[test]
fn clauses_are_preferred_over_words() {
    let text = "revenue rose in the cloud segment, \
                operating costs fell across every region, \
                and the board approved a larger buyback";
    let chunks = chars(50).chunk(text).unwrap();

    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "revenue rose in the cloud segment, ",
            "operating costs fell across every region, ",
            "and the board approved a larger buyback",
        ]
    );
    assert!(chunks.iter().all(|c| c.split_by == Some(Boundary::Clause)));
}

#[test]
fn lines_are_tried_before_sentences() {
    let text = "Header line\nFirst item. Second item.\nThird line here";
    let chunks = chars(30).chunk(text).unwrap();

    assert_eq!(chunks[0].text, "Header line\n");
    assert_eq!(chunks[0].split_by, Some(Boundary::Line));
    assert_eq!(joined(&chunks), text);
}

// =============================================================================
// Edge cases
// =============================================================================

#[test]
fn whitespace_only_input_is_chunked() {
    let text = " ".repeat(25);
    let chunks = chars(10).chunk(&text).unwrap();

    assert_eq!(chunks.len(), 3);
    assert_eq!(joined(&chunks), text);
}

#[test]
fn text_equal_to_limit_is_one_chunk() {
    let text = "Exactly fifty characters in this string, not more.";
    assert_eq!(text.chars().count(), 50);

    let chunks = chars(50).chunk(text).unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, text);
    assert_eq!(chunks[0].split_by, None);
}

#[test]
fn offsets_point_into_source() {
    let text = "Alpha beta.\n\nGamma delta, epsilon zeta.\nEta theta iota kappa lambda mu.";

    for max in [5, 12, 20, 40] {
        let chunks = chars(max).chunk(text).unwrap();
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert_eq!(&text[chunk.span()], chunk.text);
        }
        for pair in chunks.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }
}
