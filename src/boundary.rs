//! Split strategies, coarsest to finest.
//!
//! Each strategy is a pure function from text to candidate break points:
//! byte offsets where a chunk may end. A break point always sits *after*
//! the separator that justifies it, so the separator stays with the text
//! before it.
//!
//! ```text
//! Paragraph   "One.\n\n|Two."        after a blank-line run
//! Line        "One.\n|Two."          after each newline
//! Sentence    "One. |Two."           after each UAX #29 sentence
//! Clause      "one, |two"            after , ; : and the whitespace that follows
//! Whitespace  "one |two"             after each whitespace run
//! Character   "onetw|o"              fixed cut, no break points
//! ```
//!
//! Only offsets strictly inside the text are reported. A strategy that finds
//! none makes no progress, and the chunker moves on to the next one.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

static PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n(?:[ \t]*\r?\n)+").expect("paragraph pattern is valid"));

static CLAUSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,;:]\s+").expect("clause pattern is valid"));

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// A class of break point, ordered from coarsest to finest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    /// Blank lines between paragraphs.
    Paragraph,
    /// Single line breaks.
    Line,
    /// Sentence ends, per Unicode sentence segmentation.
    Sentence,
    /// Commas, semicolons and colons followed by whitespace.
    Clause,
    /// Any whitespace run.
    Whitespace,
    /// A straight cut at the size limit. Always succeeds.
    Character,
}

impl Boundary {
    /// Every strategy in escalation order.
    pub const ALL: [Self; 6] = [
        Self::Paragraph,
        Self::Line,
        Self::Sentence,
        Self::Clause,
        Self::Whitespace,
        Self::Character,
    ];

    /// The coarsest strategy, where chunking starts.
    pub const COARSEST: Self = Self::Paragraph;

    /// The next finer strategy, or `None` after [`Boundary::Character`].
    #[must_use]
    pub const fn finer(self) -> Option<Self> {
        match self {
            Self::Paragraph => Some(Self::Line),
            Self::Line => Some(Self::Sentence),
            Self::Sentence => Some(Self::Clause),
            Self::Clause => Some(Self::Whitespace),
            Self::Whitespace => Some(Self::Character),
            Self::Character => None,
        }
    }

    /// Short lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Line => "line",
            Self::Sentence => "sentence",
            Self::Clause => "clause",
            Self::Whitespace => "whitespace",
            Self::Character => "character",
        }
    }

    /// Candidate break points in `text`, ascending, strictly between `0`
    /// and `text.len()`.
    ///
    /// [`Boundary::Character`] has no semantic break points and always
    /// returns an empty list; the chunker cuts by size instead.
    ///
    /// ```rust
    /// use docslice::Boundary;
    ///
    /// let text = "One.\n\nTwo, three.";
    /// assert_eq!(Boundary::Paragraph.break_points(text), vec![6]);
    /// assert_eq!(Boundary::Clause.break_points(text), vec![11]);
    /// ```
    #[must_use]
    pub fn break_points(self, text: &str) -> Vec<usize> {
        let points = match self {
            Self::Paragraph => match_ends(&PARAGRAPH, text),
            Self::Line => text.match_indices('\n').map(|(i, _)| i + 1).collect(),
            Self::Sentence => text
                .split_sentence_bound_indices()
                .map(|(i, _)| i)
                .collect(),
            Self::Clause => match_ends(&CLAUSE, text),
            Self::Whitespace => match_ends(&WHITESPACE, text),
            Self::Character => Vec::new(),
        };

        points
            .into_iter()
            .filter(|&p| p > 0 && p < text.len())
            .collect()
    }
}

impl std::fmt::Display for Boundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn match_ends(pattern: &Regex, text: &str) -> Vec<usize> {
    pattern.find_iter(text).map(|m| m.end()).collect()
}
