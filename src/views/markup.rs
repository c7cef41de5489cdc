//! Marked text
//!
//! Render model for highlighted document text: the original text split
//! into runs, each carrying the number of active conditions that matched
//! it. Overlapping matches stack: a run matched by two conditions has a
//! mark count of 2, never a deduplicated 1.

use serde::Serialize;

/// One run of text with a uniform mark count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    text: String,
    marks: usize,
}

impl Span {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of conditions whose match covers this run.
    pub fn marks(&self) -> usize {
        self.marks
    }
}

/// A document field split into marked runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Markup(Vec<Span>);

impl Markup {
    /// Unmarked text as a single run. Empty text yields no runs.
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            Markup(Vec::new())
        } else {
            Markup(vec![Span { text, marks: 0 }])
        }
    }

    /// Splits `text` into maximal runs of equal coverage. `coverage`
    /// holds one match count per byte of `text`; run boundaries always
    /// fall on match boundaries, which are char boundaries.
    pub(crate) fn from_coverage(text: &str, coverage: &[usize]) -> Self {
        debug_assert_eq!(text.len(), coverage.len());
        let mut spans = Vec::new();
        let mut start = 0;
        while start < text.len() {
            let marks = coverage[start];
            let mut end = start + 1;
            while end < text.len() && coverage[end] == marks {
                end += 1;
            }
            spans.push(Span {
                text: text[start..end].to_string(),
                marks,
            });
            start = end;
        }
        Markup(spans)
    }

    pub fn spans(&self) -> &[Span] {
        &self.0
    }

    /// Reassembled text without marks.
    pub fn plain_text(&self) -> String {
        self.0.iter().map(|span| span.text.as_str()).collect()
    }

    pub fn has_marks(&self) -> bool {
        self.0.iter().any(|span| span.marks > 0)
    }
}
