//! Condition-driven text highlighting
//!
//! Token-containment conditions mark their token wherever it appears in
//! a document field: case-insensitive, with the feature name's
//! underscores restored to spaces. Equality and membership conditions
//! describe document-level properties and never mark text.
//!
//! Every pattern scans the full original text independently, so two
//! conditions matching the same region stack their marks.

use regex::{Regex, RegexBuilder};

use crate::rules::{Condition, Sign};

use super::markup::Markup;

/// Compiled highlight patterns for one active condition list.
#[derive(Debug, Default)]
pub struct HighlightSet {
    patterns: Vec<Regex>,
}

impl HighlightSet {
    /// Compiles one pattern per containment condition. The token is
    /// matched literally; metacharacters in feature names are escaped.
    pub fn from_conditions(conditions: &[Condition]) -> Self {
        let patterns = conditions
            .iter()
            .filter(|cond| cond.sign() == Sign::Contains)
            .filter_map(|cond| {
                let token = cond.feature().replace('_', " ");
                RegexBuilder::new(&regex::escape(&token))
                    .case_insensitive(true)
                    .build()
                    .ok()
            })
            .collect();
        HighlightSet { patterns }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Marks every match of every pattern over `text`.
    pub fn apply(&self, text: &str) -> Markup {
        if self.patterns.is_empty() {
            return Markup::plain(text);
        }
        let mut coverage = vec![0usize; text.len()];
        for pattern in &self.patterns {
            for matched in pattern.find_iter(text) {
                for slot in &mut coverage[matched.range()] {
                    *slot += 1;
                }
            }
        }
        Markup::from_coverage(text, &coverage)
    }
}
