//! Document view
//!
//! Shows the documents of the inspected subpopulation, misclassified
//! ones first, each rendered through the dataset's card renderer with
//! the active conditions highlighted. Alongside the cards it aggregates
//! the response's per-document SHAP attributions into a token polarity
//! summary for a selectable output label.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::backend::DocumentShap;
use crate::dataset::DatasetBundle;
use crate::rules::Condition;

use super::highlight::HighlightSet;
use super::renderers::{renderer_for, DocumentCard, DocumentRenderer};

/// Aggregated SHAP polarity counts for one display token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPolarity {
    token: String,
    positive: u32,
    negative: u32,
}

impl TokenPolarity {
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Documents where this token pushed toward the selected label.
    pub fn positive(&self) -> u32 {
        self.positive
    }

    /// Documents where this token pushed away from the selected label.
    pub fn negative(&self) -> u32 {
        self.negative
    }
}

/// The document view's state: the shown subpopulation plus the SHAP
/// payload that came with it.
pub struct DocumentView {
    bundle: Arc<DatasetBundle>,
    renderer: Box<dyn DocumentRenderer + Send + Sync>,
    doc_list: Vec<u32>,
    highlight: HighlightSet,
    shap: Vec<DocumentShap>,
    shap_label: usize,
    context: Option<String>,
}

impl DocumentView {
    pub fn new(bundle: Arc<DatasetBundle>) -> Self {
        let renderer = renderer_for(bundle.descriptor().doc_kind);
        Self {
            bundle,
            renderer,
            doc_list: Vec::new(),
            highlight: HighlightSet::default(),
            shap: Vec::new(),
            shap_label: 0,
            context: None,
        }
    }

    /// Applies an inspection result. The document list is reordered
    /// errors-first with the backend's order preserved within each
    /// group; the conditions drive card highlighting.
    pub fn show(
        &mut self,
        mut doc_list: Vec<u32>,
        conditions: &[Condition],
        shap: Vec<DocumentShap>,
        context: impl Into<String>,
    ) {
        doc_list.sort_by_key(|&index| !self.bundle.is_error(index as usize).unwrap_or(false));
        self.doc_list = doc_list;
        self.highlight = HighlightSet::from_conditions(conditions);
        self.shap = shap;
        self.shap_label = 0;
        self.context = Some(context.into());
    }

    /// Returns the view to its empty state.
    pub fn clear(&mut self) {
        self.doc_list.clear();
        self.highlight = HighlightSet::default();
        self.shap.clear();
        self.shap_label = 0;
        self.context = None;
    }

    /// Header label of the shown subpopulation ("Rule 3", "Edited rule").
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn doc_list(&self) -> &[u32] {
        &self.doc_list
    }

    pub fn doc_count(&self) -> usize {
        self.doc_list.len()
    }

    /// Misclassified documents among the shown ones.
    pub fn error_count(&self) -> usize {
        self.doc_list
            .iter()
            .filter(|&&index| self.bundle.is_error(index as usize).unwrap_or(false))
            .count()
    }

    /// Rendered cards in display order. Indices the loaded dataset does
    /// not know are skipped.
    pub fn cards(&self) -> Vec<DocumentCard> {
        self.doc_list
            .iter()
            .filter_map(|&index| {
                let document = self.bundle.document(index as usize)?;
                let output = self.bundle.output(index as usize)?;
                Some(self.renderer.render(
                    document,
                    output,
                    self.bundle.descriptor(),
                    &self.highlight,
                ))
            })
            .collect()
    }

    /// Output labels selectable for the SHAP summary.
    pub fn shap_labels(&self) -> &[String] {
        &self.bundle.descriptor().labels
    }

    pub fn shap_label(&self) -> usize {
        self.shap_label
    }

    /// Switches the SHAP summary to another output label; unknown
    /// indices are ignored.
    pub fn set_shap_label(&mut self, index: usize) {
        if index < self.bundle.descriptor().labels.len() {
            self.shap_label = index;
        }
    }

    /// Token polarity counts for the selected label, aggregated over the
    /// shown documents. Tokens keep first-seen order before the final
    /// sort, which ranks by the dominant polarity: when positive pushes
    /// outweigh negative ones overall, by positive count descending with
    /// negative as tie-break, and the mirror otherwise. The tokenizer's
    /// leading `Ġ` word marker is stripped for display after counting,
    /// so a marked and an unmarked spelling stay separate entries.
    pub fn shap_summary(&self) -> Vec<TokenPolarity> {
        let mut slots: HashMap<String, usize> = HashMap::new();
        let mut counts: Vec<(String, u32, u32)> = Vec::new();
        for doc_shap in &self.shap {
            let Some(tokens) = doc_shap.get(self.shap_label) else {
                continue;
            };
            for item in tokens {
                let slot = *slots.entry(item.token.clone()).or_insert_with(|| {
                    counts.push((item.token.clone(), 0, 0));
                    counts.len() - 1
                });
                if item.val < 0.0 {
                    counts[slot].2 += 1;
                } else {
                    counts[slot].1 += 1;
                }
            }
        }

        let mut rows: Vec<TokenPolarity> = counts
            .into_iter()
            .map(|(token, positive, negative)| {
                let display = token
                    .strip_prefix('Ġ')
                    .map(str::to_string)
                    .unwrap_or(token);
                TokenPolarity {
                    token: display,
                    positive,
                    negative,
                }
            })
            .collect();

        let positive_max = rows.iter().map(|r| r.positive).max().unwrap_or(0);
        let negative_max = rows.iter().map(|r| r.negative).max().unwrap_or(0);
        if positive_max > negative_max {
            rows.sort_by(|a, b| {
                b.positive
                    .cmp(&a.positive)
                    .then(b.negative.cmp(&a.negative))
            });
        } else {
            rows.sort_by(|a, b| {
                b.negative
                    .cmp(&a.negative)
                    .then(b.positive.cmp(&a.positive))
            });
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{OrderedMap, TokenShap};
    use crate::dataset::{DatasetDescriptor, Document, ModelOutput, ProjectionPoint};
    use crate::rules::RuleSet;

    fn bundle() -> Arc<DatasetBundle> {
        let descriptor = DatasetDescriptor::from_json(
            r#"{
                "name": "twitter",
                "doc_kind": "sentiment",
                "model_name": "twitter-roberta-base-sentiment",
                "accuracy": 0.7,
                "labels": ["negative", "neutral", "positive"]
            }"#,
        )
        .unwrap();
        let documents = vec![
            Document::from_value(serde_json::json!({"text": "the only good part", "label": 1})),
            Document::from_value(serde_json::json!({"text": "went fine", "label": 2})),
            Document::from_value(serde_json::json!({"text": "only got worse", "label": 0})),
        ];
        let outputs = vec![
            ModelOutput { truth: 1, prediction: 1 },
            ModelOutput { truth: 2, prediction: 2 },
            ModelOutput { truth: 0, prediction: 2 },
        ];
        let projection = vec![
            ProjectionPoint { x: 0.0, y: 0.0 },
            ProjectionPoint { x: 1.0, y: 1.0 },
            ProjectionPoint { x: 2.0, y: 2.0 },
        ];
        Arc::new(DatasetBundle::from_parts(
            descriptor,
            documents,
            outputs,
            projection,
            OrderedMap::new(),
            RuleSet::default(),
            RuleSet::default(),
        ))
    }

    fn shap(token: &str, val: f64) -> TokenShap {
        TokenShap {
            token: token.to_string(),
            val,
        }
    }

    #[test]
    fn test_show_orders_errors_first_stably() {
        let mut view = DocumentView::new(bundle());
        view.show(vec![0, 1, 2], &[], Vec::new(), "Rule 1");
        assert_eq!(view.doc_list(), &[2, 0, 1]);
        assert_eq!(view.doc_count(), 3);
        assert_eq!(view.error_count(), 1);
        assert_eq!(view.context(), Some("Rule 1"));
    }

    #[test]
    fn test_cards_follow_order_and_highlight() {
        let mut view = DocumentView::new(bundle());
        view.show(vec![0, 2], &[Condition::contains("only")], Vec::new(), "Rule 2");
        let cards = view.cards();
        assert_eq!(cards.len(), 2);
        assert!(cards[0].is_error());
        assert!(cards[0].fields()[0].content().has_marks());
        assert_eq!(cards[1].prediction(), "neutral");
    }

    #[test]
    fn test_unknown_indices_are_skipped() {
        let mut view = DocumentView::new(bundle());
        view.show(vec![1, 42], &[], Vec::new(), "Rule 1");
        assert_eq!(view.cards().len(), 1);
    }

    #[test]
    fn test_shap_summary_counts_polarity_per_token() {
        let mut view = DocumentView::new(bundle());
        let payload = vec![
            vec![vec![shap("Ġonly", -0.4), shap("good", 0.2)], vec![]],
            vec![vec![shap("Ġonly", -0.1), shap("good", -0.3)], vec![]],
        ];
        view.show(vec![0, 2], &[], payload, "Rule 1");

        let summary = view.shap_summary();
        // Negative pushes dominate, so ranking is by negative count.
        assert_eq!(summary[0].token(), "only");
        assert_eq!(summary[0].negative(), 2);
        assert_eq!(summary[0].positive(), 0);
        assert_eq!(summary[1].token(), "good");
        assert_eq!(summary[1].negative(), 1);
        assert_eq!(summary[1].positive(), 1);
    }

    #[test]
    fn test_shap_summary_switches_label() {
        let mut view = DocumentView::new(bundle());
        let payload = vec![vec![
            vec![shap("only", -0.4)],
            vec![shap("fine", 0.9)],
        ]];
        view.show(vec![1], &[], payload, "Rule 1");

        assert_eq!(view.shap_summary()[0].token(), "only");
        view.set_shap_label(1);
        assert_eq!(view.shap_summary()[0].token(), "fine");
        assert_eq!(view.shap_summary()[0].positive(), 1);

        view.set_shap_label(9);
        assert_eq!(view.shap_label(), 1);
    }

    #[test]
    fn test_positive_dominant_ranking() {
        let mut view = DocumentView::new(bundle());
        let payload = vec![
            vec![vec![shap("good", 0.2), shap("fine", 0.1)]],
            vec![vec![shap("good", 0.3), shap("fine", -0.1)]],
        ];
        view.show(vec![0, 1], &[], payload, "Rule 1");

        let summary = view.shap_summary();
        assert_eq!(summary[0].token(), "good");
        assert_eq!(summary[0].positive(), 2);
        assert_eq!(summary[1].token(), "fine");
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut view = DocumentView::new(bundle());
        view.show(vec![0], &[Condition::contains("only")], Vec::new(), "Rule 1");
        view.clear();
        assert!(view.doc_list().is_empty());
        assert!(view.cards().is_empty());
        assert!(view.shap_summary().is_empty());
        assert_eq!(view.context(), None);
    }
}
