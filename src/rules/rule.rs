//! Mined rule and rule-set types
//!
//! A rule is a conjunction of conditions describing a document
//! subpopulation with an elevated error rate. Rules are immutable once
//! loaded; ranking and filtering never reorder the backing store (they
//! return id vectors instead), and an analyst-edited rule lives only in
//! the selection state, never here.

use serde::Serialize;

use super::condition::Condition;

/// Position of a rule within its flavor's loaded rule set.
pub type RuleId = usize;

/// One mined rule, immutable after load.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    id: RuleId,
    conditions: Vec<Condition>,
    error_rate: f64,
    error_rate_test: f64,
    confidence_interval: (f64, f64),
    p_value: f64,
    doc_indices: Vec<u32>,
    label: usize,
}

impl Rule {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: RuleId,
        conditions: Vec<Condition>,
        error_rate: f64,
        error_rate_test: f64,
        confidence_interval: (f64, f64),
        p_value: f64,
        doc_indices: Vec<u32>,
        label: usize,
    ) -> Self {
        Self {
            id,
            conditions,
            error_rate,
            error_rate_test,
            confidence_interval,
            p_value,
            doc_indices,
            label,
        }
    }

    pub fn id(&self) -> RuleId {
        self.id
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Number of conditions in the conjunction.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Error rate over the matched training-split documents, in `[0, 1]`.
    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }

    /// Error rate over the matched test-split documents.
    pub fn error_rate_test(&self) -> f64 {
        self.error_rate_test
    }

    /// Bootstrap 95% confidence interval of the error rate.
    pub fn confidence_interval(&self) -> (f64, f64) {
        self.confidence_interval
    }

    /// One-sided p-value against the model's base error rate.
    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    /// Matched document indices (the subpopulation).
    pub fn doc_indices(&self) -> &[u32] {
        &self.doc_indices
    }

    /// Number of matched documents.
    pub fn support(&self) -> usize {
        self.doc_indices.len()
    }

    /// Target label category the rule was mined against.
    pub fn label(&self) -> usize {
        self.label
    }
}

/// Top error-correlated single feature, surfaced by the overview panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopFeature {
    /// Resolved feature name.
    pub feature: String,
    /// Discretized value the error rate peaks at, when the flavor has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub val: Option<i64>,
    /// Error rate among documents matching the feature.
    pub err_rate: f64,
}

/// Immutable collection of mined rules for one flavor.
///
/// Holds the canonical rule order from the mining artifact plus the
/// artifact's side tables (target label names, rule-length histogram,
/// top error-correlated features).
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    target_names: Vec<String>,
    length_histogram: Vec<u32>,
    top_features: Vec<TopFeature>,
}

impl RuleSet {
    pub(crate) fn new(
        rules: Vec<Rule>,
        target_names: Vec<String>,
        length_histogram: Vec<u32>,
        top_features: Vec<TopFeature>,
    ) -> Self {
        Self {
            rules,
            target_names,
            length_histogram,
            top_features,
        }
    }

    pub fn get(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Label names of the classification target.
    pub fn target_names(&self) -> &[String] {
        &self.target_names
    }

    /// Histogram of rule lengths (index = condition count).
    pub fn length_histogram(&self) -> &[u32] {
        &self.length_histogram
    }

    /// Top error-correlated single features from the mining pass.
    pub fn top_features(&self) -> &[TopFeature] {
        &self.top_features
    }
}
