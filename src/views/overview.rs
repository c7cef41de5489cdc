//! Overview panel
//!
//! Idle-state summary of the dataset and the inspected model, plus the
//! top error-correlated single features carried by each mined artifact.

use std::sync::Arc;

use serde::Serialize;

use crate::dataset::DatasetBundle;
use crate::rules::RuleFlavor;

/// Dataset and model summary line items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    dataset: String,
    model: String,
    accuracy_text: String,
    error_text: String,
    document_count: usize,
}

impl ModelSummary {
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn accuracy_text(&self) -> &str {
        &self.accuracy_text
    }

    pub fn error_text(&self) -> &str {
        &self.error_text
    }

    pub fn document_count(&self) -> usize {
        self.document_count
    }
}

/// The overview panel reads straight off the loaded bundle.
pub struct OverviewPanel {
    bundle: Arc<DatasetBundle>,
}

impl OverviewPanel {
    pub fn new(bundle: Arc<DatasetBundle>) -> Self {
        Self { bundle }
    }

    pub fn summary(&self) -> ModelSummary {
        let descriptor = self.bundle.descriptor();
        ModelSummary {
            dataset: descriptor.name.clone(),
            model: descriptor.model_name.clone(),
            accuracy_text: format!("{:.1}%", descriptor.accuracy * 100.0),
            error_text: format!("{:.1}%", descriptor.base_error_rate() * 100.0),
            document_count: self.bundle.document_count(),
        }
    }

    /// Display lines for a flavor's top error-correlated features. Token
    /// features read `only, err_rate: 61.54%`; high-level ones carry the
    /// peak value, with the prediction pseudo-feature resolved through
    /// the label vocabulary instead of the bucket names.
    pub fn top_feature_lines(&self, flavor: RuleFlavor) -> Vec<String> {
        let descriptor = self.bundle.descriptor();
        self.bundle
            .rule_set(flavor)
            .top_features()
            .iter()
            .map(|top| match top.val {
                None => format!("{}, err_rate: {:.2}%", top.feature, top.err_rate * 100.0),
                Some(value) => {
                    let vocab = if top.feature == "pred" {
                        &descriptor.labels
                    } else {
                        &descriptor.value_names
                    };
                    let shown = usize::try_from(value)
                        .ok()
                        .and_then(|index| vocab.get(index))
                        .cloned()
                        .unwrap_or_else(|| value.to_string());
                    format!(
                        "{}={}, err_rate: {:.2}%",
                        top.feature,
                        shown,
                        top.err_rate * 100.0
                    )
                }
            })
            .collect()
    }
}
