//! Statistics view
//!
//! Categorical breakdown charts for the whole dataset and, once a rule
//! is inspected, for its subpopulation. Breakdown keys are reordered so
//! the ground-truth axis reads first and the prediction axis second,
//! with every other axis in arrival order; the stripped key names in
//! that order double as the `key_list` of outgoing requests. The
//! optional train-split comparison renders one chart per containment
//! feature.

use std::sync::Arc;

use serde::Serialize;

use crate::backend::{StatBreakdown, TrainStat};
use crate::dataset::DatasetBundle;

const PRED_KEYS: [&str; 2] = ["pred", "y_pred"];
const GT_KEYS: [&str; 2] = ["label", "y_gt"];

/// One bar of a breakdown chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatBar {
    label: String,
    total: u64,
    errors: u64,
}

impl StatBar {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn errors(&self) -> u64 {
        self.errors
    }
}

/// One categorical breakdown chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatChart {
    key: String,
    title: String,
    bars: Vec<StatBar>,
}

impl StatChart {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn bars(&self) -> &[StatBar] {
        &self.bars
    }
}

/// One bar of a train-split comparison chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainBar {
    label: String,
    count: f64,
}

impl TrainBar {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn count(&self) -> f64 {
        self.count
    }
}

/// Per-label train-split counts for one containment feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainChart {
    feature: String,
    title: String,
    bars: Vec<TrainBar>,
}

impl TrainChart {
    pub fn feature(&self) -> &str {
        &self.feature
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn bars(&self) -> &[TrainBar] {
        &self.bars
    }
}

/// The statistics view's state: the load-time whole-dataset breakdown
/// plus whatever the last inspection returned.
pub struct StatisticsView {
    bundle: Arc<DatasetBundle>,
    selection: Option<StatBreakdown>,
    train: Option<TrainStat>,
    context: Option<String>,
}

impl StatisticsView {
    pub fn new(bundle: Arc<DatasetBundle>) -> Self {
        Self {
            bundle,
            selection: None,
            train: None,
            context: None,
        }
    }

    /// Stripped breakdown key names in display order, as sent in the
    /// `key_list` of inspect requests. Derived from the whole-dataset
    /// breakdown, whose axes every subpopulation response shares.
    pub fn key_list(&self) -> Vec<String> {
        let keys: Vec<String> = self
            .bundle
            .model_stat()
            .keys()
            .map(|raw| stripped_key(raw))
            .collect();
        display_order(keys)
    }

    /// Charts of the whole-dataset breakdown.
    pub fn dataset_charts(&self) -> Vec<StatChart> {
        self.charts(self.bundle.model_stat())
    }

    /// Charts of the inspected subpopulation; empty while nothing is
    /// selected.
    pub fn selection_charts(&self) -> Vec<StatChart> {
        self.selection
            .as_ref()
            .map(|breakdown| self.charts(breakdown))
            .unwrap_or_default()
    }

    /// Train-split comparison charts; empty when the last response
    /// carried none.
    pub fn train_charts(&self) -> Vec<TrainChart> {
        let Some(train) = &self.train else {
            return Vec::new();
        };
        let labels = &self.bundle.descriptor().labels;
        train
            .iter()
            .map(|(feature, counts)| TrainChart {
                feature: feature.to_string(),
                title: format!("{} (in train)", feature),
                bars: counts
                    .iter()
                    .enumerate()
                    .map(|(index, &count)| TrainBar {
                        label: labels
                            .get(index)
                            .cloned()
                            .unwrap_or_else(|| index.to_string()),
                        count,
                    })
                    .collect(),
            })
            .collect()
    }

    /// Applies an inspection result. An empty train map means the rule
    /// had no containment condition and no comparison is shown.
    pub fn show(
        &mut self,
        breakdown: StatBreakdown,
        train: Option<TrainStat>,
        context: impl Into<String>,
    ) {
        self.selection = Some(breakdown);
        self.train = train.filter(|stat| !stat.is_empty());
        self.context = Some(context.into());
    }

    /// Returns to the whole-dataset rendering.
    pub fn clear(&mut self) {
        self.selection = None;
        self.train = None;
        self.context = None;
    }

    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    fn charts(&self, breakdown: &StatBreakdown) -> Vec<StatChart> {
        let descriptor = self.bundle.descriptor();
        let mut charts = Vec::new();
        for key in self.key_list() {
            let raw = format!("by_{}", key);
            let Some(group) = breakdown.get(&raw) else {
                continue;
            };
            let vocab = if uses_label_vocab(&key) {
                &descriptor.labels
            } else {
                &descriptor.value_names
            };
            let bars = group
                .rows()
                .iter()
                .enumerate()
                .map(|(index, row)| StatBar {
                    label: vocab
                        .get(index)
                        .cloned()
                        .unwrap_or_else(|| bucket_fallback(row.bucket_value())),
                    total: row.total(),
                    errors: row.error_count(),
                })
                .collect();
            charts.push(StatChart {
                title: key.replace('_', " "),
                key,
                bars,
            });
        }
        charts
    }
}

/// Drops the grouping prefix: `by_y_pred` reads `y_pred`.
fn stripped_key(raw: &str) -> String {
    raw.split_once('_')
        .map(|(_, rest)| rest.to_string())
        .unwrap_or_default()
}

/// Reorders keys so a ground-truth axis is first and a prediction axis
/// second; everything else keeps arrival order. Two stable passes, the
/// ground-truth pass last so it wins the front position.
fn display_order(mut keys: Vec<String>) -> Vec<String> {
    keys.sort_by_key(|key| !PRED_KEYS.contains(&key.as_str()));
    keys.sort_by_key(|key| !GT_KEYS.contains(&key.as_str()));
    keys
}

/// Axes over labels use the label vocabulary; the rest use the
/// discretization bucket names.
fn uses_label_vocab(key: &str) -> bool {
    key.contains("label") || key.contains("pred") || key.contains("gt")
}

fn bucket_fallback(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
