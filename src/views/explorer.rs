//! Condition explorer view
//!
//! Holds the pending condition path the analyst is building, one
//! condition at a time from three sources: free-text tokens, high-level
//! features with a free-text value, and concept references. Submitting
//! announces the path on the view bus; the applied response comes back
//! as a per-condition match path plus refinement hints.
//!
//! Malformed feature values do not error: the add is dropped and the
//! path stays as it was.

use std::sync::Arc;

use serde::Serialize;

use crate::backend::{Hint, PathNode};
use crate::bus::{EventBus, EventKind};
use crate::dataset::DatasetDescriptor;
use crate::rules::{Condition, Sign};

/// Events the explorer emits.
#[derive(Debug, Clone, PartialEq)]
pub enum ExplorerEvent {
    /// The pending path was submitted for inspection.
    Inspect(Vec<Condition>),
}

impl EventKind for ExplorerEvent {
    fn kind(&self) -> &'static str {
        match self {
            ExplorerEvent::Inspect(_) => "rule_inspect",
        }
    }
}

/// One rendered node of the applied condition path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathRow {
    label: String,
    size: u64,
    error_rate: f64,
}

impl PathRow {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }

    /// Second line of the node: matched count and error rate.
    pub fn summary(&self) -> String {
        format!("{} ({:.2}%)", self.size, self.error_rate * 100.0)
    }
}

/// The explorer's state: pending conditions plus the last applied
/// inspection result.
pub struct ExplorerView {
    descriptor: Arc<DatasetDescriptor>,
    pending: Vec<Condition>,
    path: Option<PathNode>,
    hints: Vec<Hint>,
    bus: EventBus<ExplorerEvent>,
}

impl ExplorerView {
    pub fn new(descriptor: Arc<DatasetDescriptor>) -> Self {
        Self {
            descriptor,
            pending: Vec::new(),
            path: None,
            hints: Vec::new(),
            bus: EventBus::new(),
        }
    }

    pub fn bus(&self) -> &EventBus<ExplorerEvent> {
        &self.bus
    }

    pub fn pending(&self) -> &[Condition] {
        &self.pending
    }

    /// Adds a token-containment condition. Whitespace is collapsed into
    /// single underscores so the token survives the wire format; blank
    /// input is dropped.
    pub fn add_token(&mut self, text: &str) {
        let token = text.split_whitespace().collect::<Vec<_>>().join("_");
        if token.is_empty() {
            return;
        }
        self.pending.push(Condition::contains(token));
    }

    /// Adds an equality condition over a high-level feature. The feature
    /// name is canonicalized by prefix; the free-text value is parsed
    /// against the Low/Medium/High initials or the label vocabulary. An
    /// unparsable value drops the add.
    pub fn add_feature(&mut self, feature: &str, value: &str) {
        let Some(parsed) = self.descriptor.parse_value(value) else {
            return;
        };
        let canonical = self.descriptor.canonical_feature(feature);
        if canonical.is_empty() {
            return;
        }
        self.pending.push(Condition::equals(canonical, parsed));
    }

    /// Adds an unresolved reference to a concept. Resolution to the
    /// member list happens at submit time, not here.
    pub fn add_concept(&mut self, concept_id: u32) {
        self.pending.push(Condition::concept_ref(concept_id));
    }

    /// Removes the condition at `index`; out-of-range is ignored.
    pub fn remove(&mut self, index: usize) {
        if index < self.pending.len() {
            self.pending.remove(index);
        }
    }

    /// Drops the pending path and any applied result.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.path = None;
        self.hints.clear();
    }

    /// Announces the pending path for inspection. The conditions go out
    /// as built; concept references are resolved downstream.
    pub fn submit(&self) {
        self.bus.emit(ExplorerEvent::Inspect(self.pending.clone()));
    }

    /// Applies an inspection result: the pending path is replaced by the
    /// conditions that were actually inspected (a selected rule's, or
    /// the resolved form of an edited path), and the match path and
    /// hints are stored for rendering.
    pub fn show_inspection(&mut self, conditions: Vec<Condition>, path: PathNode, hints: Vec<Hint>) {
        self.pending = conditions;
        self.path = Some(path);
        self.hints = hints;
    }

    /// Returns the view to its empty state.
    pub fn clear(&mut self) {
        self.reset();
    }

    /// Chip labels for the pending conditions, in path order.
    pub fn pending_labels(&self) -> Vec<String> {
        self.pending
            .iter()
            .map(|condition| self.chip_label(condition))
            .collect()
    }

    /// The applied match path, root first, one row per condition.
    pub fn path_rows(&self) -> Vec<PathRow> {
        let Some(root) = &self.path else {
            return Vec::new();
        };
        root.chain()
            .into_iter()
            .map(|node| PathRow {
                label: self.node_label(node),
                size: node.size,
                error_rate: node.error_rate,
            })
            .collect()
    }

    pub fn hints(&self) -> &[Hint] {
        &self.hints
    }

    /// Hint display lines, e.g. `slow: 61.54%`.
    pub fn hint_labels(&self) -> Vec<String> {
        self.hints
            .iter()
            .map(|hint| format!("{}: {:.2}%", hint.feature, hint.err_rate * 100.0))
            .collect()
    }

    fn chip_label(&self, condition: &Condition) -> String {
        match condition.sign() {
            Sign::Contains | Sign::MemberOf => format!("contain: {}", condition.feature()),
            Sign::Equals => format!("{}={}", condition.feature(), self.value_label(condition)),
        }
    }

    fn node_label(&self, node: &PathNode) -> String {
        match node.condition.sign() {
            Sign::Contains => format!("contain: {}", node.condition.feature()),
            Sign::MemberOf => {
                let members = node.condition.members().unwrap_or(&[]);
                if members.is_empty() {
                    format!("contain: {}", node.condition.feature())
                } else {
                    format!("contain: {}", members.join(","))
                }
            }
            Sign::Equals => format!("{}={}", node.condition.feature(), self.value_label(&node.condition)),
        }
    }

    fn value_label(&self, condition: &Condition) -> String {
        match condition.value() {
            Some(value) => usize::try_from(value)
                .ok()
                .and_then(|index| self.descriptor.value_name(index))
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string()),
            None => String::new(),
        }
    }
}
