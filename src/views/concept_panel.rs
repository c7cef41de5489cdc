//! Concept panel
//!
//! One row per live concept, with the error summary from the last
//! update-concept exchange when one has run. The panel never owns
//! concept state; rows are produced from the registry at render time so
//! they cannot drift from it.

use std::collections::HashMap;

use serde::Serialize;

use crate::backend::ConceptStat;
use crate::concepts::{ConceptId, ConceptRegistry};

/// One rendered concept row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConceptRow {
    id: ConceptId,
    members_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConceptStat>,
}

impl ConceptRow {
    pub fn id(&self) -> ConceptId {
        self.id
    }

    pub fn members_text(&self) -> &str {
        &self.members_text
    }

    pub fn summary(&self) -> Option<&ConceptStat> {
        self.summary.as_ref()
    }

    /// Error-rate text over the summary dot, when scored.
    pub fn error_text(&self) -> Option<String> {
        self.summary
            .as_ref()
            .map(|stat| format!("{:.2}%", stat.err_rate * 100.0))
    }
}

/// Render state for the concept panel: scored summaries keyed by
/// concept id, plus the model's base error rate for the comparison
/// marker.
pub struct ConceptPanel {
    base_error_rate: f64,
    summaries: HashMap<ConceptId, ConceptStat>,
}

impl ConceptPanel {
    pub fn new(base_error_rate: f64) -> Self {
        Self {
            base_error_rate,
            summaries: HashMap::new(),
        }
    }

    /// Base error rate marker drawn on every summary.
    pub fn base_error_rate(&self) -> f64 {
        self.base_error_rate
    }

    /// Stores the score returned for one concept, replacing any earlier
    /// one.
    pub fn set_summary(&mut self, id: ConceptId, stat: ConceptStat) {
        self.summaries.insert(id, stat);
    }

    /// Drops a removed concept's score.
    pub fn drop_summary(&mut self, id: ConceptId) {
        self.summaries.remove(&id);
    }

    /// Rows for the live concepts, in id order.
    pub fn rows(&self, registry: &ConceptRegistry) -> Vec<ConceptRow> {
        registry
            .iter()
            .map(|concept| ConceptRow {
                id: concept.id(),
                members_text: concept.render_members(),
                summary: self.summaries.get(&concept.id()).cloned(),
            })
            .collect()
    }

    /// Whether concept conditions can be added to the explorer. Gated on
    /// the registry holding at least one concept; creating one re-enables
    /// it.
    pub fn can_add_condition(&self, registry: &ConceptRegistry) -> bool {
        registry.has_concepts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(err_rate: f64) -> ConceptStat {
        ConceptStat {
            err_rate,
            ci: (err_rate - 0.1, err_rate + 0.1),
            support: 42,
        }
    }

    #[test]
    fn test_rows_follow_the_registry() {
        let mut registry = ConceptRegistry::new();
        let first = registry.create();
        let second = registry.create();
        registry.set_members(first, "great, fantastic").unwrap();

        let panel = ConceptPanel::new(0.3);
        let rows = panel.rows(&registry);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id(), first);
        assert_eq!(rows[0].members_text(), "great, fantastic");
        assert_eq!(rows[1].id(), second);
        assert_eq!(rows[1].members_text(), "");
        assert!(rows[0].summary().is_none());
    }

    #[test]
    fn test_summaries_attach_by_id() {
        let mut registry = ConceptRegistry::new();
        let id = registry.create();

        let mut panel = ConceptPanel::new(0.3);
        panel.set_summary(id, stat(0.55));

        let rows = panel.rows(&registry);
        assert_eq!(rows[0].summary().unwrap().support, 42);
        assert_eq!(rows[0].error_text(), Some("55.00%".to_string()));
    }

    #[test]
    fn test_drop_summary_on_removal() {
        let mut registry = ConceptRegistry::new();
        let id = registry.create();
        let mut panel = ConceptPanel::new(0.3);
        panel.set_summary(id, stat(0.5));

        registry.remove(id).unwrap();
        panel.drop_summary(id);
        assert!(panel.rows(&registry).is_empty());
    }

    #[test]
    fn test_can_add_tracks_registry_population() {
        let mut registry = ConceptRegistry::new();
        let panel = ConceptPanel::new(0.3);
        assert!(!panel.can_add_condition(&registry));

        let id = registry.create();
        assert!(panel.can_add_condition(&registry));

        registry.remove(id).unwrap();
        assert!(!panel.can_add_condition(&registry));

        registry.create();
        assert!(panel.can_add_condition(&registry));
    }
}
