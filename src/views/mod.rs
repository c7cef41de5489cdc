//! Dashboard views
//!
//! Explicit component instances over read-only snapshots of the loaded
//! dataset. Each view exposes a serializable render model and, where it
//! originates analyst actions, its own event bus; applying inspection
//! results to them is the coordinator's job.

mod concept_panel;
mod documents;
mod explorer;
mod highlight;
mod markup;
mod overview;
mod projection;
mod renderers;
mod rule_list;
mod stats;

pub use concept_panel::{ConceptPanel, ConceptRow};
pub use documents::{DocumentView, TokenPolarity};
pub use explorer::{ExplorerEvent, ExplorerView, PathRow};
pub use highlight::HighlightSet;
pub use markup::{Markup, Span};
pub use overview::{ModelSummary, OverviewPanel};
pub use projection::{ProjectedDot, ProjectionView};
pub use renderers::{
    renderer_for, CardField, DocumentCard, DocumentRenderer, InferenceRenderer, QaRenderer,
    ReviewRenderer, SentimentRenderer,
};
pub use rule_list::{RuleListEvent, RuleListView, RuleRow, SignificanceDisplay};
pub use stats::{StatBar, StatChart, StatisticsView, TrainBar, TrainChart};
