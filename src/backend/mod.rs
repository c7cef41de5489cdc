//! Statistics backend
//!
//! Wire protocol and HTTP client for the statistics service that
//! evaluates rules and concepts over the full corpus.

mod client;
mod errors;
mod protocol;

pub use client::{HttpStatisticsBackend, StatisticsBackend};
pub use errors::{BackendError, BackendResult};
pub use protocol::{
    ConceptStat, DocumentShap, Hint, InspectRuleRequest, InspectRuleResponse, OrderedMap,
    PathNode, StatBreakdown, StatGroup, StatRow, TokenShap, TrainStat, UpdateConceptRequest,
};
