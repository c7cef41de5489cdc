//! Concept registry
//!
//! Analyst-defined token groups and the resolution of `is` conditions
//! into concrete member lists ahead of backend submission.

mod errors;
mod registry;

pub use errors::{ConceptError, ConceptResult};
pub use registry::{parse_members, Concept, ConceptId, ConceptRegistry};
