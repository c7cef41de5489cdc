//! Rule/condition model
//!
//! The canonical in-memory representation shared by every view:
//! - conditions (token containment, discretized equality, concept
//!   membership) with their wire encoding
//! - immutable mined rules and rule sets
//! - mining-artifact parsing with feature-name resolution
//! - stable ranking and filtering that never reorder the canonical store
//!
//! Everything here is a pure transform over loaded data; no I/O, no
//! shared mutable state.

mod artifact;
mod condition;
mod errors;
mod ranking;
mod rule;

pub use artifact::{FeatureTable, MiningFilter, RuleArtifact, RuleFlavor};
pub use condition::{Condition, Operand, Sign, CONCEPT_FEATURE_PREFIX, CONTAINMENT_THRESHOLD};
pub use errors::{RuleError, RuleResult};
pub use ranking::{filter, passes, rank, LengthFilter, RuleOrder};
pub use rule::{Rule, RuleId, RuleSet, TopFeature};
