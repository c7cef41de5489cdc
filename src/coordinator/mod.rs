//! Selection protocol and cross-view coordination
//!
//! One coordinator per session: it owns the views, the concept
//! registry, and the selection state machine, and it enforces the
//! ordering rule that makes concurrent backend exchanges safe (the
//! latest issued inspect request wins; stale responses are discarded).

mod coordinator;
mod errors;
mod selection;

pub use coordinator::{Coordinator, PendingConceptUpdate, PendingInspect};
pub use errors::{CoordinatorError, CoordinatorResult};
pub use selection::Selection;
