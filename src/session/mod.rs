//! Session layer
//!
//! Owns one coordinator per served dataset and drives the exchange with
//! the statistics backend.

mod errors;
mod session;

pub use errors::{SessionError, SessionResult};
pub use session::{load_bundle, InspectOutcome, Session};
