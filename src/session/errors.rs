//! # Session Errors
//!
//! Everything a session operation can surface to the HTTP layer. The
//! variants separate the concerns the handlers map to status codes:
//! unknown ids, failed condition resolution, and failed backend
//! exchanges.

use thiserror::Error;

use crate::backend::BackendError;
use crate::coordinator::CoordinatorError;
use crate::dataset::DatasetError;

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// The dataset bundle failed to load
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// A coordinator transition was rejected
    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),

    /// An edited condition path failed concept resolution
    #[error("Condition resolution failed: {0}")]
    Resolution(#[source] CoordinatorError),

    /// A statistics backend exchange failed
    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concepts::ConceptError;

    #[test]
    fn test_coordinator_error_passes_through() {
        let err = SessionError::from(CoordinatorError::UnknownRule(3));
        assert_eq!(err.to_string(), "Unknown rule id 3");
    }

    #[test]
    fn test_resolution_error_is_labelled() {
        let err = SessionError::Resolution(CoordinatorError::Concept(
            ConceptError::UnknownConcept(2),
        ));
        assert!(err.to_string().contains("resolution failed"));
    }
}
