//! # Coordinator Errors
//!
//! A failed transition is terminal for the triggering action only; the
//! session and the rendered views stay as they were.

use thiserror::Error;

use crate::concepts::ConceptError;
use crate::rules::RuleId;

/// Result type for coordinator operations
pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

/// Coordinator errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    /// The clicked rule id is not in the loaded rule list
    #[error("Unknown rule id {0}")]
    UnknownRule(RuleId),

    /// A condition referenced a concept that could not be resolved
    #[error(transparent)]
    Concept(#[from] ConceptError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_rule_message() {
        assert_eq!(
            CoordinatorError::UnknownRule(7).to_string(),
            "Unknown rule id 7"
        );
    }

    #[test]
    fn test_concept_error_wraps_transparently() {
        let err = CoordinatorError::from(ConceptError::UnknownConcept(3));
        assert_eq!(err.to_string(), "Unknown concept id 3");
    }
}
