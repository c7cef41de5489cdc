//! # Concept Registry Errors
//!
//! Resolution failures are loud: submitting a rule that references a
//! deleted or never-defined concept must abort the submission rather than
//! silently sending an empty token list.

use thiserror::Error;

use super::registry::ConceptId;

/// Result type for concept operations
pub type ConceptResult<T> = Result<T, ConceptError>;

/// Concept registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConceptError {
    /// The referenced concept id is not (or no longer) in the registry
    #[error("Unknown concept id {0}")]
    UnknownConcept(ConceptId),

    /// An `is` condition whose feature name does not follow `concept_<id>`
    #[error("Condition feature '{0}' is not a concept reference")]
    MalformedReference(String),
}
