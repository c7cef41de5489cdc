//! # Rule Model Errors
//!
//! Error types for mining-artifact parsing.

use thiserror::Error;

/// Result type for rule-model operations
pub type RuleResult<T> = Result<T, RuleError>;

/// Rule-model errors
#[derive(Debug, Clone, Error)]
pub enum RuleError {
    /// A condition's feature index falls outside the lookup table
    #[error("Feature index {index} out of range for lookup table of {table_len} names")]
    UnknownFeatureIndex { index: usize, table_len: usize },

    /// The artifact JSON did not match the expected shape
    #[error("Malformed rule artifact: {0}")]
    MalformedArtifact(String),
}

impl RuleError {
    /// Creates a malformed-artifact error
    pub fn malformed(message: impl Into<String>) -> Self {
        RuleError::MalformedArtifact(message.into())
    }
}
