//! # Backend Errors
//!
//! Error types for the statistics backend client.

use thiserror::Error;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Backend errors
#[derive(Debug, Error)]
pub enum BackendError {
    // ==================
    // Transport Errors
    // ==================
    /// Request could not be sent or the connection dropped
    #[error("Backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Backend returned status {status} for {endpoint}")]
    Status { endpoint: &'static str, status: u16 },

    // ==================
    // Payload Errors
    // ==================
    /// Response body did not match the expected shape
    #[error("Malformed {endpoint} response: {message}")]
    Decode {
        endpoint: &'static str,
        message: String,
    },
}

impl BackendError {
    /// Creates a status error for an endpoint
    pub fn status(endpoint: &'static str, status: u16) -> Self {
        BackendError::Status { endpoint, status }
    }

    /// Creates a decode error for an endpoint
    pub fn decode(endpoint: &'static str, message: impl Into<String>) -> Self {
        BackendError::Decode {
            endpoint,
            message: message.into(),
        }
    }
}
