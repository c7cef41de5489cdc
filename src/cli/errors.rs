//! # CLI Errors
//!
//! Every CLI failure is terminal: the message goes to stderr and the
//! process exits non-zero.

use thiserror::Error;

use crate::config::ConfigError;
use crate::session::SessionError;

/// Result type for CLI commands
pub type CliResult<T> = Result<T, CliError>;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Session construction failed (dataset load)
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Summary output could not be encoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server could not bind or serve
    #[error("Server failed: {0}")]
    Server(#[from] std::io::Error),
}
