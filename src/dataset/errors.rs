//! # Dataset Errors
//!
//! Load errors abort session construction: a partially loaded bundle is
//! never handed to the views.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Dataset bundle errors
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A bundle file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A bundle file did not parse
    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Document, model-output, and projection counts disagree
    #[error(
        "Misaligned bundle: {documents} documents, {outputs} model outputs, {projections} projection points"
    )]
    Misaligned {
        documents: usize,
        outputs: usize,
        projections: usize,
    },
}

impl DatasetError {
    /// Creates an io error carrying the offending path
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DatasetError::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a parse error carrying the offending path
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        DatasetError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}
