//! 2D document embedding
//!
//! One projected coordinate per document, aligned by position with the
//! document store. Read from `projection.csv` (columns `x,y`).

use std::io::Read;

use serde::{Deserialize, Serialize};

/// Projected position of one document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    pub x: f64,
    pub y: f64,
}

/// Parses the projection table from CSV with an `x,y` header.
pub fn parse_projection(reader: impl Read) -> Result<Vec<ProjectionPoint>, String> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    csv_reader
        .deserialize()
        .enumerate()
        .map(|(index, row)| row.map_err(|e| format!("row {}: {}", index + 1, e)))
        .collect()
}
