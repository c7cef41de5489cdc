//! Per-document model output
//!
//! Ground-truth and predicted label pairs, aligned by position with the
//! document store. Read from `model_output.csv` (columns `y_gt,y_pred`).

use std::io::Read;

use serde::{Deserialize, Serialize};

/// Ground truth and prediction for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOutput {
    #[serde(rename = "y_gt")]
    pub truth: u32,
    #[serde(rename = "y_pred")]
    pub prediction: u32,
}

impl ModelOutput {
    /// Whether the model got this document wrong.
    pub fn is_error(&self) -> bool {
        self.truth != self.prediction
    }
}

/// Parses the model-output table from CSV with a `y_gt,y_pred` header.
pub fn parse_model_output(reader: impl Read) -> Result<Vec<ModelOutput>, String> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    csv_reader
        .deserialize()
        .enumerate()
        .map(|(index, row)| row.map_err(|e| format!("row {}: {}", index + 1, e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_error() {
        assert!(ModelOutput { truth: 0, prediction: 2 }.is_error());
        assert!(!ModelOutput { truth: 1, prediction: 1 }.is_error());
    }

    #[test]
    fn test_parse_model_output() {
        let outputs = parse_model_output("y_gt,y_pred\n0,0\n1,2\n".as_bytes()).unwrap();
        assert_eq!(outputs.len(), 2);
        assert!(!outputs[0].is_error());
        assert!(outputs[1].is_error());
        assert_eq!(outputs[1].truth, 1);
    }

    #[test]
    fn test_parse_rejects_non_numeric_rows() {
        let err = parse_model_output("y_gt,y_pred\n0,maybe\n".as_bytes()).unwrap_err();
        assert!(err.contains("row 1"));
    }
}
