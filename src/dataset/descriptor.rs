//! Dataset descriptor
//!
//! Per-dataset metadata loaded with the bundle: which renderer variant the
//! documents need, the classifier being inspected, and the label/value
//! vocabularies the statistics axes and free-text condition input parse
//! against.

use serde::{Deserialize, Serialize};

/// Document kind, selecting the renderer variant once at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocKind {
    Qa,
    Inference,
    Review,
    Sentiment,
}

/// Metadata for one dataset bundle, from `descriptor.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    /// Dataset name, echoed in every backend request.
    pub name: String,
    /// Document kind of the bundle.
    pub doc_kind: DocKind,
    /// Name of the classifier under inspection.
    pub model_name: String,
    /// Held-out accuracy of the classifier.
    pub accuracy: f64,
    /// Ordered label names of the classification target.
    pub labels: Vec<String>,
    /// Display names of discretized feature buckets.
    #[serde(default = "default_value_names")]
    pub value_names: Vec<String>,
    /// Known high-level feature names, for free-text condition input.
    #[serde(default = "default_feature_names")]
    pub feature_names: Vec<String>,
}

fn default_value_names() -> Vec<String> {
    ["Low", "Medium", "High"].map(String::from).to_vec()
}

fn default_feature_names() -> Vec<String> {
    ["ADJ", "ADV", "NOUN", "PRON", "NUM", "doc_len", "pred", "label", "overlap"]
        .map(String::from)
        .to_vec()
}

impl DatasetDescriptor {
    pub fn from_json(content: &str) -> Result<Self, String> {
        let descriptor: DatasetDescriptor =
            serde_json::from_str(content).map_err(|e| e.to_string())?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("descriptor name is empty".to_string());
        }
        if self.labels.is_empty() {
            return Err("descriptor has no labels".to_string());
        }
        if !(0.0..=1.0).contains(&self.accuracy) {
            return Err(format!("accuracy {} outside [0, 1]", self.accuracy));
        }
        Ok(())
    }

    /// Base error rate of the classifier.
    pub fn base_error_rate(&self) -> f64 {
        1.0 - self.accuracy
    }

    pub fn label_name(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn value_name(&self, index: usize) -> Option<&str> {
        self.value_names.get(index).map(String::as_str)
    }

    /// Parses free-text input into a discretized value: a leading `l`,
    /// `m`, or `h` selects the bucket; otherwise the first letter is
    /// matched against the label initials. `None` when nothing matches;
    /// the caller drops the condition.
    pub fn parse_value(&self, raw: &str) -> Option<i64> {
        let trimmed = raw.trim();
        let initial = trimmed.chars().next()?.to_lowercase().next()?;
        match initial {
            'l' => Some(0),
            'm' => Some(1),
            'h' => Some(2),
            _ => self
                .labels
                .iter()
                .position(|label| {
                    label
                        .chars()
                        .next()
                        .and_then(|c| c.to_lowercase().next())
                        .map(|c| c == initial)
                        .unwrap_or(false)
                })
                .map(|index| index as i64),
        }
    }

    /// Canonicalizes a typed high-level feature name by case-insensitive
    /// three-letter prefix against the known names. Unrecognized input
    /// passes through normalized, matching what the backend expects for
    /// ad-hoc features.
    pub fn canonical_feature(&self, raw: &str) -> String {
        let normalized = raw.trim().to_string();
        let typed = prefix3(&normalized);
        for name in &self.feature_names {
            if prefix3(name) == typed && !typed.is_empty() {
                return name.clone();
            }
        }
        normalized
    }
}

fn prefix3(s: &str) -> String {
    s.chars().take(3).flat_map(char::to_lowercase).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> DatasetDescriptor {
        DatasetDescriptor {
            name: "twitter".to_string(),
            doc_kind: DocKind::Sentiment,
            model_name: "twitter-roberta-base-sentiment".to_string(),
            accuracy: 0.72,
            labels: ["negative", "neutral", "positive"].map(String::from).to_vec(),
            value_names: default_value_names(),
            feature_names: default_feature_names(),
        }
    }

    #[test]
    fn test_from_json_applies_defaults() {
        let json = r#"{
            "name": "twitter",
            "doc_kind": "sentiment",
            "model_name": "twitter-roberta-base-sentiment",
            "accuracy": 0.72,
            "labels": ["negative", "neutral", "positive"]
        }"#;
        let descriptor = DatasetDescriptor::from_json(json).unwrap();
        assert_eq!(descriptor.doc_kind, DocKind::Sentiment);
        assert_eq!(descriptor.value_names, &["Low", "Medium", "High"]);
        assert!(descriptor.feature_names.contains(&"overlap".to_string()));
        assert!((descriptor.base_error_rate() - 0.28).abs() < 1e-9);
    }

    #[test]
    fn test_validation_rejects_bad_metadata() {
        assert!(DatasetDescriptor::from_json(r#"{"name": "", "doc_kind": "qa", "model_name": "m", "accuracy": 0.5, "labels": ["a"]}"#).is_err());
        assert!(DatasetDescriptor::from_json(r#"{"name": "d", "doc_kind": "qa", "model_name": "m", "accuracy": 1.5, "labels": ["a"]}"#).is_err());
        assert!(DatasetDescriptor::from_json(r#"{"name": "d", "doc_kind": "qa", "model_name": "m", "accuracy": 0.5, "labels": []}"#).is_err());
    }

    #[test]
    fn test_parse_value_buckets() {
        let d = descriptor();
        assert_eq!(d.parse_value("low"), Some(0));
        assert_eq!(d.parse_value(" Medium "), Some(1));
        assert_eq!(d.parse_value("H"), Some(2));
    }

    #[test]
    fn test_parse_value_label_initials() {
        let d = descriptor();
        assert_eq!(d.parse_value("negative"), Some(0));
        assert_eq!(d.parse_value("Positive"), Some(2));
        // 'n' hits the first label starting with it.
        assert_eq!(d.parse_value("n"), Some(0));
    }

    #[test]
    fn test_parse_value_unknown_is_none() {
        let d = descriptor();
        assert_eq!(d.parse_value("zebra"), None);
        assert_eq!(d.parse_value("   "), None);
    }

    #[test]
    fn test_canonical_feature_prefix_match() {
        let d = descriptor();
        assert_eq!(d.canonical_feature("adj"), "ADJ");
        assert_eq!(d.canonical_feature(" Overlap "), "overlap");
        assert_eq!(d.canonical_feature("doc"), "doc_len");
        assert_eq!(d.canonical_feature("unheard"), "unheard");
    }
}
