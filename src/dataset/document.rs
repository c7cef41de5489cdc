//! Document records
//!
//! Documents are external, read-only JSON records with per-kind fields
//! (a QA record carries title/question/passage/answer, a sentiment record
//! carries text/label, and so on). The store only offers typed field
//! access; which fields a renderer reads is decided by the loaded
//! document kind.

use serde::{Deserialize, Serialize};

/// One raw document record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(serde_json::Map<String, serde_json::Value>);

impl Document {
    /// String field, if present and a string.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    /// Integer field, if present and integral.
    pub fn integer(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(|v| v.as_i64())
    }

    /// Field rendered for display: strings verbatim, everything else in
    /// its JSON form. Missing fields render empty.
    pub fn display(&self, key: &str) -> String {
        match self.0.get(key) {
            None => String::new(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_value(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => Document(map),
            _ => Document(serde_json::Map::new()),
        }
    }
}

/// Parses JSONL content: one document record per non-empty line.
pub fn parse_jsonl(content: &str) -> Result<Vec<Document>, String> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|e| format!("line {}: {}", index + 1, e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_field_access() {
        let doc = Document::from_value(serde_json::json!({
            "text": "the plot was hardly original",
            "label": 0
        }));
        assert_eq!(doc.text("text"), Some("the plot was hardly original"));
        assert_eq!(doc.integer("label"), Some(0));
        assert_eq!(doc.text("label"), None);
        assert_eq!(doc.integer("missing"), None);
    }

    #[test]
    fn test_display_renders_any_field() {
        let doc = Document::from_value(serde_json::json!({"answer": true, "title": "boolq"}));
        assert_eq!(doc.display("title"), "boolq");
        assert_eq!(doc.display("answer"), "true");
        assert_eq!(doc.display("missing"), "");
    }

    #[test]
    fn test_parse_jsonl_skips_blank_lines() {
        let content = "{\"text\": \"a\"}\n\n{\"text\": \"b\"}\n";
        let docs = parse_jsonl(content).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].text("text"), Some("b"));
    }

    #[test]
    fn test_parse_jsonl_reports_line_numbers() {
        let err = parse_jsonl("{\"text\": \"a\"}\n{broken").unwrap_err();
        assert!(err.contains("line 2"));
    }
}
