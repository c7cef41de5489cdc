//! Statistics service wire protocol
//!
//! Request and response bodies for the two statistics queries:
//! `inspect_rule` evaluates a condition list over the corpus and returns
//! the matched documents with per-condition path statistics, and
//! `update_concept` scores a token list as a standalone subpopulation.
//!
//! Breakdown groups arrive as JSON objects whose key order is the display
//! order, so the map types here keep entries in arrival order instead of
//! sorting them.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::rules::{Condition, Sign};

/// A JSON object decoded into a vector of entries, preserving arrival
/// order on decode and echoing it back on encode.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderedMap<V>(Vec<(String, V)>);

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        OrderedMap(Vec::new())
    }

    /// Appends an entry, replacing any existing entry with the same key
    /// in place.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> FromIterator<(String, V)> for OrderedMap<V> {
    fn from_iter<T: IntoIterator<Item = (String, V)>>(iter: T) -> Self {
        OrderedMap(iter.into_iter().collect())
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntryVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntryVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a JSON object")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(EntryVisitor(PhantomData))
    }
}

/// One bar of a breakdown group: the bucket value it describes plus the
/// document and error counts inside that bucket.
///
/// On the wire the bucket value sits under the group's own column name,
/// next to the fixed `is_error` and `tot` counters.
#[derive(Debug, Clone, PartialEq)]
pub struct StatRow {
    bucket: Option<(String, serde_json::Value)>,
    is_error: u64,
    tot: u64,
}

impl StatRow {
    pub fn new(bucket: Option<(String, serde_json::Value)>, is_error: u64, tot: u64) -> Self {
        StatRow {
            bucket,
            is_error,
            tot,
        }
    }

    pub fn bucket_value(&self) -> Option<&serde_json::Value> {
        self.bucket.as_ref().map(|(_, value)| value)
    }

    pub fn error_count(&self) -> u64 {
        self.is_error
    }

    pub fn total(&self) -> u64 {
        self.tot
    }

    pub fn error_rate(&self) -> f64 {
        if self.tot == 0 {
            0.0
        } else {
            self.is_error as f64 / self.tot as f64
        }
    }
}

impl Serialize for StatRow {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = 2 + usize::from(self.bucket.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        if let Some((name, value)) = &self.bucket {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry("is_error", &self.is_error)?;
        map.serialize_entry("tot", &self.tot)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for StatRow {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = StatRow;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a breakdown row object")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut bucket = None;
                let mut is_error = None;
                let mut tot = None;
                while let Some(key) = access.next_key::<String>()? {
                    match key.as_str() {
                        "is_error" => is_error = Some(access.next_value::<u64>()?),
                        "tot" => tot = Some(access.next_value::<u64>()?),
                        _ => bucket = Some((key, access.next_value::<serde_json::Value>()?)),
                    }
                }
                Ok(StatRow {
                    bucket,
                    is_error: is_error.ok_or_else(|| de::Error::missing_field("is_error"))?,
                    tot: tot.ok_or_else(|| de::Error::missing_field("tot"))?,
                })
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

/// Rows of one breakdown group, ordered by bucket.
///
/// The wire shape keys rows by their 0-based position, so decoding sorts
/// by the numeric key rather than trusting arrival order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatGroup(Vec<StatRow>);

impl StatGroup {
    pub fn rows(&self) -> &[StatRow] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Largest per-bucket document count, for scaling bars.
    pub fn max_total(&self) -> u64 {
        self.0.iter().map(StatRow::total).max().unwrap_or(0)
    }
}

impl From<Vec<StatRow>> for StatGroup {
    fn from(rows: Vec<StatRow>) -> Self {
        StatGroup(rows)
    }
}

impl Serialize for StatGroup {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (index, row) in self.0.iter().enumerate() {
            map.serialize_entry(&index.to_string(), row)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StatGroup {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let keyed = OrderedMap::<StatRow>::deserialize(deserializer)?;
        let mut entries = keyed.0;
        entries.sort_by_key(|(key, _)| key.parse::<usize>().unwrap_or(usize::MAX));
        Ok(StatGroup(entries.into_iter().map(|(_, row)| row).collect()))
    }
}

/// Breakdown groups in arrival order, keyed `by_<column>`.
pub type StatBreakdown = OrderedMap<StatGroup>;

/// Training-set token counts per label, keyed by feature name. Empty when
/// the inspected rule has no containment condition.
pub type TrainStat = OrderedMap<Vec<f64>>;

/// One node of the per-condition match path. Each condition of the
/// inspected rule becomes a node carrying the subpopulation size and
/// error rate after that condition is applied; `children` holds the next
/// condition's node, so the tree is a single-child chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathNode {
    #[serde(flatten)]
    pub condition: Condition,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub error_rate: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PathNode>,
}

impl PathNode {
    /// Flattens the chain into root-first order.
    pub fn chain(&self) -> Vec<&PathNode> {
        let mut nodes = vec![self];
        let mut current = self;
        while let Some(child) = current.children.first() {
            nodes.push(child);
            current = child;
        }
        nodes
    }
}

/// A suggested refinement: a containment condition that would raise the
/// error rate of the current subpopulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hint {
    pub feature: String,
    pub sign: Sign,
    pub threshold: f64,
    pub err_rate: f64,
}

impl Hint {
    pub fn to_condition(&self) -> Condition {
        Condition::contains(self.feature.clone())
    }
}

/// One token's attribution toward one output label of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenShap {
    pub token: String,
    pub val: f64,
}

/// Per-document attributions: one token list per output label.
pub type DocumentShap = Vec<Vec<TokenShap>>;

/// Body of an `inspect_rule` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectRuleRequest {
    pub rules: Vec<Condition>,
    pub data_name: String,
    pub key_list: Vec<String>,
    /// Numeric flag; non-zero restricts matching to misclassified
    /// documents.
    pub error_only: u8,
}

impl InspectRuleRequest {
    pub fn new(rules: Vec<Condition>, data_name: impl Into<String>, key_list: Vec<String>) -> Self {
        InspectRuleRequest {
            rules,
            data_name: data_name.into(),
            key_list,
            error_only: 0,
        }
    }
}

/// Response of an `inspect_rule` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectRuleResponse {
    /// Indices of the documents matched by the full condition list.
    pub doc_list: Vec<u32>,
    /// Per-condition match path, root = first condition.
    pub path_info: PathNode,
    /// Suggested refinements, strongest first. Absent on older services.
    #[serde(default)]
    pub hint: Vec<Hint>,
    /// Attributions for each matched document, aligned with `doc_list`.
    #[serde(default)]
    pub top_token_list: Vec<DocumentShap>,
    /// Breakdown of the matched documents over the requested keys.
    pub stat: StatBreakdown,
    /// Training-set comparison, only for datasets that ship one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train_stat: Option<TrainStat>,
}

/// Body of an `update_concept` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateConceptRequest {
    pub concept: Vec<String>,
    pub data_name: String,
}

/// Subpopulation statistics for one concept's member list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptStat {
    pub err_rate: f64,
    pub ci: (f64, f64),
    pub support: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_map_preserves_arrival_order() {
        let json = r#"{"by_label": 1, "by_ADJ": 2, "by_pred": 3, "by_overlap": 4}"#;
        let map: OrderedMap<u32> = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["by_label", "by_ADJ", "by_pred", "by_overlap"]);
        assert_eq!(map.get("by_pred"), Some(&3));
    }

    #[test]
    fn test_ordered_map_round_trip_keeps_order() {
        let json = r#"{"zeta":1,"alpha":2,"mid":3}"#;
        let map: OrderedMap<u32> = serde_json::from_str(json).unwrap();
        assert_eq!(serde_json::to_string(&map).unwrap(), json);
    }

    #[test]
    fn test_ordered_map_insert_replaces_in_place() {
        let mut map = OrderedMap::new();
        map.insert("first", 1);
        map.insert("second", 2);
        map.insert("first", 10);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("first"), Some(&10));
        assert_eq!(map.keys().next(), Some("first"));
    }

    #[test]
    fn test_stat_row_splits_bucket_from_counters() {
        let json = r#"{"label": 2, "is_error": 7, "tot": 25}"#;
        let row: StatRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.bucket_value(), Some(&serde_json::json!(2)));
        assert_eq!(row.error_count(), 7);
        assert_eq!(row.total(), 25);
        assert!((row.error_rate() - 0.28).abs() < 1e-9);
    }

    #[test]
    fn test_stat_row_missing_counter_is_rejected() {
        let err = serde_json::from_str::<StatRow>(r#"{"label": 2, "tot": 25}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_stat_group_orders_rows_by_numeric_key() {
        let json = r#"{
            "2": {"pred": 2, "is_error": 1, "tot": 4},
            "0": {"pred": 0, "is_error": 3, "tot": 10},
            "1": {"pred": 1, "is_error": 2, "tot": 6}
        }"#;
        let group: StatGroup = serde_json::from_str(json).unwrap();
        let buckets: Vec<_> = group
            .rows()
            .iter()
            .map(|row| row.bucket_value().cloned().unwrap())
            .collect();
        assert_eq!(buckets, vec![serde_json::json!(0), serde_json::json!(1), serde_json::json!(2)]);
        assert_eq!(group.max_total(), 10);
    }

    #[test]
    fn test_path_node_flattens_condition_fields() {
        let json = r#"{
            "feature": "only",
            "sign": ">",
            "threshold": 0.5,
            "size": 120,
            "error_rate": 0.35,
            "children": [
                {"feature": "overlap", "sign": "=", "val": 0, "size": 40, "error_rate": 0.6}
            ]
        }"#;
        let node: PathNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.condition.feature(), "only");
        assert_eq!(node.size, 120);

        let chain = node.chain();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[1].condition.value(), Some(0));
        assert!((chain[1].error_rate - 0.6).abs() < 1e-9);

        let echoed = serde_json::to_value(&node).unwrap();
        assert_eq!(echoed["sign"], ">");
        assert_eq!(echoed["children"][0]["val"], 0);
    }

    #[test]
    fn test_inspect_response_tolerates_absent_extras() {
        let json = r#"{
            "doc_list": [3, 11, 42],
            "path_info": {"feature": "never", "sign": ">", "threshold": 0.5, "size": 3, "error_rate": 1.0},
            "stat": {
                "by_label": {"0": {"label": 0, "is_error": 2, "tot": 2}, "1": {"label": 1, "is_error": 1, "tot": 1}}
            }
        }"#;
        let response: InspectRuleResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.doc_list, vec![3, 11, 42]);
        assert!(response.hint.is_empty());
        assert!(response.top_token_list.is_empty());
        assert!(response.train_stat.is_none());
        assert_eq!(response.stat.get("by_label").unwrap().len(), 2);
    }

    #[test]
    fn test_inspect_request_wire_shape() {
        let request = InspectRuleRequest::new(
            vec![Condition::contains("only")],
            "twitter",
            vec!["label".to_string(), "y_pred".to_string()],
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["data_name"], "twitter");
        assert_eq!(json["error_only"], 0);
        assert_eq!(json["rules"][0]["sign"], ">");
    }

    #[test]
    fn test_concept_stat_decode() {
        let json = r#"{"err_rate": 0.42, "ci": [0.35, 0.49], "support": 180}"#;
        let stat: ConceptStat = serde_json::from_str(json).unwrap();
        assert_eq!(stat.support, 180);
        assert!((stat.ci.1 - 0.49).abs() < 1e-9);
    }

    #[test]
    fn test_hint_becomes_containment_condition() {
        let hint = Hint {
            feature: "actually".to_string(),
            sign: Sign::Contains,
            threshold: 0.5,
            err_rate: 0.61,
        };
        let cond = hint.to_condition();
        assert_eq!(cond.feature(), "actually");
        assert_eq!(cond.threshold(), Some(0.5));
    }

    #[test]
    fn test_train_stat_counts_per_label() {
        let json = r#"{"only": [120.0, 40.0, 13.0], "never": [80.0, 95.0, 22.0]}"#;
        let train: TrainStat = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> = train.keys().collect();
        assert_eq!(keys, vec!["only", "never"]);
        assert_eq!(train.get("never").unwrap().len(), 3);
    }
}
