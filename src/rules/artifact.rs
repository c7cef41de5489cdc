//! Mining-artifact parsing
//!
//! A mined artifact arrives as two JSON documents per flavor:
//! - the rule list: rule records (condition triples over feature indices,
//!   matched document indices, error rates, significance) plus side tables
//!   (target label names, rule-length histogram, top error-correlated
//!   features)
//! - the feature table: the column-name lookup that condition feature
//!   indices address
//!
//! Parsing resolves every feature index to its name and applies the
//! configured pre-filter, producing the immutable [`RuleSet`].

use serde::Deserialize;

use super::condition::{Condition, Sign};
use super::errors::{RuleError, RuleResult};
use super::rule::{Rule, RuleSet, TopFeature};

/// Which mined artifact family a rule set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleFlavor {
    /// Conditions over raw token presence.
    TokenBinary,
    /// Conditions over discretized high-level linguistic features.
    HighLevel,
}

impl RuleFlavor {
    /// Artifact subdirectory name for this flavor.
    pub fn dir_name(&self) -> &'static str {
        match self {
            RuleFlavor::TokenBinary => "rule",
            RuleFlavor::HighLevel => "hfeat",
        }
    }
}

impl std::fmt::Display for RuleFlavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleFlavor::TokenBinary => write!(f, "token_binary"),
            RuleFlavor::HighLevel => write!(f, "high_level"),
        }
    }
}

/// Pre-filter applied while parsing an artifact.
///
/// Echoes the thresholds the miner ran with; records failing them are
/// dropped before the rule set is built.
#[derive(Debug, Clone, PartialEq, serde::Serialize, Deserialize)]
pub struct MiningFilter {
    /// Minimum matched-document count.
    #[serde(default = "default_min_support")]
    pub min_support: usize,
    /// Maximum conditions per rule.
    #[serde(default = "default_max_conditions")]
    pub max_conditions: usize,
}

fn default_min_support() -> usize {
    20
}

fn default_max_conditions() -> usize {
    3
}

impl Default for MiningFilter {
    fn default() -> Self {
        Self {
            min_support: default_min_support(),
            max_conditions: default_max_conditions(),
        }
    }
}

impl MiningFilter {
    fn keeps(&self, record: &RawRule) -> bool {
        record.doc_idx.len() >= self.min_support && record.rules.len() <= self.max_conditions
    }
}

/// Feature-name lookup table, one per flavor.
///
/// The token-binary flavor indexes the curated `good_cols` subset; the
/// high-level flavor indexes the full column list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureTable {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    good_cols: Vec<String>,
}

impl FeatureTable {
    pub fn from_json(content: &str) -> RuleResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| RuleError::malformed(format!("feature table: {}", e)))
    }

    /// Name list addressed by feature indices of the given flavor.
    pub fn names(&self, flavor: RuleFlavor) -> &[String] {
        match flavor {
            RuleFlavor::TokenBinary => &self.good_cols,
            RuleFlavor::HighLevel => &self.columns,
        }
    }

    /// Resolves one feature index to its name.
    pub fn resolve(&self, flavor: RuleFlavor, index: usize) -> RuleResult<&str> {
        let names = self.names(flavor);
        names
            .get(index)
            .map(String::as_str)
            .ok_or(RuleError::UnknownFeatureIndex {
                index,
                table_len: names.len(),
            })
    }
}

/// Parsed rule-list artifact, prior to feature-name resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleArtifact {
    rule_lists: Vec<RawRule>,
    #[serde(default)]
    target_names: Vec<String>,
    #[serde(default)]
    histogram: Vec<u32>,
    #[serde(default)]
    top_list: Vec<RawTopFeature>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawRule {
    rules: Vec<RawCondition>,
    doc_idx: Vec<u32>,
    err_rate: f64,
    #[serde(default)]
    err_rate_test: f64,
    #[serde(default = "default_p_value")]
    p_one: f64,
    #[serde(default)]
    ci: Option<[f64; 2]>,
    #[serde(default)]
    label: usize,
}

// A record without a significance test sorts last under the p-value order.
fn default_p_value() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
struct RawCondition {
    feature: usize,
    sign: Sign,
    #[serde(default)]
    val: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawTopFeature {
    feature: usize,
    #[serde(default)]
    val: Option<f64>,
    err_rate: f64,
}

impl RuleArtifact {
    pub fn from_json(content: &str) -> RuleResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| RuleError::malformed(format!("rule list: {}", e)))
    }

    /// Number of rule records before filtering.
    pub fn record_count(&self) -> usize {
        self.rule_lists.len()
    }

    /// Resolves feature names and applies the pre-filter, producing the
    /// immutable rule set. Rule ids are assigned by position in the kept
    /// order.
    pub fn build(&self, table: &FeatureTable, flavor: RuleFlavor, filter: &MiningFilter) -> RuleResult<RuleSet> {
        let mut rules = Vec::new();
        for record in self.rule_lists.iter().filter(|r| filter.keeps(r)) {
            let id = rules.len();
            let conditions = record
                .rules
                .iter()
                .map(|raw| resolve_condition(raw, table, flavor))
                .collect::<RuleResult<Vec<_>>>()?;
            let ci = record.ci.unwrap_or([record.err_rate, record.err_rate]);
            rules.push(Rule::new(
                id,
                conditions,
                record.err_rate,
                record.err_rate_test,
                (ci[0], ci[1]),
                record.p_one,
                record.doc_idx.clone(),
                record.label,
            ));
        }

        let histogram = if self.histogram.is_empty() {
            length_histogram(&rules)
        } else {
            self.histogram.clone()
        };

        let top_features = self
            .top_list
            .iter()
            .map(|raw| {
                Ok(TopFeature {
                    feature: table.resolve(flavor, raw.feature)?.to_string(),
                    val: raw.val.map(|v| v.round() as i64),
                    err_rate: raw.err_rate,
                })
            })
            .collect::<RuleResult<Vec<_>>>()?;

        Ok(RuleSet::new(rules, self.target_names.clone(), histogram, top_features))
    }
}

fn resolve_condition(raw: &RawCondition, table: &FeatureTable, flavor: RuleFlavor) -> RuleResult<Condition> {
    let feature = table.resolve(flavor, raw.feature)?.to_string();
    match raw.sign {
        Sign::Contains => Ok(Condition::contains(feature)),
        Sign::Equals => {
            let val = raw.val.ok_or_else(|| {
                RuleError::malformed(format!("'=' condition on '{}' lacks a value", feature))
            })?;
            Ok(Condition::equals(feature, val))
        }
        // Concepts are analyst-defined; a mined artifact never contains them.
        Sign::MemberOf => Err(RuleError::malformed(format!(
            "mined condition on '{}' uses the 'is' sign",
            feature
        ))),
    }
}

fn length_histogram(rules: &[Rule]) -> Vec<u32> {
    let max_len = rules.iter().map(Rule::len).max().unwrap_or(0);
    let mut histogram = vec![0u32; max_len + 1];
    for rule in rules {
        histogram[rule.len()] += 1;
    }
    histogram
}
