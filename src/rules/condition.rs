//! Condition types
//!
//! A condition is one atomic test within a rule:
//! - `>`  token containment, tested against an implicit 0.5 threshold
//! - `=`  discretized high-level feature equality (bucket or label index)
//! - `is` membership in an analyst-defined concept's token list
//!
//! The operand kind is fully determined by the sign; constructors and the
//! wire decoder both enforce the pairing, so a mismatched condition cannot
//! be represented.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

/// Feature-name prefix that marks a concept reference.
pub const CONCEPT_FEATURE_PREFIX: &str = "concept_";

/// Implicit threshold for token-containment tests.
pub const CONTAINMENT_THRESHOLD: f64 = 0.5;

/// Comparison operator of a condition, serialized with the wire spelling
/// understood by the statistics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sign {
    /// Document contains the feature token (`>`).
    #[serde(rename = ">")]
    Contains,
    /// Discretized feature equals a value (`=`).
    #[serde(rename = "=")]
    Equals,
    /// Document matches a concept's member list (`is`).
    #[serde(rename = "is")]
    MemberOf,
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sign::Contains => write!(f, ">"),
            Sign::Equals => write!(f, "="),
            Sign::MemberOf => write!(f, "is"),
        }
    }
}

/// Operand of a condition. The kind is determined by the sign.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Containment threshold (always 0.5 on the wire).
    Threshold(f64),
    /// Discretized bucket or label index.
    Value(i64),
    /// Concept member tokens. Empty until resolved for a bare reference.
    Members(Vec<String>),
}

/// One atomic test within a rule.
///
/// Immutable after construction; resolution of concept operands produces a
/// new condition rather than mutating in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    feature: String,
    sign: Sign,
    operand: Operand,
}

impl Condition {
    /// Token-containment condition over `feature`.
    pub fn contains(feature: impl Into<String>) -> Self {
        Self {
            feature: feature.into(),
            sign: Sign::Contains,
            operand: Operand::Threshold(CONTAINMENT_THRESHOLD),
        }
    }

    /// Equality condition over a discretized feature.
    pub fn equals(feature: impl Into<String>, value: i64) -> Self {
        Self {
            feature: feature.into(),
            sign: Sign::Equals,
            operand: Operand::Value(value),
        }
    }

    /// Concept-membership condition with an explicit member list.
    pub fn member_of(feature: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            feature: feature.into(),
            sign: Sign::MemberOf,
            operand: Operand::Members(members),
        }
    }

    /// Unresolved reference to the concept with the given id.
    pub fn concept_ref(concept_id: u32) -> Self {
        Self::member_of(format!("{}{}", CONCEPT_FEATURE_PREFIX, concept_id), Vec::new())
    }

    pub fn feature(&self) -> &str {
        &self.feature
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }

    pub fn operand(&self) -> &Operand {
        &self.operand
    }

    /// Containment threshold, for `>` conditions.
    pub fn threshold(&self) -> Option<f64> {
        match self.operand {
            Operand::Threshold(t) => Some(t),
            _ => None,
        }
    }

    /// Discretized value, for `=` conditions.
    pub fn value(&self) -> Option<i64> {
        match self.operand {
            Operand::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Member tokens, for `is` conditions.
    pub fn members(&self) -> Option<&[String]> {
        match &self.operand {
            Operand::Members(m) => Some(m),
            _ => None,
        }
    }

    /// Concept id embedded in the feature name of an `is` condition.
    ///
    /// Returns `None` for other signs and for feature names that do not
    /// follow the `concept_<id>` form.
    pub fn concept_id(&self) -> Option<u32> {
        if self.sign != Sign::MemberOf {
            return None;
        }
        self.feature
            .strip_prefix(CONCEPT_FEATURE_PREFIX)?
            .parse()
            .ok()
    }

    /// Replaces the member list of an `is` condition, leaving other signs
    /// untouched. Used by concept resolution.
    pub fn with_members(&self, members: Vec<String>) -> Self {
        match self.sign {
            Sign::MemberOf => Self {
                feature: self.feature.clone(),
                sign: self.sign,
                operand: Operand::Members(members),
            },
            _ => self.clone(),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.operand {
            Operand::Threshold(_) => write!(f, "contain: {}", self.feature),
            Operand::Value(v) => write!(f, "{} = {}", self.feature, v),
            Operand::Members(m) => write!(f, "{} is [{}]", self.feature, m.join(", ")),
        }
    }
}

// Wire form: `>` carries a "threshold" field, `=` and `is` carry "val".
// This is the shape shared by the mining artifact (post feature-name
// resolution), the backend request body, and the render models.
impl Serialize for Condition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Condition", 3)?;
        state.serialize_field("feature", &self.feature)?;
        state.serialize_field("sign", &self.sign)?;
        match &self.operand {
            Operand::Threshold(t) => state.serialize_field("threshold", t)?,
            Operand::Value(v) => state.serialize_field("val", v)?,
            Operand::Members(m) => state.serialize_field("val", m)?,
        }
        state.end()
    }
}

/// Permissive wire shape, validated into [`Condition`].
#[derive(Deserialize)]
struct RawCondition {
    feature: String,
    sign: Sign,
    #[serde(default)]
    threshold: Option<f64>,
    #[serde(default)]
    val: Option<serde_json::Value>,
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawCondition::deserialize(deserializer)?;
        let operand = match raw.sign {
            Sign::Contains => {
                let t = raw.threshold.unwrap_or(CONTAINMENT_THRESHOLD);
                Operand::Threshold(t)
            }
            Sign::Equals => {
                let v = raw
                    .val
                    .as_ref()
                    .and_then(|v| v.as_i64())
                    .ok_or_else(|| de::Error::custom("'=' condition requires an integer 'val'"))?;
                Operand::Value(v)
            }
            Sign::MemberOf => {
                let members = match raw.val {
                    None => Vec::new(),
                    Some(serde_json::Value::Array(items)) => items
                        .into_iter()
                        .map(|item| match item {
                            serde_json::Value::String(s) => Ok(s),
                            other => Err(de::Error::custom(format!(
                                "'is' condition member must be a string, got {}",
                                other
                            ))),
                        })
                        .collect::<Result<Vec<_>, _>>()?,
                    Some(other) => {
                        return Err(de::Error::custom(format!(
                            "'is' condition requires a token list 'val', got {}",
                            other
                        )))
                    }
                };
                Operand::Members(members)
            }
        };
        Ok(Condition {
            feature: raw.feature,
            sign: raw.sign,
            operand,
        })
    }
}
