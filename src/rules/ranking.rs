//! Rule ranking and filtering
//!
//! Pure, stable orderings over a loaded rule set. The canonical store is
//! never reordered: every function returns a fresh id vector, so two views
//! ranking the same set concurrently cannot perturb each other.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::rule::{Rule, RuleId, RuleSet};

/// Two p-values closer than this are treated as tied and fall through to
/// the error-rate tie-break.
const P_VALUE_TIE_EPS: f64 = 1e-4;

/// Sort key for the rule list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOrder {
    /// Training-split error rate, descending.
    #[default]
    ErrorRate,
    /// Matched-document count, descending.
    Support,
    /// Test-split error rate, descending.
    TestError,
    /// One-sided p-value ascending, error rate descending on ties.
    PValue,
}

/// Condition-count filter for the rule list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthFilter {
    /// Keep every rule length.
    #[default]
    Any,
    /// Keep only rules with exactly this many conditions.
    Exactly(usize),
}

impl LengthFilter {
    /// Interprets the analyst-facing encoding: 0 means any length.
    pub fn from_len(len: usize) -> Self {
        if len == 0 {
            LengthFilter::Any
        } else {
            LengthFilter::Exactly(len)
        }
    }

    fn keeps(&self, rule: &Rule) -> bool {
        match self {
            LengthFilter::Any => true,
            LengthFilter::Exactly(len) => rule.len() == *len,
        }
    }
}

/// Returns rule ids sorted by the given key. The sort is stable: rules the
/// key cannot distinguish keep their canonical order.
pub fn rank(set: &RuleSet, order: RuleOrder) -> Vec<RuleId> {
    let mut ids: Vec<RuleId> = set.iter().map(Rule::id).collect();
    ids.sort_by(|&a, &b| {
        // Ids come from the set itself, so both lookups succeed.
        match (set.get(a), set.get(b)) {
            (Some(ra), Some(rb)) => compare(ra, rb, order),
            _ => Ordering::Equal,
        }
    });
    ids
}

/// Whether a rule survives the error-rate and length filters.
pub fn passes(rule: &Rule, min_error_rate: f64, length: LengthFilter) -> bool {
    rule.error_rate() >= min_error_rate && length.keeps(rule)
}

/// Returns the ids of rules surviving the filters, in canonical order.
pub fn filter(set: &RuleSet, min_error_rate: f64, length: LengthFilter) -> Vec<RuleId> {
    set.iter()
        .filter(|rule| passes(rule, min_error_rate, length))
        .map(Rule::id)
        .collect()
}

fn compare(a: &Rule, b: &Rule, order: RuleOrder) -> Ordering {
    match order {
        RuleOrder::ErrorRate => desc(a.error_rate(), b.error_rate()),
        RuleOrder::Support => b.support().cmp(&a.support()),
        RuleOrder::TestError => desc(a.error_rate_test(), b.error_rate_test()),
        RuleOrder::PValue => {
            if (a.p_value() - b.p_value()).abs() < P_VALUE_TIE_EPS {
                desc(a.error_rate(), b.error_rate())
            } else {
                asc(a.p_value(), b.p_value())
            }
        }
    }
}

fn asc(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
