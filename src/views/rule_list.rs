//! Rule list view
//!
//! Ranked, filterable table of mined rules. Row numbering follows the
//! rank position under the current ordering, not the visible position:
//! when a filter hides the top two rows, the first visible row still
//! reads "R3". Clicking a row toggles selection and announces it on the
//! view's bus.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::bus::{EventBus, EventKind};
use crate::dataset::DatasetDescriptor;
use crate::rules::{
    passes, rank, Condition, LengthFilter, Rule, RuleFlavor, RuleId, RuleOrder, RuleSet, Sign,
};

/// Events the rule list emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleListEvent {
    /// A rule row was selected.
    Selected(RuleId),
    /// The selected row was clicked again.
    Unselected,
}

impl EventKind for RuleListEvent {
    fn kind(&self) -> &'static str {
        match self {
            RuleListEvent::Selected(_) => "rule_selected",
            RuleListEvent::Unselected => "rule_unselected",
        }
    }
}

/// How the significance figure next to the error rate is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignificanceDisplay {
    /// One-sided p-value, two decimals.
    #[default]
    PValue,
    /// 95% confidence interval as a percent range.
    ConfidenceInterval,
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleRow {
    id: RuleId,
    name: String,
    error_rate: f64,
    error_text: String,
    high_rate: bool,
    support: usize,
    clause: String,
    selected: bool,
}

impl RuleRow {
    pub fn id(&self) -> RuleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }

    pub fn error_text(&self) -> &str {
        &self.error_text
    }

    /// Whether the rate exceeds the model's base error rate.
    pub fn high_rate(&self) -> bool {
        self.high_rate
    }

    pub fn support(&self) -> usize {
        self.support
    }

    pub fn clause(&self) -> &str {
        &self.clause
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }
}

/// The rule list's state: the loaded set, ordering and filter knobs, and
/// the current selection.
pub struct RuleListView {
    rules: Arc<RuleSet>,
    descriptor: Arc<DatasetDescriptor>,
    flavor: RuleFlavor,
    order: RuleOrder,
    min_error_rate: f64,
    length: LengthFilter,
    significance: SignificanceDisplay,
    selected: Option<RuleId>,
    bus: EventBus<RuleListEvent>,
}

impl RuleListView {
    pub fn new(
        rules: Arc<RuleSet>,
        descriptor: Arc<DatasetDescriptor>,
        flavor: RuleFlavor,
    ) -> Self {
        Self {
            rules,
            descriptor,
            flavor,
            order: RuleOrder::default(),
            min_error_rate: 0.0,
            length: LengthFilter::default(),
            significance: SignificanceDisplay::default(),
            selected: None,
            bus: EventBus::new(),
        }
    }

    pub fn bus(&self) -> &EventBus<RuleListEvent> {
        &self.bus
    }

    pub fn rules(&self) -> &Arc<RuleSet> {
        &self.rules
    }

    pub fn flavor(&self) -> RuleFlavor {
        self.flavor
    }

    pub fn order(&self) -> RuleOrder {
        self.order
    }

    pub fn set_order(&mut self, order: RuleOrder) {
        self.order = order;
    }

    pub fn set_min_error_rate(&mut self, threshold: f64) {
        self.min_error_rate = threshold;
    }

    pub fn set_length_filter(&mut self, length: LengthFilter) {
        self.length = length;
    }

    pub fn set_significance(&mut self, significance: SignificanceDisplay) {
        self.significance = significance;
    }

    /// Swaps in another mined set (flavor switch). Ordering, filters and
    /// the selection all reset to their defaults; no event is emitted,
    /// the caller decides what the reset means downstream.
    pub fn replace_rules(&mut self, rules: Arc<RuleSet>, flavor: RuleFlavor) {
        self.rules = rules;
        self.flavor = flavor;
        self.order = RuleOrder::default();
        self.min_error_rate = 0.0;
        self.length = LengthFilter::default();
        self.selected = None;
    }

    pub fn selected(&self) -> Option<RuleId> {
        self.selected
    }

    /// One-based rank of a rule under the current ordering, ignoring
    /// filters. This is the number shown on its row and in context
    /// labels elsewhere.
    pub fn display_rank(&self, id: RuleId) -> Option<usize> {
        rank(&self.rules, self.order)
            .iter()
            .position(|ranked| *ranked == id)
            .map(|position| position + 1)
    }

    /// Rule-length histogram of the loaded set.
    pub fn length_histogram(&self) -> &[u32] {
        self.rules.length_histogram()
    }

    pub fn error_column_header(&self) -> &'static str {
        match self.significance {
            SignificanceDisplay::PValue => "err_rate (pval)",
            SignificanceDisplay::ConfidenceInterval => "err_rate (95% CI)",
        }
    }

    /// Rows in display order under the current ordering and filters.
    pub fn rows(&self) -> Vec<RuleRow> {
        let ranked = rank(&self.rules, self.order);
        let mut rows = Vec::with_capacity(ranked.len());
        for (position, id) in ranked.iter().enumerate() {
            let Some(rule) = self.rules.get(*id) else {
                continue;
            };
            if !passes(rule, self.min_error_rate, self.length) {
                continue;
            }
            rows.push(self.row(rule, position + 1));
        }
        rows
    }

    /// Toggles the clicked row: selecting it, or unselecting when it is
    /// already the selection. Unknown ids are ignored.
    pub fn click(&mut self, id: RuleId) {
        if self.selected == Some(id) {
            self.selected = None;
            self.bus.emit(RuleListEvent::Unselected);
            return;
        }
        if self.rules.get(id).is_none() {
            return;
        }
        self.selected = Some(id);
        self.bus.emit(RuleListEvent::Selected(id));
    }

    /// Drops the selection highlight without emitting. Used when an
    /// edited rule takes over the inspection context, which never
    /// corresponds to a row of the loaded list.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    fn row(&self, rule: &Rule, rank_position: usize) -> RuleRow {
        let error_rate = rule.error_rate();
        let significance = match self.significance {
            SignificanceDisplay::PValue => format!("{:.2}", rule.p_value()),
            SignificanceDisplay::ConfidenceInterval => {
                let (low, high) = rule.confidence_interval();
                format!("{:.0}%-{:.0}%", low * 100.0, high * 100.0)
            }
        };
        RuleRow {
            id: rule.id(),
            name: format!("R{}", rank_position),
            error_rate,
            error_text: format!("{:.0}%({})", error_rate * 100.0, significance),
            high_rate: error_rate > self.descriptor.base_error_rate(),
            support: rule.support(),
            clause: self.clause_text(rule),
            selected: self.selected == Some(rule.id()),
        }
    }

    fn clause_text(&self, rule: &Rule) -> String {
        let terms: Vec<String> = rule
            .conditions()
            .iter()
            .map(|condition| self.condition_text(condition))
            .collect();
        let prefix = match self.flavor {
            RuleFlavor::TokenBinary => "IF contain ",
            RuleFlavor::HighLevel => "IF ",
        };
        format!(
            "{}{} THEN {:.0}% errors",
            prefix,
            terms.join(" AND "),
            rule.error_rate() * 100.0
        )
    }

    fn condition_text(&self, condition: &Condition) -> String {
        if self.flavor == RuleFlavor::TokenBinary {
            return condition.feature().to_string();
        }
        match (condition.sign(), condition.value()) {
            (Sign::Equals, Some(value)) => {
                // The prediction pseudo-feature holds a label index, not
                // a discretized bucket, and is shown raw.
                let shown = if condition.feature() == "pred" {
                    value.to_string()
                } else {
                    usize::try_from(value)
                        .ok()
                        .and_then(|index| self.descriptor.value_name(index))
                        .map(str::to_string)
                        .unwrap_or_else(|| value.to_string())
                };
                format!("{}={}", condition.feature(), shown)
            }
            _ => condition.feature().to_string(),
        }
    }
}
