//! Selection state machine
//!
//! Three states: nothing selected, a mined rule from the loaded list,
//! or an analyst-edited condition path. The selected rule id is part of
//! the state so a second click on the same row can be recognized as a
//! toggle-off.

use serde::Serialize;

use crate::rules::RuleId;

/// What the dashboard is currently inspecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "rule_id", rename_all = "snake_case")]
pub enum Selection {
    /// No subpopulation selected; views show the whole dataset.
    #[default]
    Idle,
    /// A rule from the loaded list.
    Rule(RuleId),
    /// A condition path built in the explorer.
    Edited,
}

impl Selection {
    pub fn is_idle(&self) -> bool {
        matches!(self, Selection::Idle)
    }

    /// Selected rule id, when the selection is a list rule.
    pub fn rule_id(&self) -> Option<RuleId> {
        match self {
            Selection::Rule(id) => Some(*id),
            _ => None,
        }
    }
}
