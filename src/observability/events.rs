//! Observable dashboard events
//!
//! Events are explicit and typed. Each variant names one thing that
//! can happen during a session:
//! - Boot & lifecycle
//! - Dataset loading
//! - Inspect round-trips with the statistics backend
//! - Concept registry changes
//! - Rule selection

use std::fmt;

use super::logger::Severity;

/// Observable events in the coordination core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Startup begins
    BootStart,
    /// Startup complete, ready to serve
    BootComplete,
    /// Server accepting requests
    Serving,

    // Configuration
    /// Configuration loaded
    ConfigLoaded,

    // Dataset loading
    /// Dataset load started
    DatasetLoadStart,
    /// Dataset load complete
    DatasetLoadComplete,
    /// Dataset load failed
    DatasetLoadFailed,
    /// Mined-rule artifacts parsed
    ArtifactsParsed,

    // Backend exchanges
    /// Inspect request issued to the statistics backend
    InspectIssued,
    /// Inspect response applied to the views
    InspectApplied,
    /// Inspect response discarded as stale
    StaleResponseDiscarded,
    /// Statistics backend exchange failed
    BackendFailure,

    // Concept registry
    /// Concept created
    ConceptCreated,
    /// Concept membership updated
    ConceptUpdated,
    /// Concept removed
    ConceptRemoved,

    // Rule list
    /// Rule selected in the rule list
    RuleSelected,
    /// Rule selection cleared
    RuleUnselected,
    /// Rule flavor switched (token / high-level feature)
    FlavorSwitched,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            // Boot & Lifecycle
            Event::BootStart => "ERRLENS_STARTUP_BEGIN",
            Event::BootComplete => "ERRLENS_STARTUP_COMPLETE",
            Event::Serving => "ERRLENS_SERVING",

            // Configuration
            Event::ConfigLoaded => "CONFIG_LOADED",

            // Dataset loading
            Event::DatasetLoadStart => "DATASET_LOAD_BEGIN",
            Event::DatasetLoadComplete => "DATASET_LOAD_COMPLETE",
            Event::DatasetLoadFailed => "DATASET_LOAD_ERROR",
            Event::ArtifactsParsed => "ARTIFACTS_PARSED",

            // Backend exchanges
            Event::InspectIssued => "INSPECT_ISSUED",
            Event::InspectApplied => "INSPECT_APPLIED",
            Event::StaleResponseDiscarded => "STALE_RESPONSE_DISCARDED",
            Event::BackendFailure => "BACKEND_FAILURE",

            // Concept registry
            Event::ConceptCreated => "CONCEPT_CREATED",
            Event::ConceptUpdated => "CONCEPT_UPDATED",
            Event::ConceptRemoved => "CONCEPT_REMOVED",

            // Rule list
            Event::RuleSelected => "RULE_SELECTED",
            Event::RuleUnselected => "RULE_UNSELECTED",
            Event::FlavorSwitched => "FLAVOR_SWITCHED",
        }
    }

    /// Returns the severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::DatasetLoadFailed | Event::BackendFailure => Severity::Error,
            Event::StaleResponseDiscarded => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
