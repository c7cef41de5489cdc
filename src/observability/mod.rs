//! Observability subsystem
//!
//! This module provides:
//! - Structured logging (JSON lines)
//! - Typed dashboard events
//! - Protocol counters for backend exchanges
//! - Operation scopes for begin/complete tracing
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on execution
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use errlens::observability::{Logger, Event, ProtocolCounters, ObservationScope};
//!
//! // Log an event
//! Logger::info("INSPECT_APPLIED", &[("seq", "3")]);
//!
//! // Track protocol counters
//! let counters = ProtocolCounters::new();
//! counters.increment_requests_issued();
//!
//! // Scope-based logging
//! let scope = ObservationScope::new("DATASET_LOAD");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{CountersSnapshot, ProtocolCounters};
pub use scope::{ObservationScope, Timer};

/// Log a dashboard event at its inherent severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a dashboard event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // This just verifies no panic
        log_event(Event::BootStart);
        log_event(Event::BootComplete);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::ConfigLoaded, &[
            ("data_dir", "/tmp/test"),
        ]);
    }
}
