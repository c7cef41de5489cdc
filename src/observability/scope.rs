//! Begin/complete tracing for multi-step operations
//!
//! An [`ObservationScope`] brackets an operation such as a dataset
//! load or an inspect exchange. Creating it logs `{NAME}_BEGIN`;
//! settling it logs `{NAME}_COMPLETE` or `{NAME}_ERROR`. A scope that
//! is dropped unsettled logs `{NAME}_INCOMPLETE` at WARN, so a missing
//! completion shows up in the stream instead of vanishing.

use std::time::Instant;

use super::logger::{Logger, Severity};

/// A traced operation. Fields given at creation are repeated on every
/// line the scope emits, so the begin, complete, and error lines of
/// one operation correlate without a request id.
pub struct ObservationScope {
    name: String,
    fields: Vec<(String, String)>,
    settled: bool,
}

impl ObservationScope {
    /// Opens a scope and logs `{name}_BEGIN`.
    pub fn new(name: &str) -> Self {
        Self::with_fields(name, &[])
    }

    /// Opens a scope whose fields ride along on every emitted line.
    pub fn with_fields(name: &str, fields: &[(&str, &str)]) -> Self {
        let scope = Self {
            name: name.to_string(),
            fields: fields
                .iter()
                .map(|&(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            settled: false,
        };
        scope.emit(Severity::Info, "BEGIN", &[]);
        scope
    }

    /// Settles the scope successfully, logging `{name}_COMPLETE`.
    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    /// Settles successfully with outcome fields added to the line.
    pub fn complete_with_fields(mut self, extra: &[(&str, &str)]) {
        self.settled = true;
        self.emit(Severity::Info, "COMPLETE", extra);
    }

    /// Settles as failed, logging `{name}_ERROR` with the reason.
    pub fn fail(mut self, reason: &str) {
        self.settled = true;
        self.emit(Severity::Error, "ERROR", &[("reason", reason)]);
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    fn emit(&self, severity: Severity, suffix: &str, extra: &[(&str, &str)]) {
        let event = format!("{}_{}", self.name, suffix);
        let mut line_fields: Vec<(&str, &str)> = self
            .fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        line_fields.extend_from_slice(extra);
        Logger::log(severity, &event, &line_fields);
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.settled {
            self.emit(
                Severity::Warn,
                "INCOMPLETE",
                &[("reason", "dropped without settling")],
            );
        }
    }
}

/// Wall-clock timer for elapsed-time fields.
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed milliseconds, rendered for a log field.
    pub fn elapsed_ms(&self) -> String {
        self.start.elapsed().as_millis().to_string()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
