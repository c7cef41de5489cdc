//! Protocol counters for backend exchanges
//!
//! Counters only (no gauges, no histograms):
//! - Monotonic within a session
//! - Reset only on process start
//! - Thread-safe but lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for the inspect protocol between the coordinator and the
/// statistics backend
///
/// All values are exact. Surfaced by the server's health endpoint.
///
/// # Thread Safety
///
/// All counters use atomic operations for thread-safe increments.
/// Uses Relaxed ordering for minimal overhead (eventual consistency is fine for counters).
#[derive(Debug, Default)]
pub struct ProtocolCounters {
    /// Inspect requests issued to the backend
    requests_issued: AtomicU64,
    /// Responses applied to the views
    responses_applied: AtomicU64,
    /// Responses discarded as stale
    stale_discards: AtomicU64,
    /// Failed backend exchanges
    backend_failures: AtomicU64,
}

impl ProtocolCounters {
    /// Create a new counter registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment requests issued
    pub fn increment_requests_issued(&self) {
        self.requests_issued.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment responses applied
    pub fn increment_responses_applied(&self) {
        self.responses_applied.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment stale discards
    pub fn increment_stale_discards(&self) {
        self.stale_discards.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment backend failures
    pub fn increment_backend_failures(&self) {
        self.backend_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get requests issued
    pub fn requests_issued(&self) -> u64 {
        self.requests_issued.load(Ordering::Relaxed)
    }

    /// Get responses applied
    pub fn responses_applied(&self) -> u64 {
        self.responses_applied.load(Ordering::Relaxed)
    }

    /// Get stale discards
    pub fn stale_discards(&self) -> u64 {
        self.stale_discards.load(Ordering::Relaxed)
    }

    /// Get backend failures
    pub fn backend_failures(&self) -> u64 {
        self.backend_failures.load(Ordering::Relaxed)
    }

    /// Get all counters as a point-in-time snapshot
    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            requests_issued: self.requests_issued.load(Ordering::Relaxed),
            responses_applied: self.responses_applied.load(Ordering::Relaxed),
            stale_discards: self.stale_discards.load(Ordering::Relaxed),
            backend_failures: self.backend_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all protocol counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountersSnapshot {
    pub requests_issued: u64,
    pub responses_applied: u64,
    pub stale_discards: u64,
    pub backend_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_counters_are_zero() {
        let counters = ProtocolCounters::new();
        let snapshot = counters.snapshot();

        assert_eq!(snapshot.requests_issued, 0);
        assert_eq!(snapshot.responses_applied, 0);
        assert_eq!(snapshot.stale_discards, 0);
        assert_eq!(snapshot.backend_failures, 0);
    }

    #[test]
    fn test_increment_counters() {
        let counters = ProtocolCounters::new();

        counters.increment_requests_issued();
        counters.increment_requests_issued();
        counters.increment_responses_applied();
        counters.increment_stale_discards();
        counters.increment_backend_failures();

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.requests_issued, 2);
        assert_eq!(snapshot.responses_applied, 1);
        assert_eq!(snapshot.stale_discards, 1);
        assert_eq!(snapshot.backend_failures, 1);
    }

    #[test]
    fn test_getters_match_snapshot() {
        let counters = ProtocolCounters::new();

        counters.increment_requests_issued();
        counters.increment_backend_failures();

        assert_eq!(counters.requests_issued(), 1);
        assert_eq!(counters.responses_applied(), 0);
        assert_eq!(counters.stale_discards(), 0);
        assert_eq!(counters.backend_failures(), 1);
    }

    #[test]
    fn test_snapshot_serializes_as_json() {
        let counters = ProtocolCounters::new();
        counters.increment_requests_issued();
        counters.increment_responses_applied();

        let json = serde_json::to_string(&counters.snapshot()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["requests_issued"], 1);
        assert_eq!(parsed["responses_applied"], 1);
        assert_eq!(parsed["stale_discards"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let counters = Arc::new(ProtocolCounters::new());
        let mut handles = vec![];

        // Spawn multiple threads incrementing counters
        for _ in 0..10 {
            let reg = Arc::clone(&counters);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    reg.increment_requests_issued();
                    reg.increment_responses_applied();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.requests_issued, 1000);
        assert_eq!(snapshot.responses_applied, 1000);
    }

    #[test]
    fn test_monotonic_increase() {
        let counters = ProtocolCounters::new();

        let mut prev = counters.requests_issued();
        for _ in 0..10 {
            counters.increment_requests_issued();
            let current = counters.requests_issued();
            assert!(current >= prev);
            prev = current;
        }
    }
}
