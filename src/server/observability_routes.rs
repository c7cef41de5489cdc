//! Observability HTTP routes
//!
//! Liveness plus the protocol counters of the served session.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::observability::CountersSnapshot;
use crate::session::Session;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub dataset: String,
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub counters: CountersSnapshot,
}

/// Create health routes
pub fn health_routes(session: Arc<Session>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(session)
}

async fn health_handler(State(session): State<Arc<Session>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        dataset: session.dataset().to_string(),
        session_id: session.id(),
        started_at: session.started_at(),
        counters: session.counters().snapshot(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::ProtocolCounters;

    #[test]
    fn test_health_response_serialization() {
        let counters = ProtocolCounters::new();
        counters.increment_requests_issued();

        let response = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            dataset: "twitter".to_string(),
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            counters: counters.snapshot(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["dataset"], "twitter");
        assert_eq!(json["counters"]["requests_issued"], 1);
    }
}
