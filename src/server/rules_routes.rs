//! Rule list HTTP routes
//!
//! The ranked rule table, the toggle-select protocol, and the flavor
//! switch. The ordering and filter knobs are session state: a GET that
//! passes them re-ranks the table for every later read.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::coordinator::Selection;
use crate::rules::{LengthFilter, RuleFlavor, RuleId, RuleOrder};
use crate::session::{InspectOutcome, Session};
use crate::views::{RuleRow, SignificanceDisplay};

use super::errors::{session_error, ErrorResponse};

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Deserialize)]
pub struct RulesQuery {
    #[serde(default)]
    pub order: Option<RuleOrder>,
    #[serde(default)]
    pub min_error_rate: Option<f64>,
    /// Condition-count filter; 0 means any length.
    #[serde(default)]
    pub length: Option<usize>,
    #[serde(default)]
    pub significance: Option<SignificanceDisplay>,
}

#[derive(Debug, Serialize)]
pub struct RuleListResponse {
    pub flavor: RuleFlavor,
    pub order: RuleOrder,
    pub error_column: String,
    pub length_histogram: Vec<u32>,
    pub rows: Vec<RuleRow>,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub rule_id: RuleId,
}

#[derive(Debug, Deserialize)]
pub struct FlavorRequest {
    pub flavor: RuleFlavor,
}

/// Selection state after a protocol action settled.
#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub selection: Selection,
    pub seq: Option<u64>,
    pub applied: bool,
}

impl From<InspectOutcome> for SelectionResponse {
    fn from(outcome: InspectOutcome) -> Self {
        SelectionResponse {
            selection: outcome.selection,
            seq: outcome.seq,
            applied: outcome.applied,
        }
    }
}

// ==================
// Routes
// ==================

/// Create rule list routes
pub fn rules_routes(session: Arc<Session>) -> Router {
    Router::new()
        .route("/rules", get(list_rules_handler))
        .route("/rules/select", post(select_rule_handler))
        .route("/rules/unselect", post(unselect_handler))
        .route("/flavor", post(set_flavor_handler))
        .with_state(session)
}

// ==================
// Handlers
// ==================

async fn list_rules_handler(
    State(session): State<Arc<Session>>,
    Query(query): Query<RulesQuery>,
) -> Json<RuleListResponse> {
    let mut coordinator = session.coordinator().lock().await;

    let list = coordinator.rule_list_mut();
    if let Some(order) = query.order {
        list.set_order(order);
    }
    if let Some(threshold) = query.min_error_rate {
        list.set_min_error_rate(threshold);
    }
    if let Some(length) = query.length {
        list.set_length_filter(LengthFilter::from_len(length));
    }
    if let Some(significance) = query.significance {
        list.set_significance(significance);
    }

    let list = coordinator.rule_list();
    Json(RuleListResponse {
        flavor: list.flavor(),
        order: list.order(),
        error_column: list.error_column_header().to_string(),
        length_histogram: list.length_histogram().to_vec(),
        rows: list.rows(),
    })
}

async fn select_rule_handler(
    State(session): State<Arc<Session>>,
    Json(request): Json<SelectRequest>,
) -> Result<Json<SelectionResponse>, (StatusCode, Json<ErrorResponse>)> {
    let outcome = session
        .select_rule(request.rule_id)
        .await
        .map_err(session_error)?;
    Ok(Json(outcome.into()))
}

async fn unselect_handler(State(session): State<Arc<Session>>) -> Json<SelectionResponse> {
    session.unselect().await;
    let coordinator = session.coordinator().lock().await;
    Json(SelectionResponse {
        selection: coordinator.selection(),
        seq: None,
        applied: false,
    })
}

async fn set_flavor_handler(
    State(session): State<Arc<Session>>,
    Json(request): Json<FlavorRequest>,
) -> Json<SelectionResponse> {
    session.set_flavor(request.flavor).await;
    let coordinator = session.coordinator().lock().await;
    Json(SelectionResponse {
        selection: coordinator.selection(),
        seq: None,
        applied: false,
    })
}
