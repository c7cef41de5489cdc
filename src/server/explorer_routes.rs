//! Condition explorer HTTP routes
//!
//! Building, trimming, and submitting the pending condition path. A
//! condition arrives in one of three source shapes: free-text token,
//! high-level feature with a free-text value, or a concept reference.
//! An unparsable feature value drops the add without an error; the
//! returned render model shows whether the path grew.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::backend::Hint;
use crate::concepts::ConceptId;
use crate::coordinator::Coordinator;
use crate::session::Session;
use crate::views::PathRow;

use super::errors::{session_error, ErrorResponse};
use super::rules_routes::SelectionResponse;

// ==================
// Request/Response Types
// ==================

/// The three shapes an added condition can arrive in.
#[derive(Debug, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum AddConditionRequest {
    Token { text: String },
    Feature { feature: String, value: String },
    Concept { concept_id: ConceptId },
}

#[derive(Debug, Serialize)]
pub struct ExplorerResponse {
    /// Chip labels of the pending conditions, in path order.
    pub pending: Vec<String>,
    /// The applied match path, root first.
    pub path: Vec<PathRow>,
    /// Suggested refinements for the inspected subpopulation.
    pub hints: Vec<Hint>,
}

// ==================
// Routes
// ==================

/// Create explorer routes
pub fn explorer_routes(session: Arc<Session>) -> Router {
    Router::new()
        .route("/explorer", get(get_explorer_handler))
        .route("/explorer/conditions", post(add_condition_handler))
        .route("/explorer/conditions/:index", delete(remove_condition_handler))
        .route("/explorer/reset", post(reset_handler))
        .route("/explorer/inspect", post(inspect_handler))
        .with_state(session)
}

fn explorer_model(coordinator: &Coordinator) -> ExplorerResponse {
    let explorer = coordinator.explorer();
    ExplorerResponse {
        pending: explorer.pending_labels(),
        path: explorer.path_rows(),
        hints: explorer.hints().to_vec(),
    }
}

// ==================
// Handlers
// ==================

async fn get_explorer_handler(State(session): State<Arc<Session>>) -> Json<ExplorerResponse> {
    let coordinator = session.coordinator().lock().await;
    Json(explorer_model(&coordinator))
}

async fn add_condition_handler(
    State(session): State<Arc<Session>>,
    Json(request): Json<AddConditionRequest>,
) -> Result<Json<ExplorerResponse>, (StatusCode, Json<ErrorResponse>)> {
    match request {
        AddConditionRequest::Token { text } => session.add_token_condition(&text).await,
        AddConditionRequest::Feature { feature, value } => {
            session.add_feature_condition(&feature, &value).await
        }
        AddConditionRequest::Concept { concept_id } => session
            .add_concept_condition(concept_id)
            .await
            .map_err(session_error)?,
    }

    let coordinator = session.coordinator().lock().await;
    Ok(Json(explorer_model(&coordinator)))
}

async fn remove_condition_handler(
    State(session): State<Arc<Session>>,
    Path(index): Path<usize>,
) -> Json<ExplorerResponse> {
    session.remove_condition(index).await;
    let coordinator = session.coordinator().lock().await;
    Json(explorer_model(&coordinator))
}

async fn reset_handler(State(session): State<Arc<Session>>) -> Json<ExplorerResponse> {
    session.reset_explorer().await;
    let coordinator = session.coordinator().lock().await;
    Json(explorer_model(&coordinator))
}

async fn inspect_handler(
    State(session): State<Arc<Session>>,
) -> Result<Json<SelectionResponse>, (StatusCode, Json<ErrorResponse>)> {
    let outcome = session.submit_explorer().await.map_err(session_error)?;
    Ok(Json(outcome.into()))
}
