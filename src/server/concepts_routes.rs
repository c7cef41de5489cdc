//! Concept registry HTTP routes
//!
//! CRUD over analyst-defined concepts. Updating a concept's member
//! list relays an update-concept exchange to the statistics backend so
//! the panel can show the concept's own error-rate marker; a failed
//! exchange leaves the members committed and the marker absent.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::backend::ConceptStat;
use crate::concepts::ConceptId;
use crate::session::Session;
use crate::views::ConceptRow;

use super::errors::{session_error, ErrorResponse};

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Serialize)]
pub struct ConceptCreatedResponse {
    pub id: ConceptId,
}

#[derive(Debug, Deserialize)]
pub struct ConceptTextRequest {
    /// Comma-separated member list, free text.
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ConceptUpdatedResponse {
    pub id: ConceptId,
    pub members_text: String,
    pub stat: ConceptStat,
}

#[derive(Debug, Serialize)]
pub struct ConceptListResponse {
    pub base_error_rate: f64,
    pub can_add_condition: bool,
    pub concepts: Vec<ConceptRow>,
}

// ==================
// Routes
// ==================

/// Create concept registry routes
pub fn concepts_routes(session: Arc<Session>) -> Router {
    Router::new()
        .route("/concepts", get(list_concepts_handler))
        .route("/concepts", post(create_concept_handler))
        .route("/concepts/:id", put(update_concept_handler))
        .route("/concepts/:id", delete(remove_concept_handler))
        .with_state(session)
}

// ==================
// Handlers
// ==================

async fn list_concepts_handler(State(session): State<Arc<Session>>) -> Json<ConceptListResponse> {
    let coordinator = session.coordinator().lock().await;
    let panel = coordinator.concept_panel();
    Json(ConceptListResponse {
        base_error_rate: panel.base_error_rate(),
        can_add_condition: panel.can_add_condition(coordinator.registry()),
        concepts: panel.rows(coordinator.registry()),
    })
}

async fn create_concept_handler(
    State(session): State<Arc<Session>>,
) -> (StatusCode, Json<ConceptCreatedResponse>) {
    let id = session.create_concept().await;
    (StatusCode::CREATED, Json(ConceptCreatedResponse { id }))
}

async fn update_concept_handler(
    State(session): State<Arc<Session>>,
    Path(id): Path<ConceptId>,
    Json(request): Json<ConceptTextRequest>,
) -> Result<Json<ConceptUpdatedResponse>, (StatusCode, Json<ErrorResponse>)> {
    let stat = session
        .update_concept(id, &request.text)
        .await
        .map_err(session_error)?;

    let coordinator = session.coordinator().lock().await;
    let members_text = coordinator
        .registry()
        .get(id)
        .map(|concept| concept.render_members())
        .unwrap_or_default();
    Ok(Json(ConceptUpdatedResponse {
        id,
        members_text,
        stat,
    }))
}

async fn remove_concept_handler(
    State(session): State<Arc<Session>>,
    Path(id): Path<ConceptId>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    session.remove_concept(id).await.map_err(session_error)?;
    Ok(StatusCode::NO_CONTENT)
}
