//! View render-model HTTP routes
//!
//! Read-only render models for the dashboard views, plus the session
//! summary. Each model is produced under the session lock, so a reader
//! never observes a half-applied inspection.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::coordinator::Selection;
use crate::dataset::DatasetDescriptor;
use crate::observability::CountersSnapshot;
use crate::rules::RuleFlavor;
use crate::session::Session;
use crate::views::{
    DocumentCard, DocumentView, ModelSummary, ProjectedDot, StatChart, TokenPolarity, TrainChart,
};

// ==================
// Response Types
// ==================

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub dataset: DatasetDescriptor,
    pub flavor: RuleFlavor,
    pub selection: Selection,
    pub counters: CountersSnapshot,
}

#[derive(Debug, Serialize)]
pub struct DocumentsResponse {
    pub context: Option<String>,
    pub doc_count: usize,
    pub error_count: usize,
    pub shap_labels: Vec<String>,
    pub shap_label: usize,
    pub cards: Vec<DocumentCard>,
    pub polarity: Vec<TokenPolarity>,
}

#[derive(Debug, Deserialize)]
pub struct ShapLabelRequest {
    pub index: usize,
}

#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub context: Option<String>,
    pub has_selection: bool,
    pub dataset: Vec<StatChart>,
    pub selection: Vec<StatChart>,
    pub train: Vec<TrainChart>,
}

#[derive(Debug, Serialize)]
pub struct ProjectionResponse {
    pub context: String,
    pub highlighting: bool,
    pub dots: Vec<ProjectedDot>,
}

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub summary: ModelSummary,
    pub top_token_features: Vec<String>,
    pub top_high_level_features: Vec<String>,
}

// ==================
// Routes
// ==================

/// Create view render-model routes
pub fn views_routes(session: Arc<Session>) -> Router {
    Router::new()
        .route("/session", get(get_session_handler))
        .route("/documents", get(get_documents_handler))
        .route("/documents/shap_label", post(set_shap_label_handler))
        .route("/statistics", get(get_statistics_handler))
        .route("/projection", get(get_projection_handler))
        .route("/overview", get(get_overview_handler))
        .with_state(session)
}

// ==================
// Handlers
// ==================

async fn get_session_handler(State(session): State<Arc<Session>>) -> Json<SessionResponse> {
    let coordinator = session.coordinator().lock().await;
    Json(SessionResponse {
        session_id: session.id(),
        started_at: session.started_at(),
        dataset: coordinator.bundle().descriptor().clone(),
        flavor: coordinator.flavor(),
        selection: coordinator.selection(),
        counters: session.counters().snapshot(),
    })
}

fn documents_model(documents: &DocumentView) -> DocumentsResponse {
    DocumentsResponse {
        context: documents.context().map(str::to_string),
        doc_count: documents.doc_count(),
        error_count: documents.error_count(),
        shap_labels: documents.shap_labels().to_vec(),
        shap_label: documents.shap_label(),
        cards: documents.cards(),
        polarity: documents.shap_summary(),
    }
}

async fn get_documents_handler(State(session): State<Arc<Session>>) -> Json<DocumentsResponse> {
    let coordinator = session.coordinator().lock().await;
    Json(documents_model(coordinator.documents()))
}

async fn set_shap_label_handler(
    State(session): State<Arc<Session>>,
    Json(request): Json<ShapLabelRequest>,
) -> Json<DocumentsResponse> {
    let mut coordinator = session.coordinator().lock().await;
    coordinator.documents_mut().set_shap_label(request.index);
    Json(documents_model(coordinator.documents()))
}

async fn get_statistics_handler(State(session): State<Arc<Session>>) -> Json<StatisticsResponse> {
    let coordinator = session.coordinator().lock().await;
    let statistics = coordinator.statistics();
    Json(StatisticsResponse {
        context: statistics.context().map(str::to_string),
        has_selection: statistics.has_selection(),
        dataset: statistics.dataset_charts(),
        selection: statistics.selection_charts(),
        train: statistics.train_charts(),
    })
}

async fn get_projection_handler(State(session): State<Arc<Session>>) -> Json<ProjectionResponse> {
    let coordinator = session.coordinator().lock().await;
    let projection = coordinator.projection();
    Json(ProjectionResponse {
        context: projection.context().to_string(),
        highlighting: projection.is_highlighting(),
        dots: projection.dots(),
    })
}

async fn get_overview_handler(State(session): State<Arc<Session>>) -> Json<OverviewResponse> {
    let coordinator = session.coordinator().lock().await;
    let overview = coordinator.overview();
    Json(OverviewResponse {
        summary: overview.summary(),
        top_token_features: overview.top_feature_lines(RuleFlavor::TokenBinary),
        top_high_level_features: overview.top_feature_lines(RuleFlavor::HighLevel),
    })
}
