//! HTTP error mapping
//!
//! Maps session errors onto status codes: unknown rule or concept ids
//! are 404, a failed condition resolution is 422, a failed backend
//! exchange is 502, malformed analyst input is 400, and dataset faults
//! are 500.

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::concepts::ConceptError;
use crate::coordinator::CoordinatorError;
use crate::session::SessionError;

/// Error body returned by every failing handler.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

/// Converts a session error into the handler rejection tuple.
pub fn session_error(err: SessionError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        SessionError::Coordinator(CoordinatorError::UnknownRule(_)) => StatusCode::NOT_FOUND,
        SessionError::Coordinator(CoordinatorError::Concept(ConceptError::UnknownConcept(_))) => {
            StatusCode::NOT_FOUND
        }
        SessionError::Coordinator(CoordinatorError::Concept(
            ConceptError::MalformedReference(_),
        )) => StatusCode::BAD_REQUEST,
        SessionError::Resolution(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SessionError::Backend(_) => StatusCode::BAD_GATEWAY,
        SessionError::Dataset(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: status.as_u16(),
        }),
    )
}
