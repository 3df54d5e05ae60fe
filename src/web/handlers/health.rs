//! Status endpoints.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::datetime::format_naive;
use crate::web::dto::StatusResponse;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

fn status(state: &AppState, status: &str) -> StatusResponse {
    StatusResponse {
        success: true,
        status: status.to_string(),
        timestamp: format_naive(&state.repository.clock().now()),
        service: state.service_name.clone(),
    }
}

/// GET / - Service banner.
pub async fn home(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(status(&state, "success"))
}

/// GET /api/health - Health check.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(status(&state, "healthy"))
}

/// Fallback for unknown routes.
pub async fn endpoint_not_found() -> ApiError {
    ApiError::not_found("Endpoint not found")
}
