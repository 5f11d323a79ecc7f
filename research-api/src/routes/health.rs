//! Health check endpoints

use axum::{extract::State, response::Json, routing::get, Router};
use research_core::SearchBackend;
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    model_configured: bool,
    search_backend: SearchBackend,
}

/// Health check handler
///
/// A missing model key degrades every report to an error message, so it is
/// reported as "degraded" rather than failing the check.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.model_configured {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        model_configured: state.model_configured,
        search_backend: state.search_backend,
    })
}

/// Simple liveness check (always returns OK if server is running)
async fn liveness() -> &'static str {
    "OK"
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
}
