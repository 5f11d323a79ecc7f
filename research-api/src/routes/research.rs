//! Research endpoint

use std::time::Instant;

use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::AppState;

/// Create research routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/research", post(run_research))
}

#[derive(Debug, Deserialize)]
struct ResearchRequest {
    query: String,
}

#[derive(Debug, Serialize)]
struct ResearchResponse {
    query: String,
    report: String,
    elapsed_secs: f64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Run the full research pipeline for one question
///
/// The report is returned even when it is an error or apology message; only
/// a blank query is rejected.
async fn run_research(
    State(state): State<AppState>,
    Json(request): Json<ResearchRequest>,
) -> impl IntoResponse {
    let query = request.query.trim();
    if query.is_empty() {
        warn!("Rejected research request with empty query");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Please enter a research query.".to_string(),
            }),
        )
            .into_response();
    }

    info!("Research requested: {}", query);
    let started = Instant::now();

    let agent = state.clients.agent();
    let report = agent.research(query).await;

    (
        StatusCode::OK,
        Json(ResearchResponse {
            query: query.to_string(),
            report,
            elapsed_secs: started.elapsed().as_secs_f64(),
        }),
    )
        .into_response()
}
