//! API route definitions

mod health;
mod research;

use axum::Router;
use crate::AppState;

/// Create all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(research::routes())
        .merge(health::routes())
}
