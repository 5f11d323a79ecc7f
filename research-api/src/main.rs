//! Web Research Agent API Server
//!
//! HTTP shell around the research pipeline: one endpoint takes a question
//! and returns the synthesized report.

mod routes;

use axum::{
    http::{header, Method},
    Router,
};
use research_agent::ResearchClients;
use research_core::{ResearchConfig, SearchBackend};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Clients every research request builds its agent from
    pub clients: ResearchClients,
    pub model_configured: bool,
    pub search_backend: SearchBackend,
}

impl AppState {
    pub fn new(config: &ResearchConfig, clients: ResearchClients) -> Self {
        Self {
            clients,
            model_configured: config.has_model_credentials(),
            search_backend: config.search_backend,
        }
    }
}

/// Build the router with all routes and middleware
pub fn app(state: AppState) -> Router {
    // Configure CORS for frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,research_api=debug,research_agent=debug")
        }))
        .init();

    info!("Starting Web Research Agent API");

    let config = ResearchConfig::from_env()?;
    let clients = ResearchClients::from_config(&config)?;
    info!(
        "Research clients initialized (search backend: {:?})",
        config.search_backend
    );

    let state = AppState::new(&config, clients);
    let app = app(state);

    // Start server
    let port = std::env::var("SERVER_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
