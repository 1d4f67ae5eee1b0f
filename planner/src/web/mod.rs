//! HTTP service for the planner
//!
//! Routes:
//! - `GET /` greeting
//! - `GET /health` health check
//! - `POST /plan-project` run the planning crew

pub mod api;
pub mod state;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Configuration for the web server
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

/// Start the web server
pub async fn serve(config: WebConfig, state: AppState) -> Result<()> {
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Starting web server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(api::root))
        .route("/health", get(api::health_check))
        .route("/plan-project", post(api::plan_project))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
