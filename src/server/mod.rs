//! HTTP server
//!
//! Exposes the scraper over two endpoints:
//! - `POST /scrape` runs one scrape request
//! - `GET /` describes the service

mod request;
mod routes;

pub use request::{parse_limit, ErrorResponse, RequestError, ScrapeRequest, ScrapeResponse};
pub use routes::{index_handler, scrape_handler};

use crate::config::Config;
use crate::crawler::Coordinator;
use crate::ScrapeError;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Coordinator,
    pub default_limit: usize,
}

impl AppState {
    pub fn new(coordinator: Coordinator, default_limit: usize) -> Self {
        Self {
            coordinator,
            default_limit,
        }
    }

    /// Builds the state from configuration with the HTTP fetcher and Flipkart parser
    pub fn from_config(config: &Config) -> Result<Self, ScrapeError> {
        Ok(Self::new(
            Coordinator::from_config(config)?,
            config.scrape.default_limit,
        ))
    }
}

/// Builds the application router
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/scrape", post(scrape_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl-C
pub async fn serve(config: &Config) -> Result<(), ScrapeError> {
    let app = build_app(AppState::from_config(config)?);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Scraper API listening on port {}", config.server.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
