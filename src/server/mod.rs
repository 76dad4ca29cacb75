//! HTTP service
//!
//! This module wires the download pipeline into an axum application:
//! - Shared per-process state (configuration, HTTP client, robots.txt cache)
//! - The router with the download and index endpoints
//! - The listener loop

mod error;
mod handler;

pub use error::ApiError;
pub use handler::{
    download, index, validate_request, DownloadRequest, ValidatedRequest, ARCHIVE_FILE_NAME,
};

use crate::config::Config;
use crate::fetcher::{build_http_client, build_robots_client};
use crate::robots::RobotsChecker;
use crate::FetcherError;
use axum::{
    routing::{get, post},
    Router,
};
use reqwest::Client;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// State shared by every request
pub struct AppState {
    pub config: Config,
    pub client: Client,
    pub robots: RobotsChecker,
}

impl AppState {
    /// Builds the state from the service configuration
    pub fn new(config: Config) -> Result<Self, FetcherError> {
        let client = build_http_client(&config)?;
        let robots = RobotsChecker::from_config(build_robots_client(&config)?, &config);
        Ok(Self {
            config,
            client,
            robots,
        })
    }
}

/// Creates the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/download", post(download))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs the service until the listener fails
///
/// # Arguments
///
/// * `config` - Validated service configuration
///
/// # Returns
///
/// * `Ok(())` - The server shut down
/// * `Err(FetcherError)` - The address could not be bound or serving failed
pub async fn serve(config: Config) -> Result<(), FetcherError> {
    let addr: SocketAddr = config.server.bind.parse().map_err(|_| {
        crate::ConfigError::Validation(format!("Invalid bind address: {}", config.server.bind))
    })?;

    let state = Arc::new(AppState::new(config)?);
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
