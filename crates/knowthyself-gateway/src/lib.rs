//! HTTP gateway in front of the LangGraph backend.
//!
//! Exposes the chat relay (`POST /api/chat`), thread history, and the
//! file proxy routes. The relay re-emits backend run chunks as SSE
//! frames after a synthetic `thread_id` frame.

use anyhow::Result;
use axum::Router;
use axum::routing::{get, post};
use knowthyself_core::config::Config;
use knowthyself_core::langgraph::{LangGraphClient, LangGraphConfig};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

mod chat;
mod error;
mod files;

pub use error::ApiError;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Client for the LangGraph backend.
    backend: LangGraphClient,
    /// Base URL for the file-serving backend, unset when not configured.
    files_base_url: Option<String>,
    /// Plain HTTP client for the file proxies.
    http: reqwest::Client,
}

impl AppState {
    /// Builds gateway state from the resolved configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend = LangGraphClient::new(LangGraphConfig::from_config(config)?);
        Ok(Self {
            backend,
            files_base_url: config.resolved_files_base_url(),
            http: reqwest::Client::new(),
        })
    }

    /// Builds state against an explicit backend, primarily for tests.
    pub fn new(backend: LangGraphClient, files_base_url: Option<String>) -> Self {
        Self {
            backend,
            files_base_url,
            http: reqwest::Client::new(),
        }
    }
}

/// Builds the gateway router with all routes mounted.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat::send))
        .route("/api/history", get(chat::history))
        .route("/api/files/list", get(files::list))
        .route("/api/files/content", get(files::content))
        .route("/api/files/results", get(files::results))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds the listener and serves the gateway until shutdown.
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "gateway listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
