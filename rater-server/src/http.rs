//! Rater HTTP status API
//!
//! Small axum server for operators and orchestrators, off by default.
//! Each endpoint has a thin axum handler that delegates to an inner function
//! testable without the axum dispatch machinery.
//!
//! Endpoints:
//! - GET /health: store reachability
//! - GET /version: server version info
//! - GET /stats: sample, interaction and active session counts

use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use rater_core::config::HttpConfig;
use rater_core::SampleStore;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::conversation::SessionRegistry;

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct HttpState {
    pub store: Arc<dyn SampleStore>,
    pub sessions: Arc<SessionRegistry>,
}

pub fn build_router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route("/stats", get(stats_handler))
        .with_state(state)
}

/// Serve until the broadcast shutdown signal fires.
pub async fn start_http_server(
    state: HttpState,
    config: HttpConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let app = build_router(Arc::new(state));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Rater HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Inner functions
// ============================================================================

pub async fn health_inner(store: &dyn SampleStore) -> (StatusCode, serde_json::Value) {
    match store.counts().await {
        Ok(_) => (
            StatusCode::OK,
            serde_json::json!({
                "status": "healthy",
                "version": env!("CARGO_PKG_VERSION"),
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                serde_json::json!({
                    "status": "unhealthy",
                    "error": e.to_string(),
                }),
            )
        }
    }
}

pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "name": env!("CARGO_PKG_NAME"),
    })
}

pub async fn stats_inner(
    store: &dyn SampleStore,
    sessions: &SessionRegistry,
) -> (StatusCode, serde_json::Value) {
    match store.counts().await {
        Ok(counts) => (
            StatusCode::OK,
            serde_json::json!({
                "samples": counts.samples,
                "interactions": counts.interactions,
                "active_sessions": sessions.active().await,
            }),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({
                "error": e.to_string(),
                "status": "error",
            }),
        ),
    }
}

// ============================================================================
// Axum handlers
// ============================================================================

async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = health_inner(state.store.as_ref()).await;
    (status, Json(body))
}

async fn version_handler() -> impl IntoResponse {
    Json(version_inner())
}

async fn stats_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = stats_inner(state.store.as_ref(), &state.sessions).await;
    (status, Json(body))
}
