//! HTTP server setup with Axum

use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderValue,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use super::websocket::{handler::ws_handler, state::AppState};
use crate::types::{HubStats, IngestionStatus};
use crate::utils::{now_iso8601, uptime_seconds};

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket endpoint
        .route("/ws", get(ws_handler))
        // Health check
        .route("/health", get(health_check))
        // Operational status
        .route("/api/ingestion/status", get(ingestion_status))
        .route("/api/hub/stats", get(hub_stats))
        .layer(cors_layer(state.config.frontend_url.as_deref()))
        .with_state(state)
}

/// Allow the configured frontend origin, or any origin when unset
fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match frontend_url.map(HeaderValue::from_str) {
        Some(Ok(origin)) => cors.allow_origin(origin),
        Some(Err(_)) => {
            warn!("Invalid frontend URL, allowing any origin");
            cors.allow_origin(Any)
        }
        None => cors.allow_origin(Any),
    }
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": now_iso8601(),
        "uptimeSeconds": uptime_seconds(state.started_at),
        "environment": state.config.environment,
    }))
}

async fn ingestion_status(State(state): State<Arc<AppState>>) -> Json<IngestionStatus> {
    Json(state.scheduler.status())
}

async fn hub_stats(State(state): State<Arc<AppState>>) -> Json<HubStats> {
    Json(state.hub.stats())
}
