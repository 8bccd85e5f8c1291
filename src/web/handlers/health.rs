//! # Health Check Handlers

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::web::state::AppState;

/// Banner returned by the home route
pub const HOME_BANNER: &str = "[MICRO-RECOGNIZER] HomeLink joined";

/// Basic health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub uptime_seconds: u64,
}

/// Home route: GET /recognizer
pub async fn home() -> &'static str {
    debug!("HomeLink joined");
    HOME_BANNER
}

/// Basic health check endpoint: GET /health
///
/// Returns OK while the process is serving; says nothing about the upstreams.
pub async fn basic_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}
