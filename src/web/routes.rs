//! # Web API Routes

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::web::{handlers, state::AppState};

/// Health check routes for monitoring and Kubernetes probes
pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(handlers::health::basic_health))
}

/// Recognizer routes: home and the sync trigger
pub fn recognizer_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recognizer", get(handlers::health::home))
        .route("/recognizer/sendImgs", post(handlers::sync::send_images))
}
