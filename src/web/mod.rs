//! # Web API Module
//!
//! HTTP trigger surface for sync runs, plus a home route and a health probe.

use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod errors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use errors::{ApiError, ApiResult};
pub use state::AppState;

/// Create the web application with all routes and middleware
pub fn create_app(state: Arc<AppState>) -> Router {
    let common_middleware = ServiceBuilder::new().layer(TraceLayer::new_for_http());

    let app = Router::new()
        .merge(routes::health_routes())
        .merge(routes::recognizer_routes())
        .layer(common_middleware)
        .with_state(state);

    info!("Web application created with all routes and middleware");
    app
}

/// Serve the application on an already bound listener until the future
/// `shutdown` resolves
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let address = listener.local_addr()?;
    info!(%address, "🚀 Recognizer bridge listening");

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown)
        .await
}
