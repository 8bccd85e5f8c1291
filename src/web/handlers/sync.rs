//! # Sync Trigger Handler
//!
//! Starts a sync run. The caller only learns whether the run was accepted:
//! authorization happens before the response, the run itself continues in
//! the background and reports through the logs.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use std::sync::Arc;
use tracing::{info, Instrument};

use crate::auth::Credentials;
use crate::web::errors::ApiResult;
use crate::web::state::AppState;

/// Body of the acknowledgement sent once a run is accepted
pub const ACCEPTED_BODY: &str = "[MICRO-RECOGNIZER] Request accepted";

/// Trigger a run: POST /recognizer/sendImgs
pub async fn send_images(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<(StatusCode, &'static str)> {
    let credentials = Credentials::from_headers(&headers);
    info!(credentials = credentials.kind(), "sendImgs joined");

    let run = state.driver.prepare(&credentials).await?;
    let run_id = run.run_id();

    let driver = state.driver.clone();
    tokio::spawn(
        async move {
            driver.execute(run).await;
        }
        .instrument(tracing::info_span!("sync_run", %run_id)),
    );

    info!(%run_id, "Sync run accepted");
    Ok((StatusCode::ACCEPTED, ACCEPTED_BODY))
}
