//! # Structured Logging Module
//!
//! Environment-aware structured logging. Console output is always on; setting
//! `LOG_DIR` adds a JSON log file per process for shipping to log collectors.

use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use uuid::Uuid;

use crate::error::Upstream;
use crate::sync::state::SyncState;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = || {
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)))
        };

        let console = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_level(true)
            .with_ansi(true)
            .with_filter(filter());

        let mut log_file = None;
        let file = std::env::var("LOG_DIR").ok().and_then(|dir| {
            let log_dir = PathBuf::from(dir);
            if let Err(e) = fs::create_dir_all(&log_dir) {
                eprintln!("Failed to create log directory {}: {e}", log_dir.display());
                return None;
            }

            // One file per process: environment, PID and start time
            let file_name = format!(
                "{}.{}.{}.log",
                environment,
                process::id(),
                Utc::now().format("%Y%m%d_%H%M%S")
            );
            log_file = Some(log_dir.join(&file_name));

            let appender = tracing_appender::rolling::never(&log_dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            // The writer must outlive the process' logging
            std::mem::forget(guard);

            Some(
                fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_level(true)
                    .with_ansi(false)
                    .json()
                    .with_filter(filter()),
            )
        });

        // Don't panic if a global subscriber is already set (tests, embedding)
        if tracing_subscriber::registry()
            .with(console)
            .with(file)
            .try_init()
            .is_err()
        {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            pid = process::id(),
            environment = %environment,
            log_file = ?log_file,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("BRIDGE_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for sync run operations
pub fn log_sync_operation(
    operation: &str,
    run_id: &Uuid,
    state: SyncState,
    iteration: u32,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        run_id = %run_id,
        state = %state,
        iteration = iteration,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "📋 SYNC_OPERATION"
    );
}

/// Log structured data for calls to upstream collaborators
pub fn log_upstream_call(
    service: Upstream,
    method: &str,
    url: &str,
    status: Option<u16>,
    duration_ms: u64,
) {
    tracing::debug!(
        service = %service,
        method = %method,
        url = %url,
        status = status,
        duration_ms = duration_ms,
        "🌐 UPSTREAM_CALL"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ERROR"
    );
}
