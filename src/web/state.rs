//! # Web Application State
//!
//! Shared state for the trigger surface: the immutable configuration and the
//! sync driver wired to its collaborators.

use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::auth::{AuthorizationGate, CredentialGate, OpenGate, SharedSecretGate, UserRoleGate};
use crate::clients::{DatabaseClient, HttpIdentityProvider, RecognizerClient};
use crate::config::BridgeConfig;
use crate::error::Result;
use crate::sync::SyncDriver;

/// Shared application state for the web API
#[derive(Debug)]
pub struct AppState {
    pub config: Arc<BridgeConfig>,
    pub driver: Arc<SyncDriver>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Arc<BridgeConfig>, driver: Arc<SyncDriver>) -> Self {
        Self {
            config,
            driver,
            started_at: Instant::now(),
        }
    }

    /// Build the HTTP collaborators and the driver from configuration
    pub fn from_config(config: Arc<BridgeConfig>) -> Result<Self> {
        let driver = Arc::new(build_driver(&config)?);
        info!(
            page_size = driver.page_size(),
            auth_enabled = config.auth.enabled,
            "Web application state created"
        );
        Ok(Self::new(config, driver))
    }
}

/// Gate matching the configuration: open when auth is disabled, otherwise
/// dispatching between the scheduler secret and user roles
pub fn build_gate(config: &BridgeConfig) -> Result<Arc<dyn AuthorizationGate>> {
    if !config.auth.enabled {
        return Ok(Arc::new(OpenGate));
    }

    let identity = Arc::new(HttpIdentityProvider::new(config)?);
    Ok(Arc::new(CredentialGate::new(
        SharedSecretGate::new(config.database.shared_secret.clone()),
        UserRoleGate::new(identity),
    )))
}

/// Driver backed by the real database and recognizer clients
pub fn build_driver(config: &BridgeConfig) -> Result<SyncDriver> {
    let store = Arc::new(DatabaseClient::new(config)?);
    let recognizer = Arc::new(RecognizerClient::new(config)?);
    SyncDriver::from_config(config, store, recognizer, build_gate(config)?)
}
