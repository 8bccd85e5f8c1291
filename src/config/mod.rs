//! # Bridge Configuration
//!
//! One immutable configuration value, built once at process start from the
//! environment and handed to every component that needs it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use recognizer_bridge::config::BridgeConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BridgeConfig::from_env()?;
//! println!("page size: {}", config.sync.page_size);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::EnvSettings;

pub const DEFAULT_DATABASE_API_URL: &str =
    "http://database-api.gitlab-managed-apps.svc.cluster.local:8080";
pub const DEFAULT_DATABASE_QUEUE: &str = "recognizer";
pub const DEFAULT_FILESERVER_URL: &str = "https://inky.local:9501";
pub const DEFAULT_RECOGNIZER_API_URL: &str = "http://raoh.educ.insa:12191";
pub const DEFAULT_PAGE_SIZE: usize = 25;
pub const DEFAULT_ANNOTATOR_ID: &str = "$taliesin_recognizer";
pub const DEFAULT_AUTH_API_URL: &str =
    "http://auth-api.gitlab-managed-apps.svc.cluster.local:8080";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 300_000;

/// Root configuration
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct BridgeConfig {
    pub database: DatabaseConfig,
    pub recognizer: RecognizerConfig,
    /// Base URL prepended to relative image paths
    pub file_server_url: String,
    pub sync: SyncConfig,
    pub auth: AuthConfig,
    pub web: WebConfig,
}

/// Database API access
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    pub base_url: String,
    /// Retrieval queue the records are pulled from
    pub queue: String,
    /// Cluster-internal shared secret, sent as the `Authorization` header to
    /// the database and expected from the scheduler
    pub shared_secret: String,
}

/// Recognition daemon access
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecognizerConfig {
    pub base_url: String,
}

/// Batch loop settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncConfig {
    /// Records per page (P)
    pub page_size: usize,
    /// Annotator tag attached to recognizer transcriptions
    pub annotator_id: String,
}

/// Trigger authorization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthConfig {
    pub enabled: bool,
    /// Identity service used to resolve user tokens
    pub identity_url: String,
}

/// HTTP surfaces
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebConfig {
    pub bind_address: String,
    /// Timeout applied to every outbound request
    pub http_timeout_ms: u64,
}

impl WebConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                base_url: DEFAULT_DATABASE_API_URL.to_string(),
                queue: DEFAULT_DATABASE_QUEUE.to_string(),
                shared_secret: String::new(),
            },
            recognizer: RecognizerConfig {
                base_url: DEFAULT_RECOGNIZER_API_URL.to_string(),
            },
            file_server_url: DEFAULT_FILESERVER_URL.to_string(),
            sync: SyncConfig {
                page_size: DEFAULT_PAGE_SIZE,
                annotator_id: DEFAULT_ANNOTATOR_ID.to_string(),
            },
            auth: AuthConfig {
                enabled: true,
                identity_url: DEFAULT_AUTH_API_URL.to_string(),
            },
            web: WebConfig {
                bind_address: DEFAULT_BIND_ADDRESS.to_string(),
                http_timeout_ms: DEFAULT_HTTP_TIMEOUT_MS,
            },
        }
    }
}

impl BridgeConfig {
    /// Load from the process environment (and `.env`, if present)
    pub fn from_env() -> ConfigResult<Self> {
        loader::load_from_env()
    }

    /// Check every field and report all problems at once
    pub fn validate(&self) -> ConfigResult<()> {
        let mut errors = Vec::new();

        for (field, url) in [
            ("DATABASE_API_URL", &self.database.base_url),
            ("RECOGNIZER_API_URL", &self.recognizer.base_url),
            ("FILESERVER_URL", &self.file_server_url),
        ] {
            if let Err(e) = reqwest::Url::parse(url) {
                errors.push(
                    ConfigurationError::invalid_value(field, url.as_str(), e.to_string())
                        .to_string(),
                );
            }
        }

        if self.auth.enabled {
            if let Err(e) = reqwest::Url::parse(&self.auth.identity_url) {
                errors.push(
                    ConfigurationError::invalid_value(
                        "AUTH_API_URL",
                        self.auth.identity_url.as_str(),
                        e.to_string(),
                    )
                    .to_string(),
                );
            }
        }

        if self.database.queue.is_empty() {
            errors.push(
                ConfigurationError::missing_required_field("DATABASE_QUEUE", "database")
                    .to_string(),
            );
        }

        if self.sync.page_size == 0 {
            errors.push(
                ConfigurationError::invalid_value(
                    "SYNC_PAGE_SIZE",
                    "0",
                    "page size must be greater than 0",
                )
                .to_string(),
            );
        }

        if self.sync.annotator_id.trim().is_empty() {
            errors.push(
                ConfigurationError::missing_required_field("RECOGNIZER_ANNOTATOR_ID", "sync")
                    .to_string(),
            );
        }

        if self.web.http_timeout_ms == 0 {
            errors.push(
                ConfigurationError::invalid_value(
                    "HTTP_TIMEOUT_MS",
                    "0",
                    "timeout must be greater than 0",
                )
                .to_string(),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigurationError::ValidationFailed { errors })
        }
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "***"
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("base_url", &self.base_url)
            .field("queue", &self.queue)
            .field("shared_secret", &redact(&self.shared_secret))
            .finish()
    }
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("database", &self.database)
            .field("recognizer", &self.recognizer)
            .field("file_server_url", &self.file_server_url)
            .field("sync", &self.sync)
            .field("auth", &self.auth)
            .field("web", &self.web)
            .finish()
    }
}
