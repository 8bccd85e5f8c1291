//! # Environment Configuration Loader
//!
//! Reads `BridgeConfig` from environment variables, after loading a `.env`
//! file if one exists. Every variable has a default suitable for the standard
//! cluster deployment.

use config::{Config, Environment};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info};

use super::error::ConfigResult;
use super::{
    AuthConfig, BridgeConfig, DatabaseConfig, RecognizerConfig, SyncConfig, WebConfig,
    DEFAULT_ANNOTATOR_ID, DEFAULT_AUTH_API_URL, DEFAULT_BIND_ADDRESS, DEFAULT_DATABASE_API_URL,
    DEFAULT_DATABASE_QUEUE, DEFAULT_FILESERVER_URL, DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_PAGE_SIZE,
    DEFAULT_RECOGNIZER_API_URL,
};

/// Flat view of the environment, one field per variable (lowercased)
#[derive(Debug, Clone, Deserialize)]
pub struct EnvSettings {
    pub database_api_url: String,
    pub database_queue: String,
    pub cluster_internal_password: String,
    pub fileserver_url: String,
    pub recognizer_api_url: String,
    pub sync_page_size: usize,
    pub recognizer_annotator_id: String,
    pub auth_enabled: bool,
    pub auth_api_url: String,
    pub bind_address: String,
    pub http_timeout_ms: u64,
}

impl EnvSettings {
    /// Read settings from `vars`, or from the process environment when `None`
    pub fn collect(vars: Option<HashMap<String, String>>) -> ConfigResult<Self> {
        let settings = Config::builder()
            .set_default("database_api_url", DEFAULT_DATABASE_API_URL)?
            .set_default("database_queue", DEFAULT_DATABASE_QUEUE)?
            .set_default("cluster_internal_password", "")?
            .set_default("fileserver_url", DEFAULT_FILESERVER_URL)?
            .set_default("recognizer_api_url", DEFAULT_RECOGNIZER_API_URL)?
            .set_default("sync_page_size", DEFAULT_PAGE_SIZE as i64)?
            .set_default("recognizer_annotator_id", DEFAULT_ANNOTATOR_ID)?
            .set_default("auth_enabled", true)?
            .set_default("auth_api_url", DEFAULT_AUTH_API_URL)?
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("http_timeout_ms", DEFAULT_HTTP_TIMEOUT_MS as i64)?
            .add_source(Environment::default().source(vars))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl From<EnvSettings> for BridgeConfig {
    fn from(env: EnvSettings) -> Self {
        Self {
            database: DatabaseConfig {
                base_url: env.database_api_url,
                queue: env.database_queue,
                shared_secret: env.cluster_internal_password,
            },
            recognizer: RecognizerConfig {
                base_url: env.recognizer_api_url,
            },
            file_server_url: env.fileserver_url,
            sync: SyncConfig {
                page_size: env.sync_page_size,
                annotator_id: env.recognizer_annotator_id,
            },
            auth: AuthConfig {
                enabled: env.auth_enabled,
                identity_url: env.auth_api_url,
            },
            web: WebConfig {
                bind_address: env.bind_address,
                http_timeout_ms: env.http_timeout_ms,
            },
        }
    }
}

/// Build and validate the configuration from explicit variables
pub fn load_from_vars(vars: HashMap<String, String>) -> ConfigResult<BridgeConfig> {
    build(Some(vars))
}

/// Build and validate the configuration from the process environment
pub fn load_from_env() -> ConfigResult<BridgeConfig> {
    // Load .env file if present (silently ignore if not found)
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "Loaded .env file");
    }
    build(None)
}

fn build(vars: Option<HashMap<String, String>>) -> ConfigResult<BridgeConfig> {
    let config: BridgeConfig = EnvSettings::collect(vars)?.into();
    config.validate()?;

    info!(
        database = %config.database.base_url,
        recognizer = %config.recognizer.base_url,
        page_size = config.sync.page_size,
        auth_enabled = config.auth.enabled,
        "Configuration loaded"
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigurationError;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = load_from_vars(HashMap::new()).unwrap();
        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    fn test_variables_override_defaults() {
        let config = load_from_vars(vars(&[
            ("DATABASE_API_URL", "http://db:9000"),
            ("CLUSTER_INTERNAL_PASSWORD", "s3cret"),
            ("FILESERVER_URL", "http://files"),
            ("SYNC_PAGE_SIZE", "10"),
            ("RECOGNIZER_ANNOTATOR_ID", "$laia"),
            ("AUTH_ENABLED", "false"),
            ("HTTP_TIMEOUT_MS", "1500"),
        ]))
        .unwrap();

        assert_eq!(config.database.base_url, "http://db:9000");
        assert_eq!(config.database.shared_secret, "s3cret");
        assert_eq!(config.file_server_url, "http://files");
        assert_eq!(config.sync.page_size, 10);
        assert_eq!(config.sync.annotator_id, "$laia");
        assert!(!config.auth.enabled);
        assert_eq!(config.web.http_timeout_ms, 1500);
    }

    #[test]
    fn test_non_numeric_page_size_is_rejected() {
        let err = load_from_vars(vars(&[("SYNC_PAGE_SIZE", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigurationError::LoadError(_)));
    }

    #[test]
    fn test_zero_page_size_fails_validation() {
        let err = load_from_vars(vars(&[("SYNC_PAGE_SIZE", "0")])).unwrap_err();
        assert!(matches!(err, ConfigurationError::ValidationFailed { .. }));
    }
}
