//! Configuration Error Types
//!
//! Errors raised while reading and validating the service configuration.

use thiserror::Error;

/// Configuration-related errors with detailed context
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A source could not be read or a value could not be converted
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    /// Missing required configuration field
    #[error("Missing required configuration field '{field}' in {context}")]
    MissingRequiredField { field: String, context: String },

    /// Invalid configuration value
    #[error("Invalid value '{value}' for field '{field}': {context}")]
    InvalidValue {
        field: String,
        value: String,
        context: String,
    },

    /// Several problems found at once
    #[error("Configuration validation failed: {}", .errors.join("; "))]
    ValidationFailed { errors: Vec<String> },
}

impl ConfigurationError {
    pub fn missing_required_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
            context: context.into(),
        }
    }

    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            context: context.into(),
        }
    }
}

impl From<ConfigurationError> for crate::error::SyncError {
    fn from(err: ConfigurationError) -> Self {
        crate::error::SyncError::configuration(err.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigurationError>;
