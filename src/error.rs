//! # Error Types
//!
//! Error taxonomy for a sync run. Every failure that aborts a run is a
//! [`SyncError`]; conditions that are reported but let the run continue are
//! [`SyncWarning`]s collected in the run report.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::sync::state::SyncState;
use crate::sync::types::RecordId;

/// Upstream collaborator that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Upstream {
    Database,
    Recognizer,
    Identity,
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database => write!(f, "database"),
            Self::Recognizer => write!(f, "recognizer"),
            Self::Identity => write!(f, "identity"),
        }
    }
}

/// Errors that abort a sync run (or deny it before it starts)
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncError {
    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("{service} unavailable: {reason}")]
    UpstreamUnavailable { service: Upstream, reason: String },

    #[error("{service} rejected request with status {status}: {body}")]
    UpstreamRejected {
        service: Upstream,
        status: u16,
        body: String,
    },

    #[error("{service} returned a malformed response: {reason}")]
    UpstreamMalformed { service: Upstream, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid sync state transition from {from} to {to}")]
    InvalidTransition { from: SyncState, to: SyncState },
}

impl SyncError {
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            reason: reason.into(),
        }
    }

    pub fn unavailable(service: Upstream, reason: impl fmt::Display) -> Self {
        Self::UpstreamUnavailable {
            service,
            reason: reason.to_string(),
        }
    }

    pub fn rejected(service: Upstream, status: u16, body: impl Into<String>) -> Self {
        Self::UpstreamRejected {
            service,
            status,
            body: body.into(),
        }
    }

    pub fn malformed(service: Upstream, reason: impl fmt::Display) -> Self {
        Self::UpstreamMalformed {
            service,
            reason: reason.to_string(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Short machine-readable name, used as a log field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "unauthorized",
            Self::UpstreamUnavailable { .. } => "upstream_unavailable",
            Self::UpstreamRejected { .. } => "upstream_rejected",
            Self::UpstreamMalformed { .. } => "upstream_malformed",
            Self::Configuration { .. } => "configuration",
            Self::InvalidTransition { .. } => "invalid_transition",
        }
    }

    /// Whether re-triggering later is likely to succeed.
    ///
    /// Runs never retry on their own; this only feeds operator-facing logs.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::UpstreamUnavailable { .. } => true,
            Self::UpstreamRejected { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Collaborator responsible for the failure, if any
    pub fn upstream(&self) -> Option<Upstream> {
        match self {
            Self::UpstreamUnavailable { service, .. }
            | Self::UpstreamRejected { service, .. }
            | Self::UpstreamMalformed { service, .. } => Some(*service),
            _ => None,
        }
    }
}

/// Non-fatal conditions recorded during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncWarning {
    /// The recognizer omitted identifiers that were part of the request
    PartialResult {
        iteration: u32,
        missing: Vec<RecordId>,
    },
    /// The commit succeeded with a 2xx status other than the expected one
    CommitStatusDiscrepancy {
        iteration: u32,
        status: u16,
        expected: u16,
    },
    /// A fetched page held only records already seen this run; the run
    /// stopped instead of refetching them
    Stalled {
        iteration: u32,
        unprocessed: Vec<RecordId>,
    },
}

impl fmt::Display for SyncWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PartialResult { iteration, missing } => write!(
                f,
                "iteration {iteration}: recognizer omitted {} identifier(s)",
                missing.len()
            ),
            Self::CommitStatusDiscrepancy {
                iteration,
                status,
                expected,
            } => write!(
                f,
                "iteration {iteration}: commit returned status {status}, expected {expected}"
            ),
            Self::Stalled {
                iteration,
                unprocessed,
            } => write!(
                f,
                "iteration {iteration}: no progress, {} record(s) left unprocessed",
                unprocessed.len()
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
