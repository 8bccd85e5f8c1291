use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::auth::credentials::Credentials;
use crate::error::{Result, SyncError};

/// Roles known to the identity service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Annotator,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Annotator => write!(f, "annotator"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// User resolved from a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Role")]
    pub role: Role,
}

/// Permission to start one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    /// Who was allowed, for the logs
    pub principal: String,
    pub role: Role,
}

impl Grant {
    pub fn scheduler() -> Self {
        Self {
            principal: "scheduler".to_string(),
            role: Role::Admin,
        }
    }
}

/// Single authorization check evaluated before a run starts
#[async_trait]
pub trait AuthorizationGate: Send + Sync {
    /// Allow (`Ok(Grant)`) or deny (`Err(SyncError::Unauthorized)`) a run.
    ///
    /// Failures to reach an identity service surface as upstream errors.
    async fn authorize(&self, credentials: &Credentials) -> Result<Grant>;
}

/// Resolves user tokens to identities
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn identify(&self, token: &str) -> Result<UserIdentity>;
}

/// Accepts scheduler calls carrying the shared secret
pub struct SharedSecretGate {
    secret: String,
}

impl SharedSecretGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl AuthorizationGate for SharedSecretGate {
    async fn authorize(&self, credentials: &Credentials) -> Result<Grant> {
        let Credentials::Scheduler { secret } = credentials else {
            return Err(SyncError::unauthorized(format!(
                "{} credentials cannot use the scheduler path",
                credentials.kind()
            )));
        };

        if self.secret.is_empty() {
            warn!("Scheduler request refused: no shared secret configured");
            return Err(SyncError::unauthorized("shared secret not configured"));
        }

        if !constant_time_eq(secret.as_bytes(), self.secret.as_bytes()) {
            debug!("Scheduler request with bad authorization header");
            return Err(SyncError::unauthorized(
                "incorrect authorization header received from scheduler",
            ));
        }

        info!("🔐 AUTH: request from scheduler accepted");
        Ok(Grant::scheduler())
    }
}

/// Byte comparison whose duration depends only on the lengths, not on where
/// the inputs first differ
fn constant_time_eq(presented: &[u8], expected: &[u8]) -> bool {
    if presented.len() != expected.len() {
        return false;
    }
    presented
        .iter()
        .zip(expected)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

/// Accepts users whose role is sufficient
pub struct UserRoleGate {
    identity: Arc<dyn IdentityProvider>,
    required_role: Role,
}

impl UserRoleGate {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            identity,
            required_role: Role::Admin,
        }
    }
}

#[async_trait]
impl AuthorizationGate for UserRoleGate {
    async fn authorize(&self, credentials: &Credentials) -> Result<Grant> {
        let Credentials::User { token } = credentials else {
            return Err(SyncError::unauthorized(format!(
                "{} credentials cannot use the user path",
                credentials.kind()
            )));
        };

        let user = self.identity.identify(token).await?;

        if user.role != self.required_role {
            warn!(
                username = %user.username,
                role = %user.role,
                required = %self.required_role,
                "Insufficient permission to trigger recognition"
            );
            return Err(SyncError::unauthorized(format!(
                "insufficient permissions: want {}, was {}",
                self.required_role, user.role
            )));
        }

        info!(username = %user.username, "🔐 AUTH: request from user accepted");
        Ok(Grant {
            principal: user.username,
            role: user.role,
        })
    }
}

/// Dispatches to the gate matching the presented credential
pub struct CredentialGate {
    scheduler: SharedSecretGate,
    user: UserRoleGate,
}

impl CredentialGate {
    pub fn new(scheduler: SharedSecretGate, user: UserRoleGate) -> Self {
        Self { scheduler, user }
    }
}

#[async_trait]
impl AuthorizationGate for CredentialGate {
    async fn authorize(&self, credentials: &Credentials) -> Result<Grant> {
        match credentials {
            Credentials::Scheduler { .. } => self.scheduler.authorize(credentials).await,
            Credentials::User { .. } => self.user.authorize(credentials).await,
            Credentials::Anonymous => Err(SyncError::unauthorized("missing credentials")),
        }
    }
}

/// Gate used when authorization is disabled
#[derive(Debug, Default)]
pub struct OpenGate;

#[async_trait]
impl AuthorizationGate for OpenGate {
    async fn authorize(&self, credentials: &Credentials) -> Result<Grant> {
        debug!(
            credentials = credentials.kind(),
            "Authorization disabled - allowing request"
        );
        Ok(Grant {
            principal: "anonymous".to_string(),
            role: Role::Unknown,
        })
    }
}
