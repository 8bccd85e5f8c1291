//! # Trigger Authorization
//!
//! A sync run is gated once, before any data moves. Two credential kinds are
//! accepted: the scheduler's shared secret and a user token whose role is
//! resolved by the identity service.

pub mod credentials;
pub mod gate;

pub use credentials::{Credentials, AUTHORIZATION_HEADER, SCHEDULER_HEADER};
pub use gate::{
    AuthorizationGate, CredentialGate, Grant, IdentityProvider, OpenGate, Role, SharedSecretGate,
    UserIdentity, UserRoleGate,
};
