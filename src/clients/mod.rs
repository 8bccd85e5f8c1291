//! # Upstream HTTP Clients
//!
//! reqwest implementations of the collaborator traits: the database
//! ([`RecordStore`](crate::sync::RecordStore)), the recognition daemon
//! ([`Recognizer`](crate::sync::Recognizer)) and the identity service
//! ([`IdentityProvider`](crate::auth::IdentityProvider)).

pub mod database;
mod http;
pub mod identity;
pub mod recognizer;

pub use database::DatabaseClient;
pub use identity::HttpIdentityProvider;
pub use recognizer::RecognizerClient;
