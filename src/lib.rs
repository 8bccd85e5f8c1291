#![allow(clippy::doc_markdown)] // Allow technical terms like PiFF, PascalCase in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Recognizer Bridge
//!
//! Bounded-batch synchronization between the annotation database and a
//! handwriting-recognition daemon.
//!
//! ## Overview
//!
//! The database keeps a queue of line images that have no transcription yet.
//! A sync run pulls that queue in pages of at most `page_size` records, sends
//! each page to the recognition daemon and writes the suggested
//! transcriptions back under the recognizer's annotator identity. The run
//! stops on the first short page or on the first failure; pages committed
//! before a failure stay committed.
//!
//! ## Module Organization
//!
//! - [`sync`] - Batch pipeline and the run state machine
//! - [`auth`] - Trigger credentials and the authorization gate
//! - [`clients`] - HTTP clients for the database, recognizer and identity service
//! - [`config`] - Environment-driven configuration
//! - [`error`] - Structured error and warning types
//! - [`logging`] - Structured logging setup and helpers
//! - [`web`] - HTTP trigger surface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use recognizer_bridge::config::BridgeConfig;
//! use recognizer_bridge::web::state::build_driver;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BridgeConfig::from_env()?;
//! let driver = build_driver(&config)?;
//!
//! let report = driver.execute(driver.prepare_unguarded()).await;
//! println!("committed {} records", report.records_committed);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod logging;
pub mod sync;
pub mod web;

pub use config::BridgeConfig;
pub use error::{Result, SyncError, SyncWarning, Upstream};
pub use sync::{SyncDriver, SyncOutcome, SyncReport, SyncState};
