//! # Web API Handlers

pub mod health;
pub mod sync;
