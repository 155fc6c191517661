//! Account service backend library.
//!
//! Exposes the configuration, persistence, service, and routing layers so
//! the binary and the integration tests can share them.

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod repositories;
pub mod services;
pub mod utils;
