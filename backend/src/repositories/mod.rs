//! Module for database repositories.
//!
//! Repositories own all SQL and expose a small capability set (get-by-filter,
//! save, delete) to the service layer.

pub mod revoked_token_repository;
pub mod user_repository;
