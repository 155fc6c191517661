//! Module for the resource-oriented API surface.
//!
//! Groups the profile self-service and user management endpoints plus the
//! shared response envelope and error mapping.

pub mod common;
pub mod profile;
pub mod users;
