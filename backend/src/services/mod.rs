//! Module for core business logic services.
//!
//! This module encapsulates services that perform specific business
//! operations and orchestrate interactions between the repositories and the
//! external collaborators (email transport).

pub mod email_service;
pub mod user_service;
