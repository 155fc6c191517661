//! Shared utility modules.
//!
//! Houses the session token issuer, the email confirmation token codec,
//! and password hashing helpers.

pub mod confirmation;
pub mod hash;
pub mod jwt;
