//! Defines the HTTP routes for profile self-service.
//!
//! All profile routes require a valid, non-revoked access token.

use super::handlers::{close_account, get_profile, password_reset, update_profile};
use crate::auth::middleware::jwt_auth;
use axum::{
    Router, middleware,
    routing::{get, post, put},
};

pub fn profile_router() -> Router {
    Router::new()
        .route("/", get(get_profile))
        .route("/", put(update_profile))
        .route("/password-reset", post(password_reset))
        .route("/close", post(close_account))
        .layer(middleware::from_fn(jwt_auth))
}
