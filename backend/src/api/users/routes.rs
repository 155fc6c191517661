//! Defines the HTTP routes for user management.
//!
//! All user management routes require a valid, non-revoked access token.

use super::handlers::{
    create_user_forbidden, delete_user, get_user_by_id, list_users, update_user,
};
use crate::auth::middleware::jwt_auth;
use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

pub fn users_router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/", post(create_user_forbidden))
        .route("/{id}", get(get_user_by_id))
        .route("/{id}", put(update_user))
        .route("/{id}", delete(delete_user))
        .layer(middleware::from_fn(jwt_auth))
}
