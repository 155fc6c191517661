//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle account sign-up/sign-in, token refresh and
//! revocation, and the email verification flows. They are designed to be
//! nested into the main Axum router under `/api/auth`.

use crate::auth::handlers::*;
use crate::auth::middleware::{jwt_auth, refresh_auth};
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/sign-up", post(sign_up))
        .route("/sign-in", post(sign_in))
        .route(
            "/sign-out",
            post(sign_out).layer(middleware::from_fn(jwt_auth)),
        )
        .route(
            "/refresh",
            post(refresh_token).layer(middleware::from_fn(refresh_auth)),
        )
        .route("/verify/{token}", get(verify_email).post(verify_email))
        .route(
            "/email-resend/{email}",
            get(resend_verify_email).post(resend_verify_email),
        )
        .route(
            "/email-update/{old_email}/{new_email}",
            get(update_email).post(update_email),
        )
}
