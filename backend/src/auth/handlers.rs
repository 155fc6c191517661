//! Handler functions for authentication-related API endpoints.
//!
//! These functions process incoming HTTP requests for account sign-up,
//! sign-in, sign-out, token refresh, and the email verification flows, and
//! delegate to `auth::service` for the business logic.

use crate::api::common::{ApiError, ApiResponse, service_error_to_http};
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::config::Config;
use crate::services::email_service::Mailer;
use crate::utils::jwt::Claims;
use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::Json as ResponseJson,
};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Handle account sign-up request
#[axum::debug_handler]
pub async fn sign_up(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Extension(mailer): Extension<Arc<dyn Mailer>>,
    Json(payload): Json<SignUpRequest>,
) -> Result<ResponseJson<ApiResponse<Value>>, ApiError> {
    let auth_service = AuthService::new(&pool, &config, mailer);

    match auth_service.sign_up(payload).await {
        Ok(()) => Ok(ResponseJson(ApiResponse::success(
            json!({"message": "Email sent!"}),
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle credential sign-in request
#[axum::debug_handler]
pub async fn sign_in(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Extension(mailer): Extension<Arc<dyn Mailer>>,
    Json(payload): Json<SignInRequest>,
) -> Result<ResponseJson<ApiResponse<TokenPairResponse>>, ApiError> {
    let auth_service = AuthService::new(&pool, &config, mailer);

    match auth_service.sign_in(payload).await {
        Ok(pair) => Ok(ResponseJson(ApiResponse::success(pair))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle sign-out: revokes the access token used to call this endpoint.
#[axum::debug_handler]
pub async fn sign_out(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Extension(mailer): Extension<Arc<dyn Mailer>>,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode, ApiError> {
    let auth_service = AuthService::new(&pool, &config, mailer);

    match auth_service.sign_out(&claims).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle token refresh: issues a new pair for the refresh token's identity.
#[axum::debug_handler]
pub async fn refresh_token(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Extension(mailer): Extension<Arc<dyn Mailer>>,
    Extension(claims): Extension<Claims>,
) -> Result<ResponseJson<ApiResponse<TokenPairResponse>>, ApiError> {
    let auth_service = AuthService::new(&pool, &config, mailer);

    match auth_service.refresh(&claims) {
        Ok(pair) => Ok(ResponseJson(ApiResponse::success(pair))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle email verification via confirmation token
#[axum::debug_handler]
pub async fn verify_email(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Extension(mailer): Extension<Arc<dyn Mailer>>,
    Path(token): Path<String>,
) -> Result<ResponseJson<ApiResponse<Value>>, ApiError> {
    let auth_service = AuthService::new(&pool, &config, mailer);

    match auth_service.verify_email(&token).await {
        Ok(()) => Ok(ResponseJson(ApiResponse::success(
            json!({"message": "User has been verified."}),
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle re-sending the verification email
#[axum::debug_handler]
pub async fn resend_verify_email(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Extension(mailer): Extension<Arc<dyn Mailer>>,
    Path(email): Path<String>,
) -> Result<ResponseJson<ApiResponse<Value>>, ApiError> {
    let auth_service = AuthService::new(&pool, &config, mailer);

    match auth_service.resend_verify_email(&email).await {
        Ok(()) => Ok(ResponseJson(ApiResponse::success(
            json!({"message": "Email sent again."}),
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle changing the sign-up email address
#[axum::debug_handler]
pub async fn update_email(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Extension(mailer): Extension<Arc<dyn Mailer>>,
    Path((old_email, new_email)): Path<(String, String)>,
) -> Result<ResponseJson<ApiResponse<Value>>, ApiError> {
    let auth_service = AuthService::new(&pool, &config, mailer);

    match auth_service.update_email(&old_email, &new_email).await {
        Ok(()) => Ok(ResponseJson(ApiResponse::success(
            json!({"message": "Email updated"}),
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}
