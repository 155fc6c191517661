//! Handler functions for profile self-service API endpoints.
//!
//! The caller's identity always comes from the validated access-token
//! claims, never from a request-supplied id, so these endpoints can only
//! ever read or mutate the caller's own row.

use crate::api::common::{ApiError, ApiResponse, service_error_to_http};
use crate::database::models::{PasswordResetRequest, UpdateProfileRequest, UserView};
use crate::services::user_service::UserService;
use crate::utils::jwt::Claims;
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::Json as ResponseJson,
};
use serde_json::{Value, json};
use sqlx::SqlitePool;

/// Returns the signed-in user's profile.
#[axum::debug_handler]
pub async fn get_profile(
    Extension(pool): Extension<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<ResponseJson<ApiResponse<UserView>>, ApiError> {
    let user_service = UserService::new(&pool);

    match user_service.get_profile(claims.identity()).await {
        Ok(view) => Ok(ResponseJson(ApiResponse::success(view))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Overwrites the signed-in user's name, role, and phone number.
#[axum::debug_handler]
pub async fn update_profile(
    Extension(pool): Extension<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<ResponseJson<ApiResponse<UserView>>, ApiError> {
    let user_service = UserService::new(&pool);

    match user_service.update_profile(claims.identity(), payload).await {
        Ok(view) => Ok(ResponseJson(ApiResponse::success(view))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Replaces the signed-in user's password after verifying the current one.
#[axum::debug_handler]
pub async fn password_reset(
    Extension(pool): Extension<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PasswordResetRequest>,
) -> Result<ResponseJson<ApiResponse<Value>>, ApiError> {
    let user_service = UserService::new(&pool);

    match user_service.reset_password(claims.identity(), payload).await {
        Ok(()) => Ok(ResponseJson(ApiResponse::success(
            json!({"message": "Password reset success!"}),
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Deactivates the signed-in user's account (soft delete).
#[axum::debug_handler]
pub async fn close_account(
    Extension(pool): Extension<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode, ApiError> {
    let user_service = UserService::new(&pool);

    match user_service.close_account(claims.identity()).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(error) => Err(service_error_to_http(error)),
    }
}
