//! Handler functions for user management API endpoints.
//!
//! These endpoints operate on arbitrary user ids (unlike the profile
//! endpoints) and are gated by a valid access token. DELETE here physically
//! removes the row, which is distinct from closing an account.

use crate::api::common::{ApiError, ApiResponse, service_error_to_http};
use crate::database::models::{UpdateUserRequest, UserView};
use crate::services::user_service::UserService;
use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::Json as ResponseJson,
};
use sqlx::SqlitePool;

/// Lists all active users.
#[axum::debug_handler]
pub async fn list_users(
    Extension(pool): Extension<SqlitePool>,
) -> Result<ResponseJson<ApiResponse<Vec<UserView>>>, ApiError> {
    let user_service = UserService::new(&pool);

    match user_service.list_users().await {
        Ok(users) => Ok(ResponseJson(ApiResponse::success(users))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Creating users through this resource is not supported; accounts come
/// from sign-up.
#[axum::debug_handler]
pub async fn create_user_forbidden() -> ApiError {
    (
        StatusCode::FORBIDDEN,
        ResponseJson(ApiResponse::failure("Forbidden")),
    )
}

/// Retrieves an active user by id.
#[axum::debug_handler]
pub async fn get_user_by_id(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
) -> Result<ResponseJson<ApiResponse<UserView>>, ApiError> {
    let user_service = UserService::new(&pool);

    match user_service.get_user_by_id(&id).await {
        Ok(view) => Ok(ResponseJson(ApiResponse::success(view))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Overwrites an active user's email, password, role, and names.
#[axum::debug_handler]
pub async fn update_user(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<ResponseJson<ApiResponse<UserView>>, ApiError> {
    let user_service = UserService::new(&pool);

    match user_service.update_user(&id, payload).await {
        Ok(view) => Ok(ResponseJson(ApiResponse::success(view))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Physically deletes an active user row.
#[axum::debug_handler]
pub async fn delete_user(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let user_service = UserService::new(&pool);

    match user_service.delete_user(&id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(error) => Err(service_error_to_http(error)),
    }
}
