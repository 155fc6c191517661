//! Middleware for protecting authenticated routes.
//!
//! Validates the bearer token from the authorization header, enforces the
//! declared token type, and consults the revocation ledger before the route
//! body executes. On success the validated claims are inserted into the
//! request extensions for use in handlers.

use crate::api::common::{ApiError, ApiResponse};
use crate::config::Config;
use crate::repositories::revoked_token_repository::RevokedTokenRepository;
use crate::utils::jwt::{Claims, JwtUtils, TokenType};
use axum::{
    Json,
    extract::{Extension, Request},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use sqlx::SqlitePool;

/// Access-token gate for protected routes.
pub async fn jwt_auth(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers()).ok_or_else(unauthorized)?;
    let claims = authenticate(&pool, &config, &token, TokenType::Access).await?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Refresh-token gate for the refresh endpoint. Access tokens are rejected
/// here, and vice versa at `jwt_auth`.
pub async fn refresh_auth(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers()).ok_or_else(unauthorized)?;
    let claims = authenticate(&pool, &config, &token, TokenType::Refresh).await?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

// The token is extracted up front so the request body is never borrowed
// across an await point.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_owned)
}

async fn authenticate(
    pool: &SqlitePool,
    config: &Config,
    token: &str,
    expected_type: TokenType,
) -> Result<Claims, ApiError> {
    let claims = JwtUtils::new(config)
        .validate(token, expected_type)
        .map_err(|_| unauthorized())?;

    // Signature checks out; the ledger has the final word.
    let ledger = RevokedTokenRepository::new(pool);
    let revoked = ledger.is_revoked(&claims.jti).await.map_err(|e| {
        tracing::error!("Revocation lookup failed: {e:#}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::failure("Internal server error")),
        )
    })?;

    if revoked {
        return Err(unauthorized());
    }

    Ok(claims)
}

fn unauthorized() -> ApiError {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::failure("Unauthorized")),
    )
}
