//! Integration tests for the account lifecycle: sign-up, verification,
//! sign-in, token revocation, refresh, and profile self-service, run against
//! an in-memory SQLite database with a recording mailer standing in for the
//! SMTP collaborator.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header::AUTHORIZATION};
use axum::{Extension, Router};
use backend::api;
use backend::auth;
use backend::auth::models::{SignInRequest, SignUpRequest};
use backend::auth::service::AuthService;
use backend::config::{Config, EmailConfig};
use backend::database::models::{PasswordResetRequest, UpdateProfileRequest};
use backend::errors::{ServiceError, ServiceResult};
use backend::repositories::revoked_token_repository::RevokedTokenRepository;
use backend::repositories::user_repository::UserRepository;
use backend::services::email_service::{Mailer, RegistrationEmail};
use backend::services::user_service::UserService;
use backend::utils::jwt::{JwtUtils, TokenType};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Captures outbound confirmation emails so tests can read the tokens.
#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    fn last_token_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, token)| token.clone())
    }

    fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_registration_email(
        &self,
        payload: &RegistrationEmail,
        confirmation_token: &str,
    ) -> ServiceResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((payload.email.clone(), confirmation_token.to_string()));
        Ok(())
    }
}

fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".into(),
        max_connections: 1,
        acquire_timeout_seconds: 3,
        server_port: 0,
        jwt_secret: "session-secret".into(),
        access_token_expires_in_seconds: 3600,
        refresh_token_expires_in_seconds: 604800,
        confirmation_secret: "confirm-secret".into(),
        confirmation_max_age_seconds: 259200,
        email: EmailConfig {
            smtp_host: "localhost".into(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_name: "Test".into(),
            from_email: "noreply@test".into(),
            base_url: "http://localhost:3000".into(),
            service_name: "Test".into(),
        },
    }
}

async fn test_pool() -> SqlitePool {
    // A single connection keeps every query on the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

fn sign_up_request(email: &str, password: &str) -> SignUpRequest {
    SignUpRequest {
        email: email.into(),
        password: password.into(),
        role: "User".into(),
        first_name: "Test".into(),
        last_name: "User".into(),
    }
}

fn sign_in_request(email: &str, password: &str) -> SignInRequest {
    SignInRequest {
        email: email.into(),
        password: password.into(),
    }
}

#[tokio::test]
async fn full_account_lifecycle() {
    let pool = test_pool().await;
    let config = test_config();
    let mailer = Arc::new(RecordingMailer::default());
    let auth = AuthService::new(&pool, &config, mailer.clone());
    let jwt = JwtUtils::new(&config);

    // Sign-up sends a confirmation email.
    auth.sign_up(sign_up_request("a@x.com", "pw1")).await.unwrap();
    let token = mailer.last_token_for("a@x.com").unwrap();

    // Sign-in before verification is forbidden.
    let err = auth
        .sign_in(sign_in_request("a@x.com", "pw1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotVerified { .. }));

    // Verify, then sign in.
    auth.verify_email(&token).await.unwrap();
    let pair = auth.sign_in(sign_in_request("a@x.com", "pw1")).await.unwrap();

    // The fresh access token validates and is not revoked.
    let claims = jwt.validate(&pair.access_token, TokenType::Access).unwrap();
    assert_eq!(claims.sub, "a@x.com");

    let ledger = RevokedTokenRepository::new(&pool);
    assert!(!ledger.is_revoked(&claims.jti).await.unwrap());

    // Sign-out revokes exactly that jti, even though the token has not
    // expired. Revoking again is not an error.
    auth.sign_out(&claims).await.unwrap();
    assert!(ledger.is_revoked(&claims.jti).await.unwrap());
    auth.sign_out(&claims).await.unwrap();

    // The refresh token is still good and yields a fresh pair with new jtis.
    let refresh_claims = jwt
        .validate(&pair.refresh_token, TokenType::Refresh)
        .unwrap();
    let new_pair = auth.refresh(&refresh_claims).unwrap();
    let new_claims = jwt
        .validate(&new_pair.access_token, TokenType::Access)
        .unwrap();
    assert_ne!(new_claims.jti, claims.jti);
    assert!(!ledger.is_revoked(&new_claims.jti).await.unwrap());
}

#[tokio::test]
async fn sign_in_failures_never_yield_tokens() {
    let pool = test_pool().await;
    let config = test_config();
    let mailer = Arc::new(RecordingMailer::default());
    let auth = AuthService::new(&pool, &config, mailer.clone());

    let err = auth
        .sign_in(sign_in_request("nobody@x.com", "pw"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));

    auth.sign_up(sign_up_request("a@x.com", "pw1")).await.unwrap();
    let token = mailer.last_token_for("a@x.com").unwrap();
    auth.verify_email(&token).await.unwrap();

    let err = auth
        .sign_in(sign_in_request("a@x.com", "wrong"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidCredentials { .. }));
}

#[tokio::test]
async fn verify_is_single_shot() {
    let pool = test_pool().await;
    let config = test_config();
    let mailer = Arc::new(RecordingMailer::default());
    let auth = AuthService::new(&pool, &config, mailer.clone());

    auth.sign_up(sign_up_request("a@x.com", "pw1")).await.unwrap();
    let token = mailer.last_token_for("a@x.com").unwrap();

    auth.verify_email(&token).await.unwrap();

    // Retrying with the same (still unexpired) token is a conflict, not a
    // second success.
    for _ in 0..3 {
        let err = auth.verify_email(&token).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
    }

    // Garbage tokens are a 404-class failure.
    let err = auth.verify_email("not-a-token").await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
}

#[tokio::test]
async fn duplicate_sign_up_reuses_unverified_row() {
    let pool = test_pool().await;
    let config = test_config();
    let mailer = Arc::new(RecordingMailer::default());
    let auth = AuthService::new(&pool, &config, mailer.clone());

    auth.sign_up(sign_up_request("a@x.com", "pw1")).await.unwrap();
    auth.sign_up(sign_up_request("a@x.com", "pw2")).await.unwrap();

    // One row, two emails sent, and the later password wins.
    let repo = UserRepository::new(&pool);
    let users = repo.list_active_users().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(mailer.sent_count(), 2);

    let token = mailer.last_token_for("a@x.com").unwrap();
    auth.verify_email(&token).await.unwrap();
    auth.sign_in(sign_in_request("a@x.com", "pw2")).await.unwrap();
    let err = auth
        .sign_in(sign_in_request("a@x.com", "pw1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidCredentials { .. }));

    // Once verified, the email is taken for good.
    let err = auth
        .sign_up(sign_up_request("a@x.com", "pw3"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::AlreadyExists { .. }));
}

#[tokio::test]
async fn resend_verify_treats_verified_as_not_found() {
    let pool = test_pool().await;
    let config = test_config();
    let mailer = Arc::new(RecordingMailer::default());
    let auth = AuthService::new(&pool, &config, mailer.clone());

    let err = auth.resend_verify_email("nobody@x.com").await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));

    auth.sign_up(sign_up_request("a@x.com", "pw1")).await.unwrap();
    auth.resend_verify_email("a@x.com").await.unwrap();
    assert_eq!(mailer.sent_count(), 2);

    let token = mailer.last_token_for("a@x.com").unwrap();
    auth.verify_email(&token).await.unwrap();

    let err = auth.resend_verify_email("a@x.com").await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
}

#[tokio::test]
async fn update_email_rejects_taken_address() {
    let pool = test_pool().await;
    let config = test_config();
    let mailer = Arc::new(RecordingMailer::default());
    let auth = AuthService::new(&pool, &config, mailer.clone());

    auth.sign_up(sign_up_request("a@x.com", "pw1")).await.unwrap();
    auth.sign_up(sign_up_request("b@x.com", "pw2")).await.unwrap();

    let err = auth.update_email("a@x.com", "b@x.com").await.unwrap_err();
    assert!(matches!(err, ServiceError::AlreadyExists { .. }));

    // The original user's email is untouched by the failed attempt.
    let repo = UserRepository::new(&pool);
    assert!(repo.get_user_by_email("a@x.com").await.unwrap().is_some());

    auth.update_email("a@x.com", "c@x.com").await.unwrap();
    assert!(repo.get_user_by_email("a@x.com").await.unwrap().is_none());
    assert!(repo.get_user_by_email("c@x.com").await.unwrap().is_some());
    assert!(mailer.last_token_for("c@x.com").is_some());

    let err = auth.update_email("missing@x.com", "d@x.com").await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
}

#[tokio::test]
async fn profile_self_service() {
    let pool = test_pool().await;
    let config = test_config();
    let mailer = Arc::new(RecordingMailer::default());
    let auth = AuthService::new(&pool, &config, mailer.clone());
    let users = UserService::new(&pool);

    auth.sign_up(sign_up_request("a@x.com", "pw1")).await.unwrap();
    let token = mailer.last_token_for("a@x.com").unwrap();
    auth.verify_email(&token).await.unwrap();

    let view = users.get_profile("a@x.com").await.unwrap();
    assert_eq!(view.email, "a@x.com");
    assert!(view.verified);

    let view = users
        .update_profile(
            "a@x.com",
            UpdateProfileRequest {
                role: "Developer".into(),
                first_name: Some("New".into()),
                last_name: Some("Name".into()),
                phone_number: Some("(234)567-8901".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(view.first_name.as_deref(), Some("New"));
    assert_eq!(view.phone_number.as_deref(), Some("(234)567-8901"));

    // Wrong current password and mismatched confirmation both fail without
    // changing the stored hash.
    let err = users
        .reset_password(
            "a@x.com",
            PasswordResetRequest {
                current_password: "wrong".into(),
                new_password: "pw2".into(),
                confirm_password: "pw2".into(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidCredentials { .. }));

    let err = users
        .reset_password(
            "a@x.com",
            PasswordResetRequest {
                current_password: "pw1".into(),
                new_password: "pw2".into(),
                confirm_password: "pw3".into(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation { .. }));

    auth.sign_in(sign_in_request("a@x.com", "pw1")).await.unwrap();

    users
        .reset_password(
            "a@x.com",
            PasswordResetRequest {
                current_password: "pw1".into(),
                new_password: "pw2".into(),
                confirm_password: "pw2".into(),
            },
        )
        .await
        .unwrap();
    auth.sign_in(sign_in_request("a@x.com", "pw2")).await.unwrap();

    // Closing the account is a soft delete: the row stays but disappears
    // from id lookup and listing.
    let id = users.get_profile("a@x.com").await.unwrap().id;
    users.close_account("a@x.com").await.unwrap();
    let err = users.get_user_by_id(&id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
    assert!(users.list_users().await.unwrap().is_empty());

    let repo = UserRepository::new(&pool);
    assert!(repo.get_user_by_email("a@x.com").await.unwrap().is_some());
}

#[tokio::test]
async fn sign_up_stores_default_role_and_validates_input_role() {
    let pool = test_pool().await;
    let config = test_config();
    let mailer = Arc::new(RecordingMailer::default());
    let auth = AuthService::new(&pool, &config, mailer.clone());
    let users = UserService::new(&pool);

    let mut request = sign_up_request("a@x.com", "pw1");
    request.role = "Superuser".into();
    let err = auth.sign_up(request).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation { .. }));

    // A valid role name is accepted but the stored role is always User.
    let mut request = sign_up_request("a@x.com", "pw1");
    request.role = "Admin".into();
    auth.sign_up(request).await.unwrap();

    let token = mailer.last_token_for("a@x.com").unwrap();
    auth.verify_email(&token).await.unwrap();
    let view = users.get_profile("a@x.com").await.unwrap();
    assert_eq!(view.role, backend::database::models::UserRole::User);
}

#[tokio::test]
async fn user_management_operates_on_active_rows() {
    let pool = test_pool().await;
    let config = test_config();
    let mailer = Arc::new(RecordingMailer::default());
    let auth = AuthService::new(&pool, &config, mailer.clone());
    let users = UserService::new(&pool);

    auth.sign_up(sign_up_request("a@x.com", "pw1")).await.unwrap();
    auth.sign_up(sign_up_request("b@x.com", "pw2")).await.unwrap();

    let listed = users.list_users().await.unwrap();
    assert_eq!(listed.len(), 2);

    let id = listed
        .iter()
        .find(|u| u.email == "a@x.com")
        .unwrap()
        .id
        .clone();
    let view = users.get_user_by_id(&id).await.unwrap();
    assert_eq!(view.email, "a@x.com");

    // Hard delete: the row is gone, and the email becomes reusable.
    users.delete_user(&id).await.unwrap();
    let err = users.get_user_by_id(&id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));

    let repo = UserRepository::new(&pool);
    assert!(repo.get_user_by_email("a@x.com").await.unwrap().is_none());

    let err = users.delete_user(&id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
}

/// The router as `main` assembles it, minus the listener.
fn app(pool: SqlitePool, config: Config, mailer: Arc<dyn Mailer>) -> Router {
    Router::new()
        .nest("/api/auth", auth::routes::auth_router())
        .nest("/api/profile", api::profile::routes::profile_router())
        .nest("/api/users", api::users::routes::users_router())
        .layer(Extension(pool))
        .layer(Extension(config))
        .layer(Extension(mailer))
}

async fn request_status(app: &Router, method: &str, uri: &str, bearer: Option<&str>) -> StatusCode {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder.body(Body::empty()).unwrap();

    app.clone().oneshot(request).await.unwrap().status()
}

#[tokio::test]
async fn middleware_gates_protected_routes() {
    let pool = test_pool().await;
    let config = test_config();
    let recording = Arc::new(RecordingMailer::default());
    let mailer: Arc<dyn Mailer> = recording.clone();
    let auth = AuthService::new(&pool, &config, mailer.clone());

    auth.sign_up(sign_up_request("a@x.com", "pw1")).await.unwrap();
    let token = recording.last_token_for("a@x.com").unwrap();
    auth.verify_email(&token).await.unwrap();
    let pair = auth.sign_in(sign_in_request("a@x.com", "pw1")).await.unwrap();

    let app = app(pool.clone(), config, mailer);

    // No credentials or garbage credentials never get past the gate.
    assert_eq!(
        request_status(&app, "GET", "/api/profile", None).await,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        request_status(&app, "GET", "/api/profile", Some("garbage")).await,
        StatusCode::UNAUTHORIZED
    );

    // A fresh access token reaches the handlers.
    assert_eq!(
        request_status(&app, "GET", "/api/profile", Some(&pair.access_token)).await,
        StatusCode::OK
    );
    assert_eq!(
        request_status(&app, "GET", "/api/users", Some(&pair.access_token)).await,
        StatusCode::OK
    );

    // The refresh gate only accepts refresh tokens, and the access gate
    // only accepts access tokens.
    assert_eq!(
        request_status(&app, "POST", "/api/auth/refresh", Some(&pair.access_token)).await,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        request_status(&app, "POST", "/api/auth/refresh", Some(&pair.refresh_token)).await,
        StatusCode::OK
    );
    assert_eq!(
        request_status(&app, "GET", "/api/profile", Some(&pair.refresh_token)).await,
        StatusCode::UNAUTHORIZED
    );

    // Signing out revokes the access token; every protected route rejects
    // it from then on.
    assert_eq!(
        request_status(&app, "POST", "/api/auth/sign-out", Some(&pair.access_token)).await,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        request_status(&app, "GET", "/api/profile", Some(&pair.access_token)).await,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        request_status(&app, "GET", "/api/users", Some(&pair.access_token)).await,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        request_status(&app, "POST", "/api/auth/sign-out", Some(&pair.access_token)).await,
        StatusCode::UNAUTHORIZED
    );
}
