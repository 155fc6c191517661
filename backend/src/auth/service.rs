//! Core business logic for the authentication system.
//!
//! Orchestrates sign-up, sign-in, sign-out, token refresh, and the email
//! verification flows against the user repository, the session token issuer,
//! the confirmation token codec, and the revocation ledger.

use crate::auth::models::{SignInRequest, SignUpRequest, TokenPairResponse};
use crate::config::Config;
use crate::database::models::{User, UserRole};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::revoked_token_repository::RevokedTokenRepository;
use crate::repositories::user_repository::UserRepository;
use crate::services::email_service::{Mailer, RegistrationEmail};
use crate::utils::confirmation::ConfirmationCodec;
use crate::utils::hash::{hash_password, verify_password};
use crate::utils::jwt::{Claims, JwtUtils};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Authentication service for handling the account lifecycle and session
/// token issuance.
pub struct AuthService<'a> {
    pool: &'a SqlitePool,
    jwt_utils: JwtUtils,
    codec: ConfirmationCodec,
    mailer: Arc<dyn Mailer>,
    confirmation_max_age: Duration,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService instance
    pub fn new(pool: &'a SqlitePool, config: &Config, mailer: Arc<dyn Mailer>) -> Self {
        AuthService {
            pool,
            jwt_utils: JwtUtils::new(config),
            codec: ConfirmationCodec::new(config),
            mailer,
            confirmation_max_age: Duration::seconds(config.confirmation_max_age_seconds as i64),
        }
    }

    /// Register a new account (or reuse an existing unverified row for the
    /// same email) and send the confirmation email.
    pub async fn sign_up(&self, request: SignUpRequest) -> ServiceResult<()> {
        request.validate()?;

        // The role must name a known variant, but the stored role is always
        // User regardless of the input.
        request
            .role
            .parse::<UserRole>()
            .map_err(|e: String| ServiceError::validation(e))?;

        let repo = UserRepository::new(self.pool);
        let existing = repo.get_user_by_email(&request.email).await?;

        if let Some(user) = &existing {
            if user.verified {
                return Err(ServiceError::already_exists("User", &request.email));
            }
        }

        let reusing_row = existing.is_some();
        let now = Utc::now();
        let mut user = existing.unwrap_or_else(|| User {
            id: Uuid::now_v7().to_string(),
            email: request.email.clone(),
            password_hash: String::new(),
            role: UserRole::User,
            first_name: None,
            last_name: None,
            phone_number: None,
            verified: false,
            verified_at: None,
            active: true,
            created_at: now,
            updated_at: now,
        });

        user.password_hash = hash_password(&request.password)?;
        user.role = UserRole::User;
        user.first_name = Some(request.first_name);
        user.last_name = Some(request.last_name);
        user.verified = false;

        let token = self.codec.generate(&user.email)?;
        let payload = RegistrationEmail {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        };
        self.mailer.send_registration_email(&payload, &token).await?;

        if reusing_row {
            repo.save_user(&user).await?;
        } else {
            repo.create_user(&user).await?;
        }

        tracing::info!("Sign-up confirmation email sent to {}", user.email);
        Ok(())
    }

    /// Authenticate a verified user and issue an access/refresh pair.
    pub async fn sign_in(&self, request: SignInRequest) -> ServiceResult<TokenPairResponse> {
        request.validate()?;

        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_user_by_email(&request.email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", &request.email))?;

        if !user.verified {
            return Err(ServiceError::not_verified("User not verified!"));
        }

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(ServiceError::invalid_credentials("Invalid password!"));
        }

        self.issue_pair(&user.email)
    }

    /// Record the jti of the token used to sign out in the revocation
    /// ledger. The token remains cryptographically valid but is rejected on
    /// every protected route from now on.
    pub async fn sign_out(&self, claims: &Claims) -> ServiceResult<()> {
        let ledger = RevokedTokenRepository::new(self.pool);
        ledger.revoke(&claims.jti).await?;

        tracing::info!("Token revoked for {}", claims.sub);
        Ok(())
    }

    /// Issue a fresh access/refresh pair bound to the identity of a
    /// validated refresh token.
    pub fn refresh(&self, claims: &Claims) -> ServiceResult<TokenPairResponse> {
        self.issue_pair(claims.identity())
    }

    /// Confirm an email verification token and mark the user verified.
    pub async fn verify_email(&self, token: &str) -> ServiceResult<()> {
        let email = self
            .codec
            .confirm(token, self.confirmation_max_age)
            .ok_or_else(|| {
                ServiceError::not_found("Token", "The link has been expired or invalid.")
            })?;

        let repo = UserRepository::new(self.pool);
        let mut user = repo
            .get_user_by_email(&email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", &email))?;

        if user.verified {
            return Err(ServiceError::validation("User already verified."));
        }

        user.verified = true;
        user.verified_at = Some(Utc::now());
        repo.save_user(&user).await?;

        tracing::info!("User {} verified", user.id);
        Ok(())
    }

    /// Re-send the confirmation email for an unverified user. An already
    /// verified user is reported as not found.
    pub async fn resend_verify_email(&self, email: &str) -> ServiceResult<()> {
        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", email))?;

        if user.verified {
            return Err(ServiceError::not_found("User", email));
        }

        let token = self.codec.generate(&user.email)?;
        let payload = RegistrationEmail {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        };
        self.mailer.send_registration_email(&payload, &token).await?;

        Ok(())
    }

    /// Reassign the sign-up email and send a fresh confirmation to the new
    /// address. The verified flag is left untouched.
    pub async fn update_email(&self, old_email: &str, new_email: &str) -> ServiceResult<()> {
        let repo = UserRepository::new(self.pool);
        let mut user = repo
            .get_user_by_email(old_email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", old_email))?;

        if repo.get_user_by_email(new_email).await?.is_some() {
            return Err(ServiceError::already_exists("Email", new_email));
        }

        user.email = new_email.to_string();

        let token = self.codec.generate(new_email)?;
        let payload = RegistrationEmail {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        };
        self.mailer.send_registration_email(&payload, &token).await?;

        repo.save_user(&user).await?;

        Ok(())
    }

    fn issue_pair(&self, identity: &str) -> ServiceResult<TokenPairResponse> {
        let access = self.jwt_utils.issue_access(identity)?;
        let refresh = self.jwt_utils.issue_refresh(identity)?;

        Ok(TokenPairResponse {
            access_token: access.token,
            refresh_token: refresh.token,
        })
    }
}
