//! JWT session token utilities for authentication.
//!
//! Issues signed access and refresh tokens carrying the user identity and a
//! unique token id (jti), and validates tokens per request. The issuer knows
//! nothing about revocation; callers must check the revocation ledger with
//! the returned jti before trusting a token.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::ServiceError;

/// Declared purpose of a session token. Access tokens are rejected at the
/// refresh endpoint and vice versa.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims carried by a session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Identity (user email)
    pub sub: String,
    /// Unique token id, used as the revocation key
    pub jti: String,
    /// Access or refresh
    pub token_type: TokenType,
    /// Token expiration timestamp
    pub exp: usize,
    /// Token issued at timestamp
    pub iat: usize,
}

impl Claims {
    pub fn identity(&self) -> &str {
        &self.sub
    }
}

/// A freshly minted token together with its jti and expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

/// JWT token utility for creating and validating session tokens.
pub struct JwtUtils {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_expires_in: Duration,
    refresh_expires_in: Duration,
}

impl JwtUtils {
    /// Create a new JwtUtils instance from the application config.
    pub fn new(config: &Config) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        JwtUtils {
            encoding_key,
            decoding_key,
            validation,
            access_expires_in: Duration::seconds(config.access_token_expires_in_seconds as i64),
            refresh_expires_in: Duration::seconds(config.refresh_token_expires_in_seconds as i64),
        }
    }

    /// Issue a short-lived access token for the given identity.
    pub fn issue_access(&self, identity: &str) -> Result<IssuedToken, ServiceError> {
        self.issue(identity, TokenType::Access, self.access_expires_in)
    }

    /// Issue a long-lived refresh token for the given identity.
    pub fn issue_refresh(&self, identity: &str) -> Result<IssuedToken, ServiceError> {
        self.issue(identity, TokenType::Refresh, self.refresh_expires_in)
    }

    fn issue(
        &self,
        identity: &str,
        token_type: TokenType,
        expires_in: Duration,
    ) -> Result<IssuedToken, ServiceError> {
        let now = Utc::now();
        let expires_at = now + expires_in;
        // A fresh jti per token: two tokens for the same identity are never
        // interchangeable for revocation purposes.
        let jti = Uuid::now_v7().to_string();

        let claims = Claims {
            sub: identity.to_string(),
            jti: jti.clone(),
            token_type,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::internal_error(format!("Token generation failed: {e}")))?;

        Ok(IssuedToken {
            token,
            jti,
            expires_at,
        })
    }

    /// Validate signature, expiry, and declared type of a session token.
    pub fn validate(&self, token: &str, expected_type: TokenType) -> Result<Claims, ServiceError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| ServiceError::unauthorized(format!("Token validation failed: {e}")))?;

        if claims.token_type != expected_type {
            return Err(ServiceError::unauthorized("Wrong token type"));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, EmailConfig};

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

    #[test]
    fn issued_access_token_validates() {
        let jwt = JwtUtils::new(&test_config());
        let issued = jwt.issue_access("user@mail.com").unwrap();

        let claims = jwt.validate(&issued.token, TokenType::Access).unwrap();
        assert_eq!(claims.sub, "user@mail.com");
        assert_eq!(claims.jti, issued.jti);
    }

    #[test]
    fn access_token_rejected_as_refresh() {
        let jwt = JwtUtils::new(&test_config());
        let issued = jwt.issue_access("user@mail.com").unwrap();

        assert!(jwt.validate(&issued.token, TokenType::Refresh).is_err());

        let refresh = jwt.issue_refresh("user@mail.com").unwrap();
        assert!(jwt.validate(&refresh.token, TokenType::Access).is_err());
    }

    #[test]
    fn each_token_gets_a_fresh_jti() {
        let jwt = JwtUtils::new(&test_config());
        let a = jwt.issue_access("user@mail.com").unwrap();
        let b = jwt.issue_access("user@mail.com").unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let jwt = JwtUtils::new(&test_config());
        let issued = jwt.issue_access("user@mail.com").unwrap();

        let mut corrupted = issued.token.clone();
        corrupted.push('x');
        assert!(jwt.validate(&corrupted, TokenType::Access).is_err());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let jwt = JwtUtils::new(&test_config());
        let mut other_config = test_config();
        other_config.jwt_secret = "different-secret".into();
        let other = JwtUtils::new(&other_config);

        let issued = other.issue_access("user@mail.com").unwrap();
        assert!(jwt.validate(&issued.token, TokenType::Access).is_err());
    }
}
