//! Signed, time-limited confirmation tokens for email verification links.
//!
//! A confirmation token embeds the subject email and its issuance time and is
//! signed with a secret distinct from the session token secret. Validity is
//! fully determined by signature and age at verification time; there is no
//! revocation list for these. Signature failure, malformed input, and expiry
//! all collapse to the same invalid outcome.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::errors::ServiceError;

const CONFIRM_PURPOSE: &str = "confirm";

#[derive(Debug, Serialize, Deserialize)]
struct ConfirmationClaims {
    /// Subject email
    sub: String,
    /// Issued-at timestamp; age is checked against a max-age at confirm time
    iat: usize,
    /// Guards against a confirmation token being replayed as anything else
    purpose: String,
}

/// Codec for generating and confirming email confirmation tokens.
pub struct ConfirmationCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl ConfirmationCodec {
    pub fn new(config: &Config) -> Self {
        let encoding_key = EncodingKey::from_secret(config.confirmation_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.confirmation_secret.as_bytes());

        // Expiry is a property of the verifier's max-age window, not of the
        // token itself, so exp validation is disabled here.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        ConfirmationCodec {
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Produce a signed token embedding `email` and the current time.
    pub fn generate(&self, email: &str) -> Result<String, ServiceError> {
        let claims = ConfirmationClaims {
            sub: email.to_string(),
            iat: Utc::now().timestamp() as usize,
            purpose: CONFIRM_PURPOSE.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            ServiceError::internal_error(format!("Confirmation token generation failed: {e}"))
        })
    }

    /// Verify signature and age; returns the embedded email, or `None` for
    /// any signature failure, malformed input, or expiry.
    pub fn confirm(&self, token: &str, max_age: Duration) -> Option<String> {
        let claims = decode::<ConfirmationClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .ok()?;

        if claims.purpose != CONFIRM_PURPOSE {
            return None;
        }

        let age = Utc::now().timestamp() - claims.iat as i64;
        if age < 0 || age > max_age.num_seconds() {
            return None;
        }

        Some(claims.sub)
    }
}
