//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the database URL, server port, signing secrets, and token lifetimes.
//! Every component receives this struct explicitly at startup; nothing
//! re-reads the environment afterwards.

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub server_port: u16,
    /// Secret for signing access/refresh session tokens.
    pub jwt_secret: String,
    pub access_token_expires_in_seconds: u64,
    pub refresh_token_expires_in_seconds: u64,
    /// Dedicated secret for email confirmation tokens, distinct from
    /// `jwt_secret` so compromise of one does not compromise the other.
    pub confirmation_secret: String,
    pub confirmation_max_age_seconds: u64,
    pub email: EmailConfig,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_name: String,
    pub from_email: String,
    /// Public base URL used to build verification links.
    pub base_url: String,
    pub service_name: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL not set")?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid number")?;

        let acquire_timeout_seconds = env::var("DB_ACQUIRE_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u64>()
            .context("DB_ACQUIRE_TIMEOUT_SECONDS must be a valid number")?;

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("SERVER_PORT must be a valid number")?;

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET not set")?;

        let access_token_expires_in_seconds = env::var("ACCESS_TOKEN_EXPIRES_IN_SECONDS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse::<u64>()
            .context("ACCESS_TOKEN_EXPIRES_IN_SECONDS must be a valid number")?;

        let refresh_token_expires_in_seconds = env::var("REFRESH_TOKEN_EXPIRES_IN_SECONDS")
            .unwrap_or_else(|_| "604800".to_string())
            .parse::<u64>()
            .context("REFRESH_TOKEN_EXPIRES_IN_SECONDS must be a valid number")?;

        let confirmation_secret =
            env::var("CONFIRMATION_SECRET").context("CONFIRMATION_SECRET not set")?;

        // Confirmation links stay valid for three days by default.
        let confirmation_max_age_seconds = env::var("CONFIRMATION_MAX_AGE_SECONDS")
            .unwrap_or_else(|_| "259200".to_string())
            .parse::<u64>()
            .context("CONFIRMATION_MAX_AGE_SECONDS must be a valid number")?;

        let email = EmailConfig::from_env()?;

        Ok(Config {
            database_url,
            max_connections,
            acquire_timeout_seconds,
            server_port,
            jwt_secret,
            access_token_expires_in_seconds,
            refresh_token_expires_in_seconds,
            confirmation_secret,
            confirmation_max_age_seconds,
            email,
        })
    }
}

impl EmailConfig {
    /// Loads SMTP and service identity settings from environment variables.
    pub fn from_env() -> Result<Self> {
        let smtp_host = env::var("SMTP_HOST").context("SMTP_HOST not set")?;

        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .context("SMTP_PORT must be a valid number")?;

        let smtp_username = env::var("SMTP_USERNAME").context("SMTP_USERNAME not set")?;
        let smtp_password = env::var("SMTP_PASSWORD").context("SMTP_PASSWORD not set")?;

        let from_name = env::var("MAIL_FROM_NAME").unwrap_or_else(|_| "Account Service".to_string());
        let from_email = env::var("MAIL_FROM_EMAIL").context("MAIL_FROM_EMAIL not set")?;

        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let service_name = env::var("SERVICE_NAME").unwrap_or_else(|_| "Account Service".to_string());

        Ok(EmailConfig {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            from_name,
            from_email,
            base_url,
            service_name,
        })
    }
}
