//! Database repository for the revoked session token ledger.
//!
//! The ledger is append-only: a jti recorded here permanently invalidates
//! the corresponding token. Entries are never deleted.

use anyhow::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Repository for revoked token database operations.
pub struct RevokedTokenRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> RevokedTokenRepository<'a> {
    /// Creates a new RevokedTokenRepository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Records a jti as revoked. Idempotent: revoking the same jti twice is
    /// not an error.
    pub async fn revoke(&self, jti: &str) -> Result<()> {
        let id = Uuid::now_v7().to_string();

        sqlx::query("INSERT OR IGNORE INTO revoked_tokens (id, jti) VALUES (?, ?)")
            .bind(&id)
            .bind(jti)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Checks whether a jti has been revoked. Consulted on every protected
    /// request after token signature validation succeeds.
    pub async fn is_revoked(&self, jti: &str) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM revoked_tokens WHERE jti = ?")
                .bind(jti)
                .fetch_one(self.pool)
                .await?;

        Ok(count > 0)
    }
}
