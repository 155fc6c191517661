//! Database repository for user management operations.
//!
//! Provides CRUD operations for user records. Lookup by id and listing
//! exclude inactive (closed) accounts; lookup by email does not, so a closed
//! account still blocks re-registration of its address.

use crate::database::models::User;
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

/// Repository for user database operations.
pub struct UserRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Creates a new UserRepository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a new user row.
    ///
    /// The UNIQUE index on email is the real uniqueness guard; callers treat
    /// a constraint violation here as a duplicate-email conflict.
    pub async fn create_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users
            (id, email, password_hash, role, first_name, last_name, phone_number,
             verified, verified_at, active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone_number)
        .bind(user.verified)
        .bind(user.verified_at)
        .bind(user.active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Retrieves a user by email, regardless of active state.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Retrieves an active user by id.
    pub async fn get_active_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ? AND active = 1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Lists all active users, newest first.
    pub async fn list_active_users(&self) -> Result<Vec<User>> {
        let users =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE active = 1 ORDER BY created_at DESC")
                .fetch_all(self.pool)
                .await?;

        Ok(users)
    }

    /// Persists all mutable fields of an existing user row.
    pub async fn save_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users SET
            email = ?, password_hash = ?, role = ?, first_name = ?, last_name = ?,
            phone_number = ?, verified = ?, verified_at = ?, active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone_number)
        .bind(user.verified)
        .bind(user.verified_at)
        .bind(user.active)
        .bind(Utc::now())
        .bind(&user.id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Physically removes a user row. Distinct from closing an account,
    /// which only flips `active` off.
    pub async fn delete_user(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
