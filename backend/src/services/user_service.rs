//! User business logic service.
//!
//! Handles profile self-service and user management operations. Profile
//! operations take the caller's identity from validated token claims, never
//! from the request body, so a caller can only ever touch their own row.

use crate::database::models::{
    PasswordResetRequest, UpdateProfileRequest, UpdateUserRequest, User, UserRole, UserView,
};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::user_repository::UserRepository;
use crate::utils::hash::{hash_password, verify_password};
use sqlx::SqlitePool;
use validator::Validate;

pub struct UserService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserService<'a> {
    /// Creates a new UserService instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Retrieves a user by email, failing with not-found if absent.
    pub async fn get_user_by_email_required(&self, email: &str) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", email))?;
        Ok(user)
    }

    /// Returns the caller's profile view.
    pub async fn get_profile(&self, email: &str) -> ServiceResult<UserView> {
        let user = self.get_user_by_email_required(email).await?;
        Ok(user.into())
    }

    /// Overwrites the caller's name, role, and phone number. Email and
    /// password are not changed here.
    pub async fn update_profile(
        &self,
        email: &str,
        request: UpdateProfileRequest,
    ) -> ServiceResult<UserView> {
        request.validate()?;

        let role: UserRole = request
            .role
            .parse()
            .map_err(|e: String| ServiceError::validation(e))?;

        let mut user = self.get_user_by_email_required(email).await?;
        user.first_name = request.first_name;
        user.last_name = request.last_name;
        user.role = role;
        user.phone_number = request.phone_number;

        let repo = UserRepository::new(self.pool);
        repo.save_user(&user).await?;

        Ok(user.into())
    }

    /// Replaces the caller's password hash after verifying the current
    /// password and the confirmation.
    pub async fn reset_password(
        &self,
        email: &str,
        request: PasswordResetRequest,
    ) -> ServiceResult<()> {
        request.validate()?;

        let mut user = self.get_user_by_email_required(email).await?;

        if !verify_password(&request.current_password, &user.password_hash)? {
            return Err(ServiceError::invalid_credentials(
                "Current password not match!",
            ));
        }

        if request.new_password != request.confirm_password {
            return Err(ServiceError::validation("Confirm password not match!"));
        }

        user.password_hash = hash_password(&request.new_password)?;

        let repo = UserRepository::new(self.pool);
        repo.save_user(&user).await?;

        Ok(())
    }

    /// Closes the caller's account. Soft delete: the row stays, but
    /// lookup-by-id and listing exclude it from now on.
    pub async fn close_account(&self, email: &str) -> ServiceResult<()> {
        let mut user = self.get_user_by_email_required(email).await?;
        user.active = false;

        let repo = UserRepository::new(self.pool);
        repo.save_user(&user).await?;

        tracing::info!("Account closed for user {}", user.id);
        Ok(())
    }

    /// Lists all active users.
    pub async fn list_users(&self) -> ServiceResult<Vec<UserView>> {
        let repo = UserRepository::new(self.pool);
        let users = repo.list_active_users().await?;
        Ok(users.into_iter().map(UserView::from).collect())
    }

    /// Retrieves an active user by id.
    pub async fn get_user_by_id(&self, id: &str) -> ServiceResult<UserView> {
        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_active_user_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;
        Ok(user.into())
    }

    /// Overwrites an active user's email, password, role, and names. Unlike
    /// sign-up, the supplied role is applied here.
    pub async fn update_user(&self, id: &str, request: UpdateUserRequest) -> ServiceResult<UserView> {
        request.validate()?;

        let role: UserRole = request
            .role
            .parse()
            .map_err(|e: String| ServiceError::validation(e))?;

        let repo = UserRepository::new(self.pool);
        let mut user = repo
            .get_active_user_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;

        user.email = request.email;
        user.password_hash = hash_password(&request.password)?;
        user.role = role;
        user.first_name = request.first_name;
        user.last_name = request.last_name;

        repo.save_user(&user).await?;

        Ok(user.into())
    }

    /// Physically deletes an active user row. This is the hard-delete path;
    /// profile close is the soft one.
    pub async fn delete_user(&self, id: &str) -> ServiceResult<()> {
        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_active_user_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;

        repo.delete_user(&user.id).await?;
        Ok(())
    }
}
