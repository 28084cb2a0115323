//! Domain service for login, logout and password rotation.

use thiserror::Error;

use crate::db::UserRecord;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Deliberately covers both "no such account" and "wrong password" so
    /// responses cannot be used for account enumeration.
    #[error("Wrong username or password")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and stamps the login time.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, email: &str, password: &str) -> Result<UserRecord, AuthError>;

    /// Resolves a session's user id back to an account.
    async fn get_user(&self, id: i32) -> Result<Option<UserRecord>, AuthError>;

    /// Changes a user's password and clears the rotation flag.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if the confirmation does not match
    /// and [`AuthError::InvalidCredentials`] if the old password is wrong.
    async fn change_password(
        &self,
        user_id: i32,
        old_password: &str,
        new_password: &str,
        password_confirm: &str,
    ) -> Result<(), AuthError>;
}
