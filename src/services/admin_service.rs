//! Domain service for account administration.
//!
//! Everything here runs behind the admin guard; the service still enforces
//! the rules that depend on who the acting admin is.

use thiserror::Error;

use crate::db::UserRecord;

/// Errors specific to account administration.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The database change was committed but the notification mail could
    /// not be delivered. Maps to an internal error so the admin retries.
    #[error("Failed to send email to {0}, reset the user's password to send a new mail")]
    MailDelivery(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AdminError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AdminError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for account administration.
#[async_trait::async_trait]
pub trait AdminService: Send + Sync {
    async fn list_users(&self) -> Result<Vec<UserRecord>, AdminError>;

    async fn get_user(&self, id: i32) -> Result<UserRecord, AdminError>;

    /// Creates an account with a generated one-time password and mails it
    /// to the new user. The account starts with the User role only and
    /// must rotate the password on first login.
    async fn create_user(&self, name: &str, email: &str) -> Result<UserRecord, AdminError>;

    /// Updates name and email. The address is folded to lowercase.
    async fn update_user(&self, id: i32, name: &str, email: &str)
    -> Result<UserRecord, AdminError>;

    /// Deletes an account. Ledger entries the account recorded are kept
    /// and re-parented to the sentinel actor. Admins cannot delete
    /// themselves or protected accounts (id < 1).
    async fn delete_user(&self, actor: &UserRecord, id: i32) -> Result<(), AdminError>;

    /// Replaces the password with a generated one-time password, sets the
    /// rotation flag and mails the new password to the user.
    async fn reset_password(&self, id: i32) -> Result<UserRecord, AdminError>;

    /// Grants the Admin flag. Idempotent.
    async fn grant_admin(&self, id: i32) -> Result<UserRecord, AdminError>;

    /// Revokes the Admin flag. Admins cannot revoke their own.
    async fn revoke_admin(&self, actor: &UserRecord, id: i32) -> Result<UserRecord, AdminError>;

    /// Grants the Wannabe flag. Idempotent.
    async fn grant_wannabe(&self, id: i32) -> Result<UserRecord, AdminError>;

    /// Revokes the Wannabe flag.
    async fn revoke_wannabe(&self, id: i32) -> Result<UserRecord, AdminError>;
}
