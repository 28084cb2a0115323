//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tokio::task;

use crate::api::validation::validate_password;
use crate::config::SecurityConfig;
use crate::db::{Store, UserRecord, hash_password};
use crate::services::auth_service::{AuthError, AuthService};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_string();
        let security = self.security.clone();

        task::spawn_blocking(move || hash_password(&password, &security))
            .await
            .map_err(|e| AuthError::Internal(format!("Hashing task panicked: {e}")))?
            .map_err(AuthError::from)
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, email: &str, password: &str) -> Result<UserRecord, AuthError> {
        // Addresses are stored folded to lowercase.
        let email = email.to_lowercase();

        let user = self
            .store
            .verify_user_by_email(&email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // Return the stamped record so the response carries this login,
        // not the previous one. The account can vanish between verify and
        // stamp; that surfaces as the generic failure.
        self.store
            .update_last_login(user.id)
            .await?
            .ok_or(AuthError::InvalidCredentials)
    }

    async fn get_user(&self, id: i32) -> Result<Option<UserRecord>, AuthError> {
        Ok(self.store.get_user(id).await?)
    }

    async fn change_password(
        &self,
        user_id: i32,
        old_password: &str,
        new_password: &str,
        password_confirm: &str,
    ) -> Result<(), AuthError> {
        if new_password != password_confirm {
            return Err(AuthError::Validation(
                "New password and confirmation do not match".to_string(),
            ));
        }

        validate_password(new_password).map_err(AuthError::Validation)?;

        let is_valid = self
            .store
            .verify_user_password(user_id, old_password)
            .await?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let password_hash = self.hash(new_password).await?;

        let updated = self
            .store
            .update_user_password(user_id, &password_hash, false)
            .await?;

        if !updated {
            return Err(AuthError::UserNotFound);
        }

        Ok(())
    }
}
