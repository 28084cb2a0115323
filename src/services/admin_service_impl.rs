//! `SeaORM` implementation of the `AdminService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task;
use tracing::warn;
use uuid::Uuid;

use crate::api::validation::{validate_email, validate_name};
use crate::clearance::Clearance;
use crate::config::SecurityConfig;
use crate::db::{Store, UserRecord, hash_password};
use crate::mailer::Mailer;
use crate::services::admin_service::{AdminError, AdminService};

pub struct SeaOrmAdminService {
    store: Store,
    mailer: Arc<dyn Mailer>,
    security: SecurityConfig,
}

impl SeaOrmAdminService {
    #[must_use]
    pub fn new(store: Store, mailer: Arc<dyn Mailer>, security: SecurityConfig) -> Self {
        Self {
            store,
            mailer,
            security,
        }
    }

    async fn hash(&self, password: &str) -> Result<String, AdminError> {
        let password = password.to_string();
        let security = self.security.clone();

        task::spawn_blocking(move || hash_password(&password, &security))
            .await
            .map_err(|e| AdminError::Internal(format!("Hashing task panicked: {e}")))?
            .map_err(AdminError::from)
    }

    /// Accounts with id < 1 (the re-parent sentinel included) are off
    /// limits for destructive admin operations.
    fn check_protected(id: i32) -> Result<(), AdminError> {
        if id < 1 {
            return Err(AdminError::Forbidden("Protected user".to_string()));
        }
        Ok(())
    }

    async fn set_role(&self, id: i32, flag: Clearance, grant: bool) -> Result<UserRecord, AdminError> {
        let changed = if grant {
            self.store.grant_role(id, flag).await?
        } else {
            self.store.revoke_role(id, flag).await?
        };

        if !changed {
            return Err(AdminError::UserNotFound);
        }

        self.store
            .get_user(id)
            .await?
            .ok_or(AdminError::UserNotFound)
    }
}

#[async_trait]
impl AdminService for SeaOrmAdminService {
    async fn list_users(&self) -> Result<Vec<UserRecord>, AdminError> {
        Ok(self.store.list_users().await?)
    }

    async fn get_user(&self, id: i32) -> Result<UserRecord, AdminError> {
        self.store
            .get_user(id)
            .await?
            .ok_or(AdminError::UserNotFound)
    }

    async fn create_user(&self, name: &str, email: &str) -> Result<UserRecord, AdminError> {
        validate_name(name).map_err(AdminError::Validation)?;
        validate_email(email).map_err(AdminError::Validation)?;

        let email = email.to_lowercase();
        let temp_password = Uuid::new_v4().to_string();
        let password_hash = self.hash(&temp_password).await?;

        let user = self
            .store
            .insert_user(name, &email, &password_hash, Clearance::USER, true)
            .await
            .map_err(|e| {
                warn!("Failed to insert user: {e:#}");
                AdminError::Validation("Something went wrong".to_string())
            })?;

        // The account stays even when the welcome mail bounces; the
        // password is unknown to everyone until an admin resets it.
        if let Err(e) = self
            .mailer
            .send_welcome(&email, name, &temp_password)
            .await
        {
            warn!("Failed to send welcome mail to {email}: {e}");
            return Err(AdminError::Validation("Something went wrong".to_string()));
        }

        Ok(user)
    }

    async fn update_user(
        &self,
        id: i32,
        name: &str,
        email: &str,
    ) -> Result<UserRecord, AdminError> {
        validate_name(name).map_err(AdminError::Validation)?;
        validate_email(email).map_err(AdminError::Validation)?;

        let email = email.to_lowercase();

        let updated = self
            .store
            .update_user_profile(id, name, &email)
            .await
            .map_err(|e| {
                // Most likely a unique collision on the address.
                warn!("Failed to update user {id}: {e:#}");
                AdminError::Validation("Something went wrong".to_string())
            })?;

        updated.ok_or(AdminError::UserNotFound)
    }

    async fn delete_user(&self, actor: &UserRecord, id: i32) -> Result<(), AdminError> {
        Self::check_protected(id)?;

        if id == actor.id {
            return Err(AdminError::Forbidden(
                "You cannot delete yourself".to_string(),
            ));
        }

        let deleted = self.store.delete_user(id).await?;
        if !deleted {
            return Err(AdminError::UserNotFound);
        }

        Ok(())
    }

    async fn reset_password(&self, id: i32) -> Result<UserRecord, AdminError> {
        Self::check_protected(id)?;

        let user = self
            .store
            .get_user(id)
            .await?
            .ok_or(AdminError::UserNotFound)?;

        let temp_password = Uuid::new_v4().to_string();
        let password_hash = self.hash(&temp_password).await?;

        let updated = self
            .store
            .update_user_password(id, &password_hash, true)
            .await?;

        if !updated {
            return Err(AdminError::UserNotFound);
        }

        // The reset is already committed at this point; a bounced mail
        // leaves the account on the generated password until the next
        // reset.
        if let Err(e) = self
            .mailer
            .send_password_reset(&user.email, &user.name, &temp_password)
            .await
        {
            warn!("Failed to send password-reset mail to {}: {e}", user.email);
            return Err(AdminError::MailDelivery(user.name));
        }

        Ok(user)
    }

    async fn grant_admin(&self, id: i32) -> Result<UserRecord, AdminError> {
        Self::check_protected(id)?;
        self.set_role(id, Clearance::ADMIN, true).await
    }

    async fn revoke_admin(&self, actor: &UserRecord, id: i32) -> Result<UserRecord, AdminError> {
        Self::check_protected(id)?;

        if id == actor.id {
            return Err(AdminError::Forbidden(
                "You cannot remove admin from yourself".to_string(),
            ));
        }

        self.set_role(id, Clearance::ADMIN, false).await
    }

    async fn grant_wannabe(&self, id: i32) -> Result<UserRecord, AdminError> {
        Self::check_protected(id)?;
        self.set_role(id, Clearance::WANNABE, true).await
    }

    async fn revoke_wannabe(&self, id: i32) -> Result<UserRecord, AdminError> {
        Self::check_protected(id)?;
        self.set_role(id, Clearance::WANNABE, false).await
    }
}
