use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tokio::task;

use crate::clearance::Clearance;
use crate::config::SecurityConfig;
use crate::entities::{prelude::*, score_entries, users};

/// User data returned from the repository (without the password hash).
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub needs_password_change: bool,
    pub clearance: Clearance,
    pub last_login: Option<String>,
}

impl From<users::Model> for UserRecord {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            name: model.name,
            needs_password_change: model.needs_password_change,
            clearance: Clearance::from_bits(model.clearance),
            last_login: model.last_login,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<UserRecord>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by id")?;

        Ok(user.map(UserRecord::from))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(UserRecord::from))
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<UserRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = Users::find()
            .filter(users::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await
            .context("Failed to query users by ids")?;

        Ok(users.into_iter().map(UserRecord::from).collect())
    }

    /// All manageable accounts. Rows with id <= 0 are sentinels and excluded.
    pub async fn list(&self) -> Result<Vec<UserRecord>> {
        let users = Users::find()
            .filter(users::Column::Id.gt(0))
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(users.into_iter().map(UserRecord::from).collect())
    }

    /// Look up by email and verify the password in one step.
    ///
    /// Returns `None` both for an unknown address and for a failed verify so
    /// callers cannot distinguish the two (no account enumeration).
    /// Argon2 verification runs in `spawn_blocking`; it is CPU-bound and
    /// would stall the async runtime otherwise.
    pub async fn verify_by_email(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserRecord>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user for login")?;

        let Some(user) = user else {
            return Ok(None);
        };

        let password_hash = user.password_hash.clone();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || verify_password(&password_hash, &password))
            .await
            .context("Password verification task panicked")??;

        Ok(is_valid.then(|| UserRecord::from(user)))
    }

    /// Verify a password for an already-resolved account.
    pub async fn verify_by_id(&self, id: i32, password: &str) -> Result<bool> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(false);
        };

        let password_hash = user.password_hash;
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || verify_password(&password_hash, &password))
            .await
            .context("Password verification task panicked")??;

        Ok(is_valid)
    }

    pub async fn insert(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        clearance: Clearance,
        needs_password_change: bool,
    ) -> Result<UserRecord> {
        let model = users::ActiveModel {
            email: Set(email.to_string()),
            name: Set(name.to_string()),
            password_hash: Set(password_hash.to_string()),
            needs_password_change: Set(needs_password_change),
            clearance: Set(clearance.bits()),
            last_login: Set(None),
            ..Default::default()
        };

        let user = model
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        Ok(UserRecord::from(user))
    }

    /// Update name and email. `Ok(None)` when the user does not exist;
    /// a unique-email collision surfaces as `Err`.
    pub async fn update_profile(
        &self,
        id: i32,
        name: &str,
        email: &str,
    ) -> Result<Option<UserRecord>> {
        let Some(user) = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for update")?
        else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        active.name = Set(name.to_string());
        active.email = Set(email.to_string());
        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update user")?;

        Ok(Some(UserRecord::from(updated)))
    }

    /// Replace the password hash and set the rotation flag. Returns false
    /// when the user does not exist.
    pub async fn update_password(
        &self,
        id: i32,
        password_hash: &str,
        needs_password_change: bool,
    ) -> Result<bool> {
        let Some(user) = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for password update")?
        else {
            return Ok(false);
        };

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(password_hash.to_string());
        active.needs_password_change = Set(needs_password_change);
        active
            .update(&self.conn)
            .await
            .context("Failed to store new password hash")?;

        Ok(true)
    }

    /// Stamp the login time and return the updated record, `None` when the
    /// user does not exist.
    pub async fn update_last_login(&self, id: i32) -> Result<Option<UserRecord>> {
        let Some(user) = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for login stamp")?
        else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        active.last_login = Set(Some(chrono::Utc::now().to_rfc3339()));
        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to stamp last login")?;

        Ok(Some(UserRecord::from(updated)))
    }

    /// OR the flag into the stored clearance. Returns false when the user
    /// does not exist. Granting an already-held flag is a no-op.
    pub async fn grant_role(&self, id: i32, flag: Clearance) -> Result<bool> {
        let Some(user) = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for role grant")?
        else {
            return Ok(false);
        };

        let clearance = Clearance::from_bits(user.clearance).with(flag);
        let mut active: users::ActiveModel = user.into();
        active.clearance = Set(clearance.bits());
        active
            .update(&self.conn)
            .await
            .context("Failed to grant role")?;

        Ok(true)
    }

    /// AND the stored clearance with the flag's complement. Same not-found
    /// contract as `grant_role`.
    pub async fn revoke_role(&self, id: i32, flag: Clearance) -> Result<bool> {
        let Some(user) = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for role revoke")?
        else {
            return Ok(false);
        };

        let clearance = Clearance::from_bits(user.clearance).without(flag);
        let mut active: users::ActiveModel = user.into();
        active.clearance = Set(clearance.bits());
        active
            .update(&self.conn)
            .await
            .context("Failed to revoke role")?;

        Ok(true)
    }

    /// Delete an account, preserving ledger history: entries the user
    /// recorded are re-parented to the sentinel actor id 0 in the same
    /// transaction as the delete.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let Some(user) = Users::find_by_id(id)
            .one(&txn)
            .await
            .context("Failed to query user for delete")?
        else {
            return Ok(false);
        };

        ScoreEntries::update_many()
            .col_expr(score_entries::Column::AddedById, 0.into())
            .filter(score_entries::Column::AddedById.eq(user.id))
            .exec(&txn)
            .await
            .context("Failed to re-parent score entries")?;

        Users::delete_by_id(id)
            .exec(&txn)
            .await
            .context("Failed to delete user")?;

        txn.commit().await?;
        Ok(true)
    }
}

/// Hash a password using Argon2id with the configured cost params.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

fn verify_password(password_hash: &str, password: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
