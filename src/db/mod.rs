use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::clearance::Clearance;
use crate::entities::score_entries;

pub mod migrator;
pub mod repositories;
pub mod seed;

pub use repositories::score::ScoreTotal;
pub use repositories::user::{UserRecord, hash_password};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with("sqlite::memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn score_repo(&self) -> repositories::score::ScoreRepository {
        repositories::score::ScoreRepository::new(self.conn.clone())
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<UserRecord>> {
        self.user_repo().get(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_users_by_ids(&self, ids: &[i32]) -> Result<Vec<UserRecord>> {
        self.user_repo().get_by_ids(ids).await
    }

    pub async fn list_users(&self) -> Result<Vec<UserRecord>> {
        self.user_repo().list().await
    }

    pub async fn verify_user_by_email(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserRecord>> {
        self.user_repo().verify_by_email(email, password).await
    }

    pub async fn verify_user_password(&self, id: i32, password: &str) -> Result<bool> {
        self.user_repo().verify_by_id(id, password).await
    }

    pub async fn insert_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        clearance: Clearance,
        needs_password_change: bool,
    ) -> Result<UserRecord> {
        self.user_repo()
            .insert(name, email, password_hash, clearance, needs_password_change)
            .await
    }

    pub async fn update_user_profile(
        &self,
        id: i32,
        name: &str,
        email: &str,
    ) -> Result<Option<UserRecord>> {
        self.user_repo().update_profile(id, name, email).await
    }

    pub async fn update_user_password(
        &self,
        id: i32,
        password_hash: &str,
        needs_password_change: bool,
    ) -> Result<bool> {
        self.user_repo()
            .update_password(id, password_hash, needs_password_change)
            .await
    }

    pub async fn update_last_login(&self, id: i32) -> Result<Option<UserRecord>> {
        self.user_repo().update_last_login(id).await
    }

    pub async fn grant_role(&self, id: i32, flag: Clearance) -> Result<bool> {
        self.user_repo().grant_role(id, flag).await
    }

    pub async fn revoke_role(&self, id: i32, flag: Clearance) -> Result<bool> {
        self.user_repo().revoke_role(id, flag).await
    }

    pub async fn delete_user(&self, id: i32) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    pub async fn get_score_entry(&self, id: i32) -> Result<Option<score_entries::Model>> {
        self.score_repo().get(id).await
    }

    pub async fn insert_score_entry(
        &self,
        user_id: i32,
        added_by_id: i32,
        score: i32,
        description: &str,
    ) -> Result<score_entries::Model> {
        self.score_repo()
            .insert(user_id, added_by_id, score, description)
            .await
    }

    pub async fn delete_score_entry(&self, id: i32) -> Result<bool> {
        self.score_repo().delete(id).await
    }

    pub async fn scores_for_user(&self, user_id: i32) -> Result<Vec<score_entries::Model>> {
        self.score_repo().for_user(user_id).await
    }

    pub async fn score_totals(&self) -> Result<Vec<ScoreTotal>> {
        self.score_repo().totals().await
    }
}
