//! Domain service for the append-only score ledger.

use thiserror::Error;

use crate::db::UserRecord;
use crate::entities::score_entries;

/// Errors specific to ledger operations.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// The actor holds the Wannabe flag and a -100 penalty entry has
    /// already been recorded against them.
    #[error("Wannabe. Why are you trying to touch the scores? -100 points.")]
    WannabePenalized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ScoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ScoreError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// One scoreboard row: a target and the sum of all their ledger entries.
/// The user is `None` when the account has since been deleted.
#[derive(Debug, Clone)]
pub struct LeaderboardRow {
    pub user: Option<UserRecord>,
    pub score: i64,
}

/// A ledger entry with its target and actor resolved. Either side is
/// `None` when that account no longer exists (the actor also after
/// re-parenting to the sentinel id).
#[derive(Debug, Clone)]
pub struct ScoreEntryView {
    pub entry: score_entries::Model,
    pub user: Option<UserRecord>,
    pub added_by: Option<UserRecord>,
}

/// Domain service trait for the score ledger.
#[async_trait::async_trait]
pub trait ScoreService: Send + Sync {
    /// Aggregated totals per target, highest first. Public.
    async fn leaderboard(&self) -> Result<Vec<LeaderboardRow>, ScoreError>;

    /// A single ledger entry.
    async fn get_entry(&self, id: i32) -> Result<ScoreEntryView, ScoreError>;

    /// All entries targeting one user, newest first.
    async fn user_entries(&self, user_id: i32) -> Result<Vec<ScoreEntryView>, ScoreError>;

    /// Appends an entry to the ledger.
    ///
    /// A Wannabe actor is penalized with a committed -100 entry against
    /// themselves before the request is rejected. Targets must hold the
    /// Wannabe flag.
    async fn submit(
        &self,
        actor: &UserRecord,
        target_id: i32,
        score: i32,
        description: &str,
    ) -> Result<ScoreEntryView, ScoreError>;

    /// Deletes an entry. Allowed for admins and for the entry's author;
    /// Wannabe actors are penalized the same way as on submit.
    async fn delete(&self, actor: &UserRecord, entry_id: i32) -> Result<(), ScoreError>;

    /// Runs the penalty rule on its own, for mutation requests that were
    /// rejected before their input could even be read. Returns the penalty
    /// error when the actor holds the Wannabe flag, `None` otherwise.
    async fn penalize_wannabe(&self, actor: &UserRecord, removal: bool) -> Option<ScoreError>;
}
