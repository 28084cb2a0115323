//! `SeaORM` implementation of the `ScoreService` trait.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::warn;

use crate::api::validation::validate_description;
use crate::clearance::Clearance;
use crate::db::{Store, UserRecord};
use crate::entities::score_entries;
use crate::services::score_service::{LeaderboardRow, ScoreEntryView, ScoreError, ScoreService};

/// Size of the ledger entry appended against a Wannabe caught mutating.
const WANNABE_PENALTY: i32 = -100;

pub struct SeaOrmScoreService {
    store: Store,
}

impl SeaOrmScoreService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Records the -100 entry against a Wannabe actor. The entry targets
    /// the actor themselves and is committed before the rejection goes
    /// out; a failed penalty insert must not mask the rejection.
    async fn penalize(&self, actor: &UserRecord, description: &str) -> ScoreError {
        if let Err(e) = self
            .store
            .insert_score_entry(actor.id, actor.id, WANNABE_PENALTY, description)
            .await
        {
            warn!("Failed to record wannabe penalty for user {}: {e:#}", actor.id);
        }

        ScoreError::WannabePenalized
    }

    /// Resolves target and actor identities for a batch of entries.
    async fn attach_users(
        &self,
        entries: Vec<score_entries::Model>,
    ) -> Result<Vec<ScoreEntryView>, ScoreError> {
        let mut ids: Vec<i32> = entries
            .iter()
            .flat_map(|e| [e.user_id, e.added_by_id])
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let users: HashMap<i32, UserRecord> = self
            .store
            .get_users_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(entries
            .into_iter()
            .map(|entry| ScoreEntryView {
                user: users.get(&entry.user_id).cloned(),
                added_by: users.get(&entry.added_by_id).cloned(),
                entry,
            })
            .collect())
    }
}

#[async_trait]
impl ScoreService for SeaOrmScoreService {
    async fn leaderboard(&self) -> Result<Vec<LeaderboardRow>, ScoreError> {
        let totals = self.store.score_totals().await?;

        let ids: Vec<i32> = totals.iter().map(|t| t.user_id).collect();
        let mut users: HashMap<i32, UserRecord> = self
            .store
            .get_users_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        // Entries may outlive their target; such rows keep their total but
        // carry no user.
        Ok(totals
            .into_iter()
            .map(|t| LeaderboardRow {
                user: users.remove(&t.user_id),
                score: t.total,
            })
            .collect())
    }

    async fn get_entry(&self, id: i32) -> Result<ScoreEntryView, ScoreError> {
        let entry = self
            .store
            .get_score_entry(id)
            .await?
            .ok_or(ScoreError::NotFound("Score entry"))?;

        let users: HashMap<i32, UserRecord> = self
            .store
            .get_users_by_ids(&[entry.user_id, entry.added_by_id])
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(ScoreEntryView {
            user: users.get(&entry.user_id).cloned(),
            added_by: users.get(&entry.added_by_id).cloned(),
            entry,
        })
    }

    async fn user_entries(&self, user_id: i32) -> Result<Vec<ScoreEntryView>, ScoreError> {
        let entries = self.store.scores_for_user(user_id).await?;
        self.attach_users(entries).await
    }

    async fn submit(
        &self,
        actor: &UserRecord,
        target_id: i32,
        score: i32,
        description: &str,
    ) -> Result<ScoreEntryView, ScoreError> {
        if let Some(err) = self.penalize_wannabe(actor, false).await {
            return Err(err);
        }

        validate_description(description).map_err(ScoreError::Validation)?;

        let target = self
            .store
            .get_user(target_id)
            .await?
            .ok_or(ScoreError::NotFound("User"))?;

        if !target.clearance.contains(Clearance::WANNABE) {
            return Err(ScoreError::Forbidden(
                "Points can only be given to wannabes".to_string(),
            ));
        }

        let entry = self
            .store
            .insert_score_entry(target_id, actor.id, score, description)
            .await
            .map_err(|e| {
                warn!("Failed to insert score entry: {e:#}");
                ScoreError::Validation("Something went wrong".to_string())
            })?;

        Ok(ScoreEntryView {
            user: Some(target),
            added_by: Some(actor.clone()),
            entry,
        })
    }

    async fn delete(&self, actor: &UserRecord, entry_id: i32) -> Result<(), ScoreError> {
        if let Some(err) = self.penalize_wannabe(actor, true).await {
            return Err(err);
        }

        let entry = self
            .store
            .get_score_entry(entry_id)
            .await?
            .ok_or(ScoreError::NotFound("Score entry"))?;

        let is_admin = actor.clearance.contains(Clearance::ADMIN);
        let is_author = entry.added_by_id == actor.id;
        if !(is_admin || is_author) {
            return Err(ScoreError::Forbidden(
                "You may not remove these points".to_string(),
            ));
        }

        // The entry can vanish between the permission check and the
        // delete; treat that race as not found.
        let deleted = self.store.delete_score_entry(entry_id).await?;
        if !deleted {
            return Err(ScoreError::NotFound("Score entry"));
        }

        Ok(())
    }

    async fn penalize_wannabe(&self, actor: &UserRecord, removal: bool) -> Option<ScoreError> {
        if !actor.clearance.contains(Clearance::WANNABE) {
            return None;
        }

        let description = if removal {
            "Tried to remove points."
        } else {
            "Tried to add points."
        };

        Some(self.penalize(actor, description).await)
    }
}
