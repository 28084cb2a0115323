use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::{prelude::*, score_entries};

/// Aggregated ledger row: a target user and the sum of their entries.
#[derive(Debug, Clone, Copy)]
pub struct ScoreTotal {
    pub user_id: i32,
    pub total: i64,
}

pub struct ScoreRepository {
    conn: DatabaseConnection,
}

impl ScoreRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<score_entries::Model>> {
        let entry = ScoreEntries::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query score entry")?;

        Ok(entry)
    }

    pub async fn insert(
        &self,
        user_id: i32,
        added_by_id: i32,
        score: i32,
        description: &str,
    ) -> Result<score_entries::Model> {
        let model = score_entries::ActiveModel {
            time: Set(chrono::Utc::now().to_rfc3339()),
            user_id: Set(user_id),
            added_by_id: Set(added_by_id),
            score: Set(score),
            description: Set(description.to_string()),
            ..Default::default()
        };

        let entry = model
            .insert(&self.conn)
            .await
            .context("Failed to insert score entry")?;

        Ok(entry)
    }

    /// Returns false when the entry was already gone.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = ScoreEntries::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete score entry")?;

        Ok(result.rows_affected > 0)
    }

    /// Ledger entries targeting one user, newest first.
    pub async fn for_user(&self, user_id: i32) -> Result<Vec<score_entries::Model>> {
        let entries = ScoreEntries::find()
            .filter(score_entries::Column::UserId.eq(user_id))
            .order_by_desc(score_entries::Column::Time)
            .all(&self.conn)
            .await
            .context("Failed to list score entries for user")?;

        Ok(entries)
    }

    /// Per-target totals over the whole ledger, highest total first.
    /// Targets with no entries do not appear.
    pub async fn totals(&self) -> Result<Vec<ScoreTotal>> {
        let rows: Vec<(i32, i64)> = ScoreEntries::find()
            .select_only()
            .column(score_entries::Column::UserId)
            .column_as(score_entries::Column::Score.sum(), "total")
            .group_by(score_entries::Column::UserId)
            .order_by_desc(score_entries::Column::Score.sum())
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to aggregate score totals")?;

        Ok(rows
            .into_iter()
            .map(|(user_id, total)| ScoreTotal { user_id, total })
            .collect())
    }
}
