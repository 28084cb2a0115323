use sea_orm::entity::prelude::*;

/// One immutable ledger row: a signed point delta attributed to a target
/// user by an actor. Rows are only ever inserted and deleted; `added_by_id`
/// is re-parented to the protected id 0 when the actor account is deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "score_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// RFC 3339, server-assigned at insert.
    pub time: String,

    /// Target: who the points apply to.
    pub user_id: i32,

    /// Actor: who recorded the entry. 0 when the actor was deleted.
    pub added_by_id: i32,

    pub score: i32,

    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
