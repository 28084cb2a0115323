use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Stored lowercase; unique across accounts.
    #[sea_orm(unique)]
    pub email: String,

    pub name: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Forces password rotation before any other authenticated action.
    pub needs_password_change: bool,

    /// OR-combination of the clearance flags (User=1, Admin=2, Wannabe=4).
    pub clearance: i32,

    /// RFC 3339; null until the first successful login.
    pub last_login: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
