use sea_orm::entity::prelude::*;

/// Label lookup for clearance combinations.
///
/// One row per combination of the three flags, keyed by the mask value.
/// Presentation metadata only; authorization uses bitwise tests on the
/// user's clearance column directly.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "role_names")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,

    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
