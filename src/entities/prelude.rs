pub use super::role_names::Entity as RoleNames;
pub use super::score_entries::Entity as ScoreEntries;
pub use super::users::Entity as Users;
