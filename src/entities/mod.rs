pub mod prelude;

pub mod role_names;
pub mod score_entries;
pub mod users;
