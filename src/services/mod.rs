pub mod admin_service;
pub mod admin_service_impl;
pub mod auth_service;
pub mod auth_service_impl;
pub mod score_service;
pub mod score_service_impl;

pub use admin_service::{AdminError, AdminService};
pub use admin_service_impl::SeaOrmAdminService;
pub use auth_service::{AuthError, AuthService};
pub use auth_service_impl::SeaOrmAuthService;
pub use score_service::{LeaderboardRow, ScoreEntryView, ScoreError, ScoreService};
pub use score_service_impl::SeaOrmScoreService;
