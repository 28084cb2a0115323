use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::db::Store;
use crate::mailer::{Mailer, NoopMailer, SmtpMailer};
use crate::services::{
    AdminService, AuthService, ScoreService, SeaOrmAdminService, SeaOrmAuthService,
    SeaOrmScoreService,
};

pub mod admin;
pub mod auth;
mod error;
pub mod scores;
mod system;
mod types;
pub mod validation;

pub use error::ApiError;
pub use types::*;

pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub auth: Arc<dyn AuthService>,

    pub scores: Arc<dyn ScoreService>,

    pub admin: Arc<dyn AdminService>,
}

pub fn create_app_state(config: Config, store: Store) -> anyhow::Result<Arc<AppState>> {
    let mailer: Arc<dyn Mailer> = if config.general.development {
        Arc::new(NoopMailer)
    } else {
        Arc::new(SmtpMailer::new(&config.smtp, &config.server)?)
    };

    let auth = Arc::new(SeaOrmAuthService::new(
        store.clone(),
        config.security.clone(),
    ));
    let scores = Arc::new(SeaOrmScoreService::new(store.clone()));
    let admin = Arc::new(SeaOrmAdminService::new(
        store.clone(),
        mailer,
        config.security.clone(),
    ));

    Ok(Arc::new(AppState {
        config,
        store,
        auth,
        scores,
        admin,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let protected_routes = create_protected_router(state.clone());

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(!state.config.general.development)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            state.config.security.session_idle_minutes,
        )));

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/scores", get(scores::leaderboard))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", get(auth::logout))
        .layer(session_layer)
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .route("/healthz", get(system::healthz))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let admin_routes = Router::new()
        .route("/admin/users", get(admin::list_users))
        .route("/admin/user", get(admin::get_user))
        .route("/admin/user", post(admin::create_user))
        .route("/admin/user", put(admin::update_user))
        .route("/admin/user", delete(admin::delete_user))
        .route("/admin/reset_password", post(admin::reset_password))
        .route("/admin/{id}/admin", put(admin::grant_admin))
        .route("/admin/{id}/admin", delete(admin::revoke_admin))
        .route("/admin/{id}/wannabe", put(admin::grant_wannabe))
        .route("/admin/{id}/wannabe", delete(admin::revoke_wannabe))
        .route_layer(middleware::from_fn(auth::require_admin));

    Router::new()
        .route("/score", get(scores::get_entry))
        .route("/score", post(scores::submit))
        .route("/score", delete(scores::delete_entry))
        .route("/users/{id}/scores", get(scores::user_entries))
        .route("/auth/change_password", post(auth::change_password))
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(state, auth::require_user))
}
