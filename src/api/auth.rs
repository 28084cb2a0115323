use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::{Expiry, Session};

use super::{ApiError, ApiResponse, AppState, UserDto};
use crate::clearance::Clearance;
use crate::db::UserRecord;

/// Session key holding the logged-in account id.
pub const SESSION_USER_KEY: &str = "user_id";

/// How long a "remember me" session survives without activity.
const SESSION_LIFETIME_DAYS: i64 = 30;

/// The logged-in account, stashed in request extensions by [`require_user`]
/// so handlers and the admin guard can read it without another lookup.
#[derive(Clone)]
pub struct CurrentUser(pub UserRecord);

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub password_confirm: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Session guard for everything behind a login.
///
/// A user who still owes a password rotation may only reach the password
/// change endpoint; everything else answers 403 until they rotate.
pub async fn require_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id: Option<i32> = session
        .get(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;

    let Some(user_id) = user_id else {
        return Err(ApiError::unauthorized("You are not logged in"));
    };

    // A session can outlive its account.
    let Some(user) = state.auth.get_user(user_id).await? else {
        return Err(ApiError::unauthorized("You are not logged in"));
    };

    if user.needs_password_change && !request.uri().path().ends_with("/auth/change_password") {
        return Err(ApiError::forbidden("You must change your password"));
    }

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Admin guard. Runs inside [`require_user`], so the account is already in
/// the request extensions.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let is_admin = request
        .extensions()
        .get::<CurrentUser>()
        .is_some_and(|u| u.0.clearance.contains(Clearance::ADMIN));

    if !is_admin {
        return Err(ApiError::forbidden(
            "You do not have access to this resource",
        ));
    }

    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
/// Authenticate with email and password. Logging in while already logged
/// in just returns the current account.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    if let Ok(Some(user_id)) = session.get::<i32>(SESSION_USER_KEY).await
        && let Some(user) = state.auth.get_user(user_id).await?
    {
        return Ok(Json(ApiResponse::success(UserDto::from(user))));
    }

    let user = state.auth.login(&payload.email, &payload.password).await?;

    // Fresh session id on every login.
    session
        .flush()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to reset session: {e}")))?;
    session
        .insert(SESSION_USER_KEY, user.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;
    session.set_expiry(Some(Expiry::OnInactivity(time::Duration::days(
        SESSION_LIFETIME_DAYS,
    ))));

    tracing::info!("User {} logged in", user.id);

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// GET /auth/logout
/// Drop the session. Always succeeds, logged in or not.
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    StatusCode::NO_CONTENT
}

/// POST /auth/change_password
/// Rotate the password. This is the only authenticated endpoint reachable
/// while the rotation flag is set.
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    axum::Extension(current): axum::Extension<CurrentUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .auth
        .change_password(
            current.0.id,
            &payload.old_password,
            &payload.new_password,
            &payload.password_confirm,
        )
        .await?;

    tracing::info!("Password changed for user {}", current.0.id);

    Ok(StatusCode::NO_CONTENT)
}
