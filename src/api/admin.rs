use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::scores::IdQuery;
use super::{ApiError, ApiResponse, AppState, UserDto};

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub id: i32,
    pub name: String,
    pub email: String,
}

/// GET /admin/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let users = state.admin.list_users().await?;

    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDto::from).collect(),
    )))
}

/// GET /admin/user?id=
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.admin.get_user(query.id).await?;
    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// POST /admin/user
/// Create an account; the generated password goes out by mail.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state
        .admin
        .create_user(&payload.name, &payload.email)
        .await?;

    tracing::info!("User {} created", user.id);

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// PUT /admin/user
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state
        .admin
        .update_user(payload.id, &payload.name, &payload.email)
        .await?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// DELETE /admin/user?id=
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<IdQuery>,
) -> Result<StatusCode, ApiError> {
    state.admin.delete_user(&current.0, query.id).await?;

    tracing::info!("User {} deleted by {}", query.id, current.0.id);

    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/reset_password?id=
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.admin.reset_password(query.id).await?;

    tracing::info!("Password reset for user {}", query.id);

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// PUT /admin/{id}/admin
pub async fn grant_admin(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.admin.grant_admin(id).await?;
    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// DELETE /admin/{id}/admin
pub async fn revoke_admin(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.admin.revoke_admin(&current.0, id).await?;
    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// PUT /admin/{id}/wannabe
pub async fn grant_wannabe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.admin.grant_wannabe(id).await?;
    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// DELETE /admin/{id}/wannabe
pub async fn revoke_wannabe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.admin.revoke_wannabe(id).await?;
    Ok(Json(ApiResponse::success(UserDto::from(user))))
}
