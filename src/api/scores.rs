use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::{ApiError, ApiResponse, AppState, LeaderboardRowDto, ScoreEntryDto};

#[derive(Deserialize)]
pub struct IdQuery {
    pub id: i32,
}

#[derive(Deserialize)]
pub struct SubmitScoreRequest {
    pub user_id: i32,
    pub score: i32,
    pub description: String,
}

/// GET /scores
/// The public leaderboard: per-user totals, highest first.
pub async fn leaderboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<LeaderboardRowDto>>>, ApiError> {
    let rows = state.scores.leaderboard().await?;

    Ok(Json(ApiResponse::success(
        rows.into_iter().map(LeaderboardRowDto::from).collect(),
    )))
}

/// GET /score?id=
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
) -> Result<Json<ApiResponse<ScoreEntryDto>>, ApiError> {
    let entry = state.scores.get_entry(query.id).await?;
    Ok(Json(ApiResponse::success(ScoreEntryDto::from(entry))))
}

/// POST /score
///
/// The Wannabe penalty applies even when the body never parses, so the
/// rejection is surfaced only after the penalty rule has run.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    payload: Result<Json<SubmitScoreRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ScoreEntryDto>>, ApiError> {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            if let Some(err) = state.scores.penalize_wannabe(&current.0, false).await {
                return Err(err.into());
            }
            return Err(ApiError::validation(rejection.body_text()));
        }
    };

    let entry = state
        .scores
        .submit(
            &current.0,
            payload.user_id,
            payload.score,
            &payload.description,
        )
        .await?;

    Ok(Json(ApiResponse::success(ScoreEntryDto::from(entry))))
}

/// DELETE /score?id=
///
/// Same penalty-before-parsing rule as on submit.
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<StatusCode, ApiError> {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            if let Some(err) = state.scores.penalize_wannabe(&current.0, true).await {
                return Err(err.into());
            }
            return Err(ApiError::validation(rejection.body_text()));
        }
    };

    state.scores.delete(&current.0, query.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/{id}/scores
/// The full ledger for one target, newest first.
pub async fn user_entries(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<ScoreEntryDto>>>, ApiError> {
    let entries = state.scores.user_entries(user_id).await?;

    Ok(Json(ApiResponse::success(
        entries.into_iter().map(ScoreEntryDto::from).collect(),
    )))
}
