use serde::Serialize;

use crate::db::UserRecord;
use crate::services::{LeaderboardRow, ScoreEntryView};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Clearance bitmask plus its display label.
#[derive(Debug, Serialize)]
pub struct ClearanceDto {
    pub id: i32,
    pub name: String,
}

/// Full account view, only served to the account itself and to admins.
#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub needs_password_change: bool,
    pub clearance: ClearanceDto,
    pub last_login: Option<String>,
}

impl From<UserRecord> for UserDto {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            needs_password_change: user.needs_password_change,
            clearance: ClearanceDto {
                id: user.clearance.bits(),
                name: user.clearance.label(),
            },
            last_login: user.last_login,
        }
    }
}

/// What the public scoreboard reveals about a user.
#[derive(Debug, Serialize)]
pub struct PublicUserDto {
    pub id: i32,
    pub name: String,
}

impl From<UserRecord> for PublicUserDto {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name,
        }
    }
}

/// `user` and `added_by` carry public identities; either is null when that
/// account no longer exists.
#[derive(Debug, Serialize)]
pub struct ScoreEntryDto {
    pub id: i32,
    pub time: String,
    pub user: Option<PublicUserDto>,
    pub added_by: Option<PublicUserDto>,
    pub score: i32,
    pub description: String,
}

impl From<ScoreEntryView> for ScoreEntryDto {
    fn from(view: ScoreEntryView) -> Self {
        Self {
            id: view.entry.id,
            time: view.entry.time,
            user: view.user.map(PublicUserDto::from),
            added_by: view.added_by.map(PublicUserDto::from),
            score: view.entry.score,
            description: view.entry.description,
        }
    }
}

/// `user` is null when the target account has been deleted; the total
/// stays on the board.
#[derive(Debug, Serialize)]
pub struct LeaderboardRowDto {
    pub user: Option<PublicUserDto>,
    pub score: i64,
}

impl From<LeaderboardRow> for LeaderboardRowDto {
    fn from(row: LeaderboardRow) -> Self {
        Self {
            user: row.user.map(PublicUserDto::from),
            score: row.score,
        }
    }
}
