use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::User;
use crate::state::SharedState;

/// The caller's own profile, including fields hidden from public view.
#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: uuid::Uuid,
    pub username: String,
    pub email: String,
    pub recovery_email: String,
    pub display_name: String,
    pub role: String,
    pub total_score: i64,
    pub games_played: i32,
    pub created_at: DateTime<Utc>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            recovery_email: user.recovery_email,
            display_name: user.display_name,
            role: user.role,
            total_score: user.total_score,
            games_played: user.games_played,
            created_at: user.created_at,
        }
    }
}

/// What other players see.
#[derive(Serialize)]
pub struct PublicProfile {
    pub username: String,
    pub display_name: String,
    pub total_score: i64,
    pub games_played: i32,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicProfile {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            display_name: user.display_name,
            total_score: user.total_score,
            games_played: user.games_played,
            created_at: user.created_at,
        }
    }
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: String,
    pub recovery_email: String,
}

pub async fn me(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    Ok(Json(user.into()))
}

pub async fn update_me(
    State(state): State<SharedState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let display_name = req.display_name.trim();
    let recovery_email = req.recovery_email.trim();

    if display_name.is_empty() {
        return Err(AppError::BadRequest(
            "Display name cannot be empty".to_string(),
        ));
    }
    if !recovery_email.contains('@') {
        return Err(AppError::BadRequest(
            "Recovery email is not valid".to_string(),
        ));
    }

    let user = db::users::update_profile(&state.pool, auth.user_id, display_name, recovery_email)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    Ok(Json(user.into()))
}

pub async fn get_by_username(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Result<Json<PublicProfile>, AppError> {
    let user = db::users::find_by_username(&state.pool, &username.to_lowercase())
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    Ok(Json(user.into()))
}
