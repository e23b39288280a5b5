use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct RankingsQuery {
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct RankingEntry {
    pub rank: i64,
    pub username: String,
    pub display_name: String,
    pub total_score: i64,
    pub games_played: i32,
}

#[derive(Serialize)]
pub struct MyRankResponse {
    pub rank: i64,
    pub total_score: i64,
    pub games_played: i32,
}

pub async fn top(
    State(state): State<SharedState>,
    Query(query): Query<RankingsQuery>,
) -> Result<Json<Vec<RankingEntry>>, AppError> {
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let users = db::users::leaderboard(&state.pool, limit).await?;

    let entries = users
        .into_iter()
        .enumerate()
        .map(|(i, user)| RankingEntry {
            rank: i as i64 + 1,
            username: user.username,
            display_name: user.display_name,
            total_score: user.total_score,
            games_played: user.games_played,
        })
        .collect();

    Ok(Json(entries))
}

pub async fn me(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<MyRankResponse>, AppError> {
    let user = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    let rank = db::users::rank_of(&state.pool, user.id)
        .await?
        .unwrap_or(1);

    Ok(Json(MyRankResponse {
        rank,
        total_score: user.total_score,
        games_played: user.games_played,
    }))
}
