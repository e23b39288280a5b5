use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::GameResult;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct SubmitResultRequest {
    pub game: String,
    pub score: i64,
}

#[derive(Serialize)]
pub struct SubmitResultResponse {
    pub result: GameResult,
    pub total_score: i64,
    pub games_played: i32,
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// Record a finished mini-game and credit the score to the player's profile.
pub async fn submit_result(
    State(state): State<SharedState>,
    auth: AuthUser,
    Json(req): Json<SubmitResultRequest>,
) -> Result<Json<SubmitResultResponse>, AppError> {
    let game = req.game.trim();
    if game.is_empty() || game.len() > 64 {
        return Err(AppError::BadRequest("Invalid game identifier".to_string()));
    }
    if req.score < 0 {
        return Err(AppError::BadRequest(
            "Score cannot be negative".to_string(),
        ));
    }

    let (result, user) = db::game_results::submit(&state.pool, auth.user_id, game, req.score)
        .await?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "game.result_submitted",
        "game_result",
        Some(result.id),
        Some(serde_json::json!({ "game": game, "score": req.score })),
    )
    .await;

    Ok(Json(SubmitResultResponse {
        result,
        total_score: user.total_score,
        games_played: user.games_played,
    }))
}

pub async fn history(
    State(state): State<SharedState>,
    auth: AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<GameResult>>, AppError> {
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let results = db::game_results::list_for_user(&state.pool, auth.user_id, limit).await?;
    Ok(Json(results))
}
