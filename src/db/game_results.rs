use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{GameResult, User};

/// Record a finished game and fold the score into the player's profile totals
/// in one transaction. Returns the result row and the updated profile.
pub async fn submit(
    pool: &PgPool,
    user_id: Uuid,
    game: &str,
    score: i64,
) -> Result<(GameResult, User), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query_as::<_, GameResult>(
        "INSERT INTO game_results (user_id, game, score)
         VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(user_id)
    .bind(game)
    .bind(score)
    .fetch_one(&mut *tx)
    .await?;

    let user = sqlx::query_as::<_, User>(
        "UPDATE users
         SET total_score = total_score + $2, games_played = games_played + 1
         WHERE id = $1 RETURNING *",
    )
    .bind(user_id)
    .bind(score)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok((result, user))
}

pub async fn list_for_user(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<GameResult>, sqlx::Error> {
    sqlx::query_as::<_, GameResult>(
        "SELECT * FROM game_results WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}
