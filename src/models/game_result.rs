use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct GameResult {
    pub id: Uuid,
    pub user_id: Uuid,
    pub game: String,
    pub score: i64,
    pub created_at: DateTime<Utc>,
}
