use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A quiz content collection. Questions are an opaque JSON array owned by the
/// content editors; the backend only requires it to be a non-empty array.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub questions: serde_json::Value,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
