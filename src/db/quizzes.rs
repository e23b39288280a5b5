use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Quiz;

pub async fn create(
    pool: &PgPool,
    slug: &str,
    title: &str,
    description: &str,
    category: &str,
    questions: &serde_json::Value,
    published: bool,
) -> Result<Quiz, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(
        "INSERT INTO quizzes (slug, title, description, category, questions, published)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(slug)
    .bind(title)
    .bind(description)
    .bind(category)
    .bind(questions)
    .bind(published)
    .fetch_one(pool)
    .await
}

pub async fn list_published(
    pool: &PgPool,
    category: Option<&str>,
) -> Result<Vec<Quiz>, sqlx::Error> {
    match category {
        Some(category) => {
            sqlx::query_as::<_, Quiz>(
                "SELECT * FROM quizzes WHERE published = true AND category = $1
                 ORDER BY created_at DESC",
            )
            .bind(category)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, Quiz>(
                "SELECT * FROM quizzes WHERE published = true ORDER BY created_at DESC",
            )
            .fetch_all(pool)
            .await
        }
    }
}

pub async fn find_published_by_slug(
    pool: &PgPool,
    slug: &str,
) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>("SELECT * FROM quizzes WHERE slug = $1 AND published = true")
        .bind(slug)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>("SELECT * FROM quizzes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    slug: &str,
    title: &str,
    description: &str,
    category: &str,
    questions: &serde_json::Value,
    published: bool,
) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(
        "UPDATE quizzes
         SET slug = $2, title = $3, description = $4, category = $5, questions = $6,
             published = $7, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(slug)
    .bind(title)
    .bind(description)
    .bind(category)
    .bind(questions)
    .bind(published)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM quizzes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}
