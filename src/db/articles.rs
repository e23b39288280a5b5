use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Article;

pub async fn create(
    pool: &PgPool,
    slug: &str,
    title: &str,
    summary: &str,
    body: &str,
    published: bool,
) -> Result<Article, sqlx::Error> {
    sqlx::query_as::<_, Article>(
        "INSERT INTO articles (slug, title, summary, body, published)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(slug)
    .bind(title)
    .bind(summary)
    .bind(body)
    .bind(published)
    .fetch_one(pool)
    .await
}

pub async fn list_published(pool: &PgPool) -> Result<Vec<Article>, sqlx::Error> {
    sqlx::query_as::<_, Article>(
        "SELECT * FROM articles WHERE published = true ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await
}

pub async fn find_published_by_slug(
    pool: &PgPool,
    slug: &str,
) -> Result<Option<Article>, sqlx::Error> {
    sqlx::query_as::<_, Article>(
        "SELECT * FROM articles WHERE slug = $1 AND published = true",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Article>, sqlx::Error> {
    sqlx::query_as::<_, Article>("SELECT * FROM articles WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    slug: &str,
    title: &str,
    summary: &str,
    body: &str,
    published: bool,
) -> Result<Option<Article>, sqlx::Error> {
    sqlx::query_as::<_, Article>(
        "UPDATE articles
         SET slug = $2, title = $3, summary = $4, body = $5, published = $6, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(slug)
    .bind(title)
    .bind(summary)
    .bind(body)
    .bind(published)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM articles WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}
