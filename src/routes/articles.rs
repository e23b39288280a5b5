use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::Article;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ArticleRequest {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub body: String,
    #[serde(default)]
    pub published: bool,
}

fn validate_slug(slug: &str) -> Result<(), AppError> {
    let ok = !slug.is_empty()
        && slug.len() <= 80
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if ok {
        Ok(())
    } else {
        Err(AppError::BadRequest(
            "Slug must be lowercase letters, digits and hyphens".to_string(),
        ))
    }
}

pub async fn list(State(state): State<SharedState>) -> Result<Json<Vec<Article>>, AppError> {
    let articles = db::articles::list_published(&state.pool).await?;
    Ok(Json(articles))
}

pub async fn get(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Json<Article>, AppError> {
    let article = db::articles::find_published_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Article not found".to_string()))?;
    Ok(Json(article))
}

pub async fn create(
    State(state): State<SharedState>,
    auth: AuthUser,
    Json(req): Json<ArticleRequest>,
) -> Result<Json<Article>, AppError> {
    auth.require_admin()?;
    validate_slug(&req.slug)?;

    if req.title.trim().is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }

    let article = db::articles::create(
        &state.pool,
        &req.slug,
        req.title.trim(),
        &req.summary,
        &req.body,
        req.published,
    )
    .await
    .map_err(conflict_on_duplicate_slug)?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "article.created",
        "article",
        Some(article.id),
        None,
    )
    .await;

    Ok(Json(article))
}

pub async fn update(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ArticleRequest>,
) -> Result<Json<Article>, AppError> {
    auth.require_admin()?;
    validate_slug(&req.slug)?;

    let article = db::articles::update(
        &state.pool,
        id,
        &req.slug,
        req.title.trim(),
        &req.summary,
        &req.body,
        req.published,
    )
    .await
    .map_err(conflict_on_duplicate_slug)?
    .ok_or_else(|| AppError::NotFound("Article not found".to_string()))?;

    Ok(Json(article))
}

pub async fn delete(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require_admin()?;

    if !db::articles::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("Article not found".to_string()));
    }

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "article.deleted",
        "article",
        Some(id),
        None,
    )
    .await;

    Ok(Json(serde_json::json!({ "deleted": true })))
}

fn conflict_on_duplicate_slug(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("An article with that slug already exists".to_string())
        }
        other => AppError::Database(other),
    }
}
