use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::Quiz;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct QuizRequest {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    pub questions: serde_json::Value,
    #[serde(default)]
    pub published: bool,
}

fn default_category() -> String {
    "general".to_string()
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

fn validate(req: &QuizRequest) -> Result<(), AppError> {
    let slug_ok = !req.slug.is_empty()
        && req.slug.len() <= 80
        && req
            .slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !slug_ok {
        return Err(AppError::BadRequest(
            "Slug must be lowercase letters, digits and hyphens".to_string(),
        ));
    }
    if req.title.trim().is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }
    match req.questions.as_array() {
        Some(questions) if !questions.is_empty() => Ok(()),
        _ => Err(AppError::BadRequest(
            "Questions must be a non-empty array".to_string(),
        )),
    }
}

pub async fn list(
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Quiz>>, AppError> {
    let quizzes = db::quizzes::list_published(&state.pool, query.category.as_deref()).await?;
    Ok(Json(quizzes))
}

pub async fn get(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Json<Quiz>, AppError> {
    let quiz = db::quizzes::find_published_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;
    Ok(Json(quiz))
}

pub async fn create(
    State(state): State<SharedState>,
    auth: AuthUser,
    Json(req): Json<QuizRequest>,
) -> Result<Json<Quiz>, AppError> {
    auth.require_admin()?;
    validate(&req)?;

    let quiz = db::quizzes::create(
        &state.pool,
        &req.slug,
        req.title.trim(),
        &req.description,
        &req.category,
        &req.questions,
        req.published,
    )
    .await
    .map_err(conflict_on_duplicate_slug)?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "quiz.created",
        "quiz",
        Some(quiz.id),
        None,
    )
    .await;

    Ok(Json(quiz))
}

pub async fn update(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<QuizRequest>,
) -> Result<Json<Quiz>, AppError> {
    auth.require_admin()?;
    validate(&req)?;

    let quiz = db::quizzes::update(
        &state.pool,
        id,
        &req.slug,
        req.title.trim(),
        &req.description,
        &req.category,
        &req.questions,
        req.published,
    )
    .await
    .map_err(conflict_on_duplicate_slug)?
    .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

    Ok(Json(quiz))
}

pub async fn delete(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require_admin()?;

    if !db::quizzes::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "quiz.deleted",
        "quiz",
        Some(id),
        None,
    )
    .await;

    Ok(Json(serde_json::json!({ "deleted": true })))
}

fn conflict_on_duplicate_slug(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("A quiz with that slug already exists".to_string())
        }
        other => AppError::Database(other),
    }
}
