pub mod articles;
pub mod auth;
pub mod games;
pub mod profile;
pub mod quizzes;
pub mod rankings;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/reset-request", post(auth::reset_request))
        .route("/api/v1/auth/reset-confirm", post(auth::reset_confirm))
        .route("/api/v1/auth/change-password", post(auth::change_password))
        // Profile
        .route("/api/v1/me", get(profile::me).put(profile::update_me))
        .route("/api/v1/users/{username}", get(profile::get_by_username))
        // Articles
        .route(
            "/api/v1/articles",
            get(articles::list).post(articles::create),
        )
        .route("/api/v1/articles/{slug}", get(articles::get))
        .route(
            "/api/v1/articles/id/{id}",
            put(articles::update).delete(articles::delete),
        )
        // Quizzes
        .route("/api/v1/quizzes", get(quizzes::list).post(quizzes::create))
        .route("/api/v1/quizzes/{slug}", get(quizzes::get))
        .route(
            "/api/v1/quizzes/id/{id}",
            put(quizzes::update).delete(quizzes::delete),
        )
        // Games
        .route("/api/v1/games/results", post(games::submit_result))
        .route("/api/v1/games/history", get(games::history))
        // Rankings
        .route("/api/v1/rankings", get(rankings::top))
        .route("/api/v1/rankings/me", get(rankings::me))
}
