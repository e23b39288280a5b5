use std::sync::LazyLock;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use bytes::Bytes;
use chrono::{Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::auth::extractor::AuthUser;
use crate::auth::jwt::{encode_token, Claims};
use crate::auth::password;
use crate::config::RegistrationMode;
use crate::db;
use crate::error::AppError;
use crate::middleware::audit;
use crate::state::SharedState;

/// Validity window for password reset links.
const RESET_TOKEN_TTL_MINUTES: i64 = 30;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]{3,32}$").expect("valid username regex"));

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetConfirmRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Body shape shared by both reset endpoints: `{ ok: true }` or
/// `{ ok: false, message }`.
#[derive(Serialize)]
pub struct ResetStatus {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResetStatus {
    fn ok() -> Json<Self> {
        Json(Self {
            ok: true,
            message: None,
        })
    }

    fn fail(status: StatusCode, message: &str) -> (StatusCode, Json<Self>) {
        (
            status,
            Json(Self {
                ok: false,
                message: Some(message.to_string()),
            }),
        )
    }
}

fn auth_cookies(access_token: &str, refresh_token: &str) -> CookieJar {
    let access = Cookie::build(("access_token", access_token.to_string()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(15))
        .build();

    let refresh = Cookie::build(("refresh_token", refresh_token.to_string()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(7))
        .build();

    CookieJar::new().add(access).add(refresh)
}

fn clear_auth_cookies() -> CookieJar {
    let access = Cookie::build(("access_token", ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();
    let refresh = Cookie::build(("refresh_token", ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();
    CookieJar::new().add(access).add(refresh)
}

fn generate_secret() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

async fn issue_session(
    state: &SharedState,
    user_id: uuid::Uuid,
    role: &str,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let claims = Claims::new(user_id, role.to_string());
    let access_token =
        encode_token(&claims, &state.config.jwt_secret).map_err(AppError::Internal)?;

    let refresh = generate_secret();
    let refresh_hash = hash_token(&refresh);
    db::refresh_tokens::create(
        &state.pool,
        user_id,
        &refresh_hash,
        Utc::now() + Duration::days(7),
    )
    .await?;

    let jar = auth_cookies(&access_token, &refresh);
    Ok((
        jar,
        Json(AuthResponse {
            access_token,
            refresh_token: refresh,
        }),
    ))
}

pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let username = req.username.trim().to_lowercase();
    let email = req.email.trim().to_string();

    if username.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest("All fields are required".to_string()));
    }

    if !USERNAME_RE.is_match(&username) {
        return Err(AppError::BadRequest(
            "Username must be 3-32 characters: lowercase letters, digits, underscore".to_string(),
        ));
    }

    password::validate_strength(&req.password).map_err(AppError::BadRequest)?;

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;

    // Advisory lock prevents concurrent bootstrap registrations
    let mut tx = state.pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock(1)")
        .execute(&mut *tx)
        .await?;

    let count = db::users::count_all(&mut *tx).await?;
    let role = if count == 0 { "admin" } else { "user" };

    if count > 0 && state.config.registration == RegistrationMode::Closed {
        return Err(AppError::Forbidden(
            "Registration is currently closed".to_string(),
        ));
    }

    let display_name = req
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(&username)
        .to_string();

    let user = db::users::create(
        &mut *tx,
        &username,
        &email,
        &email,
        &pw_hash,
        &display_name,
        role,
    )
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("Username or email already taken".to_string())
        }
        other => AppError::Database(other),
    })?;

    tx.commit().await?;

    audit::log_event(
        &state.pool,
        Some(user.id),
        "user.registered",
        "user",
        Some(user.id),
        None,
    )
    .await;

    if let Some(mailer) = state.system_mailer.clone() {
        let base_url = state.config.base_url.clone();
        let to = user.email.clone();
        let name = user.display_name.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.send_welcome(&to, &name, &base_url).await {
                tracing::warn!("Failed to send welcome email: {e}");
            }
        });
    }

    issue_session(&state, user.id, &user.role).await
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    // Rate limit check
    if state.login_limiter.check(&req.email).is_err() {
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    // Unknown emails count against the limiter too, so probing nonexistent
    // accounts is bounded the same way as wrong passwords.
    let Some(user) = db::users::find_by_email(&state.pool, req.email.trim()).await? else {
        state.login_limiter.record_failure(&req.email);
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    };

    let valid = password::verify(&req.password, &user.password_hash).map_err(AppError::Internal)?;

    if !valid {
        state.login_limiter.record_failure(&req.email);
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    audit::log_event(
        &state.pool,
        Some(user.id),
        "user.login",
        "user",
        Some(user.id),
        None,
    )
    .await;

    issue_session(&state, user.id, &user.role).await
}

pub async fn refresh(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let refresh_value = jar
        .get("refresh_token")
        .map(|c| c.value().to_string())
        .ok_or_else(|| AppError::Unauthorized("Missing refresh token".to_string()))?;

    let token_hash = hash_token(&refresh_value);

    let stored = db::refresh_tokens::find_by_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    if stored.used {
        tracing::warn!(
            "Refresh token reuse detected for user {}. Nuking all sessions.",
            stored.user_id
        );
        db::refresh_tokens::delete_all_for_user(&state.pool, stored.user_id).await?;
        return Err(AppError::Unauthorized(
            "Refresh token reuse detected. All sessions revoked.".to_string(),
        ));
    }

    if stored.expires_at < Utc::now() {
        return Err(AppError::Unauthorized("Refresh token expired".to_string()));
    }

    db::refresh_tokens::mark_used(&state.pool, stored.id).await?;

    let user = db::users::find_by_id(&state.pool, stored.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    issue_session(&state, user.id, &user.role).await
}

pub async fn logout(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    if let Some(cookie) = jar.get("refresh_token") {
        let token_hash = hash_token(cookie.value());
        db::refresh_tokens::delete_by_hash(&state.pool, &token_hash).await?;
    }

    Ok((
        clear_auth_cookies(),
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    ))
}

/// Request a password reset link. This endpoint is anti-enumeration: every
/// branch (malformed body, unknown user, wrong recovery email, rate limited,
/// storage or SMTP failure) produces exactly `200 { "ok": true }`. The real
/// work happens in a background task so the response is uniform.
pub async fn reset_request(State(state): State<SharedState>, body: Bytes) -> Json<ResetStatus> {
    let response = ResetStatus::ok();

    let Ok(value) = serde_json::from_slice::<serde_json::Value>(&body) else {
        return response;
    };

    let (Some(user_id), Some(recovery_email)) = (
        value.get("userId").and_then(|v| v.as_str()),
        value.get("recoveryEmail").and_then(|v| v.as_str()),
    ) else {
        return response;
    };

    let username = user_id.trim().to_lowercase();
    // Usernames never contain '@'; treat such input as malformed
    if username.is_empty() || username.contains('@') {
        return response;
    }

    if state.reset_limiter.check(&username).is_err() {
        tracing::warn!("Reset request flood for username {username}, dropping");
        return response;
    }

    let claimed_email = normalize_email(recovery_email);
    let pool = state.pool.clone();
    let mailer = state.system_mailer.clone();
    let base_url = state.config.base_url.clone();

    tokio::spawn(async move {
        let user = match db::users::find_by_username(&pool, &username).await {
            Ok(Some(user)) => user,
            Ok(None) => return,
            Err(e) => {
                tracing::error!("Reset request lookup failed: {e}");
                return;
            }
        };

        if normalize_email(&user.recovery_email) != claimed_email {
            return;
        }

        let secret = generate_secret();
        let token_hash = hash_token(&secret);
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);

        if let Err(e) =
            db::password_reset_tokens::create(&pool, user.id, &token_hash, expires_at).await
        {
            tracing::error!("Failed to store password reset token: {e}");
            return;
        }

        audit::log_event(
            &pool,
            Some(user.id),
            "user.reset_requested",
            "user",
            Some(user.id),
            None,
        )
        .await;

        let reset_url = format!("{base_url}/user/reset-password?token={secret}");
        match mailer {
            Some(mailer) => {
                if let Err(e) = mailer
                    .send_password_reset(&user.recovery_email, &reset_url)
                    .await
                {
                    tracing::error!("Failed to send password reset email: {e}");
                }
            }
            None => {
                tracing::warn!("System SMTP not configured. Password reset token: {secret}");
            }
        }
    });

    response
}

/// Redeem a reset link. Unlike the request endpoint, state errors get
/// distinct messages; success and failure are signalled in the body so the
/// frontend never has to infer state from the status code alone.
pub async fn reset_confirm(
    State(state): State<SharedState>,
    Json(req): Json<ResetConfirmRequest>,
) -> Result<Json<ResetStatus>, (StatusCode, Json<ResetStatus>)> {
    // Password policy comes before any lookup
    if let Err(message) = password::validate_strength(&req.new_password) {
        return Err(ResetStatus::fail(StatusCode::BAD_REQUEST, &message));
    }

    let token_hash = hash_token(&req.token);

    let token = db::password_reset_tokens::find_by_hash(&state.pool, &token_hash)
        .await
        .map_err(internal_reset_error)?
        .ok_or_else(|| {
            ResetStatus::fail(StatusCode::BAD_REQUEST, "Invalid or expired reset link")
        })?;

    if token.used_at.is_some() {
        return Err(ResetStatus::fail(
            StatusCode::BAD_REQUEST,
            "This reset link has already been used",
        ));
    }

    if token.expires_at < Utc::now() {
        return Err(ResetStatus::fail(
            StatusCode::BAD_REQUEST,
            "This reset link has expired",
        ));
    }

    let user = db::users::find_by_id(&state.pool, token.user_id)
        .await
        .map_err(internal_reset_error)?
        .ok_or_else(|| {
            ResetStatus::fail(StatusCode::BAD_REQUEST, "Invalid or expired reset link")
        })?;

    let same_as_old = password::verify(&req.new_password, &user.password_hash)
        .map_err(internal_reset_error)?;
    if same_as_old {
        return Err(ResetStatus::fail(
            StatusCode::BAD_REQUEST,
            "New password must be different from your current password",
        ));
    }

    let pw_hash = password::hash(&req.new_password).map_err(internal_reset_error)?;
    db::users::update_password(&state.pool, user.id, &pw_hash)
        .await
        .map_err(internal_reset_error)?;

    // Single conditional update is the arbitration point for concurrent
    // confirmations: exactly one caller sees rows_affected == 1.
    let consumed = db::password_reset_tokens::consume(&state.pool, token.id)
        .await
        .map_err(internal_reset_error)?;
    if !consumed {
        return Err(ResetStatus::fail(
            StatusCode::BAD_REQUEST,
            "This reset link has already been used",
        ));
    }

    db::refresh_tokens::delete_all_for_user(&state.pool, user.id)
        .await
        .map_err(internal_reset_error)?;

    audit::log_event(
        &state.pool,
        Some(user.id),
        "user.password_reset",
        "user",
        Some(user.id),
        None,
    )
    .await;

    Ok(ResetStatus::ok())
}

fn internal_reset_error<E: std::fmt::Display>(err: E) -> (StatusCode, Json<ResetStatus>) {
    tracing::error!("Password reset failed: {err}");
    ResetStatus::fail(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Something went wrong. Please try again.",
    )
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn change_password(
    State(state): State<SharedState>,
    auth: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    password::validate_strength(&req.new_password).map_err(AppError::BadRequest)?;

    let user = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    let valid =
        password::verify(&req.current_password, &user.password_hash).map_err(AppError::Internal)?;

    if !valid {
        return Err(AppError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let pw_hash = password::hash(&req.new_password).map_err(AppError::Internal)?;
    db::users::update_password(&state.pool, user.id, &pw_hash).await?;

    // Nuke all existing refresh tokens
    db::refresh_tokens::delete_all_for_user(&state.pool, user.id).await?;

    audit::log_event(
        &state.pool,
        Some(user.id),
        "user.password_changed",
        "user",
        Some(user.id),
        None,
    )
    .await;

    issue_session(&state, user.id, &user.role).await
}
