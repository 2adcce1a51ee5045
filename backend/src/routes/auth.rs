//! Registration, login, and session upkeep.
//!
//! Registration is governed: once a super admin exists, only a super
//! admin token may create further accounts, and the total account count
//! is capped by `ADMIN_REGISTRATION_LIMIT`. The very first account is
//! promoted to super admin automatically.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{bearer_token, require_admin, require_super_admin};
use crate::error::{ApiError, ApiResult, FieldError};
use crate::models::{Admin, AdminProfile};
use crate::routes::MessageResponse;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub super_admin: bool,
    pub registration_open: bool,
    pub remaining_slots: u32,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub super_admin: bool,
    pub avatar: Option<String>,
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatusResponse {
    pub admin_count: u32,
    pub super_admin_exists: bool,
    pub registration_limit: u32,
    pub registration_open: bool,
    pub remaining_slots: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PingResponse {
    pub active: bool,
    pub last_active_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub minutes_remaining: Option<f64>,
}

/// POST /api/auth/register - Create an admin account.
async fn register(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let mut errors = Vec::new();
    if req.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }
    if !super::is_valid_email(&req.email) {
        errors.push(FieldError::new("email", "Please include a valid email"));
    }
    if req.password.len() < 6 {
        errors.push(FieldError::new(
            "password",
            "Password must be 6 or more characters",
        ));
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let email = req.email.trim().to_lowercase();
    if state.db.find_admin_by_email(&email)?.is_some() {
        return Err(ApiError::BadRequest("Admin already exists"));
    }

    let admin_count = state.db.count_admins()?;
    let limit = state.config.auth.registration_limit;
    if admin_count >= limit {
        return Err(ApiError::RegistrationLimitReached);
    }

    // After the first super admin exists, registration is invite-only:
    // the caller has to present a super admin token.
    let super_admin_exists = state.db.count_super_admins()? > 0;
    if super_admin_exists {
        let token = bearer_token(&headers).map_err(|_| {
            ApiError::Forbidden("Super admin authorization required to register admins")
        })?;
        let claims = state
            .token_keys
            .verify(token)
            .map_err(|_| ApiError::Unauthorized("Invalid token provided"))?;
        let requester = state.db.find_admin_by_id(&claims.sub)?;
        match requester {
            Some(requester) if requester.super_admin => {}
            _ => {
                return Err(ApiError::Forbidden(
                    "Only super admins can register new admins",
                ))
            }
        }
    }

    let is_first_admin = admin_count == 0;
    let password_hash = hash_password(req.password).await?;
    let now = Utc::now();
    let admin = Admin {
        id: uuid::Uuid::new_v4().to_string(),
        name: req.name.trim().to_string(),
        email,
        password_hash,
        role: "admin".to_string(),
        super_admin: is_first_admin,
        avatar: None,
        last_active_at: now,
        created_at: now,
    };
    state.db.insert_admin(&admin)?;
    info!(
        email = %admin.email,
        super_admin = admin.super_admin,
        "Admin registered"
    );

    let token = state.token_keys.issue(&admin.id)?;
    let remaining_slots = limit.saturating_sub(admin_count + 1);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: admin.id,
            name: admin.name,
            email: admin.email,
            role: admin.role,
            super_admin: admin.super_admin,
            registration_open: remaining_slots > 0,
            remaining_slots,
            token,
        }),
    ))
}

/// POST /api/auth/login - Exchange credentials for a token.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let mut errors = Vec::new();
    if !super::is_valid_email(&req.email) {
        errors.push(FieldError::new("email", "Please include a valid email"));
    }
    if req.password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let email = req.email.trim().to_lowercase();
    let Some(admin) = state.db.find_admin_by_email(&email)? else {
        return Err(ApiError::InvalidCredentials);
    };
    if !verify_password(req.password, admin.password_hash.clone()).await? {
        return Err(ApiError::InvalidCredentials);
    }

    state.db.update_last_active(&admin.id, Utc::now())?;
    let token = state.token_keys.issue(&admin.id)?;
    info!(email = %admin.email, "Admin logged in");

    Ok(Json(LoginResponse {
        id: admin.id,
        name: admin.name,
        email: admin.email,
        role: admin.role,
        super_admin: admin.super_admin,
        avatar: admin.avatar,
        token,
    }))
}

/// GET /api/auth/admin-status - Whether registration is still open.
async fn admin_status(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<AdminStatusResponse>> {
    let admin_count = state.db.count_admins()?;
    let super_admin_exists = state.db.count_super_admins()? > 0;
    let limit = state.config.auth.registration_limit;
    Ok(Json(AdminStatusResponse {
        admin_count,
        super_admin_exists,
        registration_limit: limit,
        registration_open: admin_count < limit,
        remaining_slots: limit.saturating_sub(admin_count),
    }))
}

/// GET /api/auth/me - Profile of the calling admin.
async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<AdminProfile>> {
    let admin = require_admin(&state, &headers)?;
    Ok(Json(admin.profile()))
}

/// POST /api/auth/ping - Session keepalive; reports time left on the token.
async fn ping(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<PingResponse>> {
    let admin = require_admin(&state, &headers)?;

    // A keepalive always counts as activity, even inside the refresh window.
    let now = Utc::now();
    state.db.update_last_active(&admin.id, now)?;

    let expires_at = bearer_token(&headers)
        .ok()
        .and_then(|token| state.token_keys.verify(token).ok())
        .and_then(|claims| Utc.timestamp_opt(claims.exp, 0).single());
    let minutes_remaining =
        expires_at.map(|at| ((at - now).num_seconds() as f64 / 60.0).max(0.0));

    Ok(Json(PingResponse {
        active: true,
        last_active_at: now,
        expires_at,
        minutes_remaining,
    }))
}

/// GET /api/auth/admins - Every admin account, oldest first.
async fn list_admins(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<AdminProfile>>> {
    require_admin(&state, &headers)?;
    let admins = state.db.list_admins()?;
    Ok(Json(admins.iter().map(Admin::profile).collect()))
}

/// DELETE /api/auth/admins/:id - Remove an admin account (super admin only).
async fn remove_admin(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let requester = require_super_admin(&state, &headers)?;
    super::users::delete_admin_account(&state, &requester, &id).await?;
    Ok(Json(MessageResponse {
        message: "Admin deleted successfully",
    }))
}

/// Hash on the blocking pool; bcrypt is deliberately slow.
async fn hash_password(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| ApiError::Internal(e.to_string()))
}

async fn verify_password(password: String, hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| ApiError::Internal(e.to_string()))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/admin-status", get(admin_status))
        .route("/me", get(me))
        .route("/ping", post(ping))
        .route("/admins", get(list_admins))
        .route("/admins/:id", delete(remove_admin))
        .with_state(state)
}
