//! The session gate every protected request passes through.

use axum::http::HeaderMap;
use chrono::Utc;

use crate::error::ApiError;
use crate::models::Admin;
use crate::AppState;

/// Minimum idle minutes before `lastActiveAt` is rewritten. Keeps busy
/// dashboards from issuing a write per request.
const ACTIVITY_REFRESH_MINUTES: i64 = 1;

/// Pull the bearer token out of the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get("authorization")
        .ok_or(ApiError::MissingToken)?
        .to_str()
        .map_err(|_| ApiError::MissingToken)?;
    header.strip_prefix("Bearer ").ok_or(ApiError::MissingToken)
}

/// Validate a raw token: signature, expiry, admin role, and the sliding
/// inactivity window. Refreshes `lastActiveAt` when at least
/// [`ACTIVITY_REFRESH_MINUTES`] have passed. Also used by the WebSocket
/// admin-room join, which carries its token in a message.
pub fn authenticate_token(state: &AppState, token: &str) -> Result<Admin, ApiError> {
    let claims = state.token_keys.verify(token)?;

    let mut admin = state
        .db
        .find_admin_by_id(&claims.sub)?
        .ok_or(ApiError::Forbidden("Not authorized, admin role required"))?;
    if !admin.is_admin() {
        return Err(ApiError::Forbidden("Not authorized, admin role required"));
    }

    let now = Utc::now();
    let idle_minutes = (now - admin.last_active_at).num_minutes();
    if idle_minutes >= state.config.auth.session_ttl_minutes {
        return Err(ApiError::SessionInactive);
    }

    if idle_minutes >= ACTIVITY_REFRESH_MINUTES {
        state.db.update_last_active(&admin.id, now)?;
        admin.last_active_at = now;
    }

    Ok(admin)
}

/// Gate for protected routes.
pub fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<Admin, ApiError> {
    let token = bearer_token(headers)?;
    authenticate_token(state, token)
}

/// Gate for the account-management routes.
pub fn require_super_admin(state: &AppState, headers: &HeaderMap) -> Result<Admin, ApiError> {
    let admin = require_admin(state, headers)?;
    if !admin.super_admin {
        return Err(ApiError::Forbidden(
            "Not authorized. Super admin access required.",
        ));
    }
    Ok(admin)
}
