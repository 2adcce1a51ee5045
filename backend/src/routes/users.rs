//! Admin account management: profile edits, avatars, and the
//! super-admin-only account list.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::HeaderMap;
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{require_admin, require_super_admin};
use crate::error::{ApiError, ApiResult, FieldError};
use crate::models::{Admin, AdminProfile};
use crate::routes::MessageResponse;
use crate::uploads::{self, UploadKind};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvatarResponse {
    pub message: &'static str,
    pub avatar: String,
}

/// GET /api/users/me - Profile of the calling admin.
async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<AdminProfile>> {
    let admin = require_admin(&state, &headers)?;
    Ok(Json(admin.profile()))
}

/// PUT /api/users/profile - Update the caller's name and email.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<AdminProfile>> {
    let admin = require_admin(&state, &headers)?;

    let mut errors = Vec::new();
    if req.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }
    if !super::is_valid_email(&req.email) {
        errors.push(FieldError::new("email", "Please include a valid email"));
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let email = req.email.trim().to_lowercase();
    if let Some(existing) = state.db.find_admin_by_email(&email)? {
        if existing.id != admin.id {
            return Err(ApiError::BadRequest("Email already in use"));
        }
    }

    let name = req.name.trim().to_string();
    state.db.update_admin_profile(&admin.id, &name, &email)?;

    let updated = Admin {
        name,
        email,
        ..admin
    };
    Ok(Json(updated.profile()))
}

/// PUT /api/users/avatar - Replace the caller's avatar image.
async fn update_avatar(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<Json<AvatarResponse>> {
    let admin = require_admin(&state, &headers)?;

    let form = uploads::read_multipart(&mut multipart, "avatar").await?;
    let Some(part) = form.file else {
        return Err(ApiError::BadRequest("No file uploaded"));
    };
    uploads::validate(UploadKind::Avatar, &part)?;

    let stored = uploads::store(&state.config.uploads.path, UploadKind::Avatar, None, &part).await?;
    state
        .db
        .update_admin_avatar(&admin.id, Some(&stored.public_path))?;

    // The old file goes only after the replacement is stored and recorded,
    // so a failed upload never leaves the row pointing at nothing.
    if let Some(old) = &admin.avatar {
        if let Some(path) = uploads::disk_path(&state.config.uploads.path, old) {
            uploads::remove_file(&path).await;
        }
    }
    info!(admin = %admin.email, avatar = %stored.public_path, "Avatar updated");

    Ok(Json(AvatarResponse {
        message: "Avatar updated successfully",
        avatar: stored.public_path,
    }))
}

/// DELETE /api/users/avatar - Remove the caller's avatar.
async fn remove_avatar(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<MessageResponse>> {
    let admin = require_admin(&state, &headers)?;

    if let Some(old) = &admin.avatar {
        if let Some(path) = uploads::disk_path(&state.config.uploads.path, old) {
            uploads::remove_file(&path).await;
        }
    }
    state.db.update_admin_avatar(&admin.id, None)?;

    Ok(Json(MessageResponse {
        message: "Avatar removed successfully",
    }))
}

/// GET /api/users - Every admin account, newest first (super admin only).
async fn list_admins(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<AdminProfile>>> {
    require_super_admin(&state, &headers)?;
    let admins = state.db.list_admins()?;
    Ok(Json(admins.iter().rev().map(Admin::profile).collect()))
}

/// DELETE /api/users/:id - Remove an admin account (super admin only).
async fn remove_admin(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let requester = require_super_admin(&state, &headers)?;
    delete_admin_account(&state, &requester, &id).await?;
    Ok(Json(MessageResponse {
        message: "Admin deleted successfully",
    }))
}

/// Deletion rules shared by both admin-removal endpoints: accounts cannot
/// delete themselves, the last super admin is untouchable, and any avatar
/// file is cleaned up best-effort.
pub(crate) async fn delete_admin_account(
    state: &AppState,
    requester: &Admin,
    id: &str,
) -> Result<(), ApiError> {
    let Some(target) = state.db.find_admin_by_id(id)? else {
        return Err(ApiError::NotFound("Admin not found"));
    };

    if target.id == requester.id {
        return Err(ApiError::BadRequest("Cannot delete your own account"));
    }
    if target.super_admin && state.db.count_super_admins()? <= 1 {
        return Err(ApiError::BadRequest("Cannot delete the last super admin"));
    }

    if let Some(avatar) = &target.avatar {
        if let Some(path) = uploads::disk_path(&state.config.uploads.path, avatar) {
            uploads::remove_file(&path).await;
        }
    }

    state.db.delete_admin(id)?;
    info!(deleted = %target.email, by = %requester.email, "Admin deleted");
    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_admins))
        .route("/me", get(me))
        .route("/profile", put(update_profile))
        .route("/avatar", put(update_avatar).delete(remove_avatar))
        .route("/:id", delete(remove_admin))
        .with_state(state)
}
