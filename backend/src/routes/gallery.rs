//! Gallery images: public browsing, admin uploads with a daily ceiling.

use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::auth::require_admin;
use crate::error::{ApiError, ApiResult, FieldError};
use crate::models::{GalleryCategory, GalleryImage};
use crate::realtime::{ChannelEvent, GalleryImageBroadcast};
use crate::routes::MessageResponse;
use crate::uploads::{self, UploadKind};
use crate::AppState;

/// Uploads allowed per admin per calendar day.
const MAX_UPLOADS_PER_DAY: u32 = 5;

const DEFAULT_PAGE_SIZE: u32 = 24;
const LATEST_LIMIT: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct GalleryQuery {
    pub category: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: GalleryCategory,
    pub image_url: String,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<GalleryImage> for GalleryItem {
    fn from(image: GalleryImage) -> Self {
        Self {
            image_url: image.image_url(),
            id: image.id,
            title: image.title,
            description: image.description,
            category: image.category,
            uploaded_by: image.uploaded_by,
            created_at: image.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u32,
    pub pages: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct GalleryPage {
    pub images: Vec<GalleryItem>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct UploadLimitStatus {
    pub count: u32,
    pub remaining: u32,
    pub limit: u32,
}

/// How many uploads this admin has left today.
fn daily_upload_status(state: &AppState, admin_id: &str) -> Result<UploadLimitStatus, ApiError> {
    let count = state
        .db
        .count_gallery_uploads_since(admin_id, start_of_today())?;
    Ok(UploadLimitStatus {
        count,
        remaining: MAX_UPLOADS_PER_DAY.saturating_sub(count),
        limit: MAX_UPLOADS_PER_DAY,
    })
}

fn start_of_today() -> DateTime<Utc> {
    let now = Utc::now();
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| Utc.from_utc_datetime(&midnight))
        .unwrap_or(now)
}

/// POST /api/gallery/upload - Store a gallery image.
async fn upload_image(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<Response> {
    let admin = require_admin(&state, &headers)?;

    let mut form = uploads::read_multipart(&mut multipart, "image").await?;

    let title = form
        .text("title")
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    let category = form.text("category").and_then(GalleryCategory::parse);
    let mut errors = Vec::new();
    if title.is_empty() {
        errors.push(FieldError::new("title", "Title is required"));
    }
    if category.is_none() {
        errors.push(FieldError::new("category", "Category is required"));
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    let Some(category) = category else {
        return Err(ApiError::BadRequest("Category is required"));
    };

    let Some(part) = form.file.take() else {
        return Err(ApiError::BadRequest("No image file uploaded"));
    };
    uploads::validate(UploadKind::GalleryImage, &part)?;

    let status = daily_upload_status(&state, &admin.id)?;
    if status.count >= status.limit {
        let body = json!({
            "message": format!(
                "Daily upload limit reached. Maximum {MAX_UPLOADS_PER_DAY} uploads per day."
            ),
            "limit": status.limit,
            "count": status.count,
            "remaining": 0,
        });
        return Ok((StatusCode::FORBIDDEN, Json(body)).into_response());
    }

    let stored = uploads::store(
        &state.config.uploads.path,
        UploadKind::GalleryImage,
        Some(category.as_str()),
        &part,
    )
    .await?;

    let image = GalleryImage {
        id: uuid::Uuid::new_v4().to_string(),
        title,
        description: form
            .text("description")
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        category,
        filename: stored.filename.clone(),
        file_path: stored.public_path.clone(),
        file_size: stored.size,
        uploaded_by: admin.name.clone(),
        uploaded_by_id: admin.id.clone(),
        created_at: Utc::now(),
    };
    if let Err(err) = state.db.insert_gallery_image(&image) {
        uploads::remove_file(&stored.disk_path).await;
        return Err(err.into());
    }
    info!(title = %image.title, category = %image.category, by = %admin.email, "Gallery image uploaded");

    state
        .broadcaster
        .broadcast(ChannelEvent::NewGalleryImage(GalleryImageBroadcast::from(
            &image,
        )));

    // Report the allowance as it stands after this upload.
    let upload_limit = daily_upload_status(&state, &admin.id)?;
    let mut body = serde_json::to_value(GalleryItem::from(image))
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    body["uploadLimit"] = json!(upload_limit);

    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// GET /api/gallery - One page of images, filterable by category.
async fn list_images(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GalleryQuery>,
) -> ApiResult<Json<GalleryPage>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
    let offset = page.saturating_sub(1).saturating_mul(limit);

    // An unknown category matches nothing rather than everything.
    let category = match query.category.as_deref() {
        Some(raw) => match GalleryCategory::parse(raw) {
            Some(category) => Some(category),
            None => {
                return Ok(Json(GalleryPage {
                    images: Vec::new(),
                    pagination: Pagination {
                        page,
                        limit,
                        total: 0,
                        pages: 0,
                    },
                }))
            }
        },
        None => None,
    };

    let images = state.db.list_gallery_images(category, limit, offset)?;
    let total = state.db.count_gallery_images(category)?;

    Ok(Json(GalleryPage {
        images: images.into_iter().map(GalleryItem::from).collect(),
        pagination: Pagination {
            page,
            limit,
            total,
            pages: total.div_ceil(limit),
        },
    }))
}

/// GET /api/gallery/latest - Most recent images for live feeds.
async fn latest_images(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<GalleryItem>>> {
    let images = state.db.latest_gallery_images(LATEST_LIMIT)?;
    Ok(Json(images.into_iter().map(GalleryItem::from).collect()))
}

/// GET /api/gallery/upload-limit - Today's remaining allowance.
async fn upload_limit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<UploadLimitStatus>> {
    let admin = require_admin(&state, &headers)?;
    Ok(Json(daily_upload_status(&state, &admin.id)?))
}

/// DELETE /api/gallery/:id - Remove an image (uploader or super admin).
async fn delete_image(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let admin = require_admin(&state, &headers)?;

    let Some(image) = state.db.find_gallery_image(&id)? else {
        return Err(ApiError::NotFound("Image not found"));
    };
    if image.uploaded_by_id != admin.id && !admin.super_admin {
        return Err(ApiError::Forbidden("Not authorized to delete this image"));
    }

    if let Some(path) = uploads::disk_path(&state.config.uploads.path, &image.file_path) {
        uploads::remove_file(&path).await;
    }
    state.db.delete_gallery_image(&id)?;
    info!(title = %image.title, by = %admin.email, "Gallery image deleted");

    state
        .broadcaster
        .broadcast(ChannelEvent::DeleteGalleryImage { id });
    Ok(Json(MessageResponse {
        message: "Image deleted successfully",
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_images))
        .route("/latest", get(latest_images))
        .route("/upload", post(upload_image))
        .route("/upload-limit", get(upload_limit))
        .route("/:id", axum::routing::delete(delete_image))
        .with_state(state)
}
