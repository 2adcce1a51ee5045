//! Shared document uploads: admin-managed files, public download list.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::auth::require_admin;
use crate::error::{ApiError, ApiResult};
use crate::models::Document;
use crate::routes::MessageResponse;
use crate::uploads::{self, UploadKind};
use crate::AppState;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUploadResponse {
    pub id: String,
    pub title: String,
    pub filename: String,
    pub file_path: String,
    pub file_size: u64,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentListItem {
    pub id: String,
    pub title: String,
    pub filename: String,
    pub download_url: String,
    pub file_size: u64,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
}

/// POST /api/documents/upload - Store a document file.
async fn upload_document(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<DocumentUploadResponse>)> {
    let admin = require_admin(&state, &headers)?;

    let mut form = uploads::read_multipart(&mut multipart, "document").await?;
    let Some(part) = form.file.take() else {
        return Err(ApiError::BadRequest("No file uploaded"));
    };
    uploads::validate(UploadKind::Document, &part)?;

    let title = form
        .text("title")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(&part.original_name)
        .to_string();

    let stored =
        uploads::store(&state.config.uploads.path, UploadKind::Document, None, &part).await?;

    let document = Document {
        id: uuid::Uuid::new_v4().to_string(),
        title,
        filename: stored.filename.clone(),
        file_path: stored.public_path.clone(),
        file_size: stored.size,
        mime_type: part.content_type.clone(),
        uploaded_by: admin.name.clone(),
        uploaded_by_id: admin.id.clone(),
        created_at: Utc::now(),
    };
    if let Err(err) = state.db.insert_document(&document) {
        // A record that never landed should not leave a file behind.
        uploads::remove_file(&stored.disk_path).await;
        return Err(err.into());
    }
    info!(title = %document.title, by = %admin.email, "Document uploaded");

    Ok((
        StatusCode::CREATED,
        Json(DocumentUploadResponse {
            id: document.id,
            title: document.title,
            filename: document.filename,
            file_path: document.file_path,
            file_size: document.file_size,
            uploaded_by: document.uploaded_by,
            created_at: document.created_at,
        }),
    ))
}

/// GET /api/documents - Public download list, newest first.
async fn list_documents(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<DocumentListItem>>> {
    let documents = state.db.list_documents()?;
    let items = documents
        .into_iter()
        .map(|doc| DocumentListItem {
            download_url: doc.file_path.clone(),
            id: doc.id,
            title: doc.title,
            filename: doc.filename,
            file_size: doc.file_size,
            uploaded_by: doc.uploaded_by,
            created_at: doc.created_at,
        })
        .collect();
    Ok(Json(items))
}

/// DELETE /api/documents/:id - Remove a document (uploader or super admin).
async fn delete_document(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let admin = require_admin(&state, &headers)?;

    let Some(document) = state.db.find_document(&id)? else {
        return Err(ApiError::NotFound("Document not found"));
    };
    if document.uploaded_by_id != admin.id && !admin.super_admin {
        return Err(ApiError::Forbidden("Not authorized to delete this document"));
    }

    if let Some(path) = uploads::disk_path(&state.config.uploads.path, &document.file_path) {
        uploads::remove_file(&path).await;
    }
    state.db.delete_document(&id)?;
    info!(title = %document.title, by = %admin.email, "Document deleted");

    Ok(Json(MessageResponse {
        message: "Document deleted successfully",
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_documents))
        .route("/upload", post(upload_document))
        .route("/:id", axum::routing::delete(delete_document))
        .with_state(state)
}
