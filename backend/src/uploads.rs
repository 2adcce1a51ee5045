//! File upload pipeline: MIME allow-lists, size caps, sanitized unique
//! filenames, and best-effort removal.
//!
//! Incoming parts are buffered and validated before anything touches
//! disk, so a rejected upload never leaves a file behind.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use bytes::Bytes;
use uuid::Uuid;

use crate::error::ApiError;

pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];
pub const ALLOWED_DOCUMENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

pub const MAX_IMAGE_SIZE: usize = 8 * 1024 * 1024;
pub const MAX_DOCUMENT_SIZE: usize = 10 * 1024 * 1024;

/// What is being uploaded. Each kind has its own directory, allowed
/// types, and size cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    GalleryImage,
    Document,
    Avatar,
}

impl UploadKind {
    pub fn subdir(&self) -> &'static str {
        match self {
            UploadKind::GalleryImage => "gallery",
            UploadKind::Document => "documents",
            UploadKind::Avatar => "avatars",
        }
    }

    fn allowed_types(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Document => ALLOWED_DOCUMENT_TYPES,
            UploadKind::GalleryImage | UploadKind::Avatar => ALLOWED_IMAGE_TYPES,
        }
    }

    fn max_size(&self) -> usize {
        match self {
            UploadKind::Document => MAX_DOCUMENT_SIZE,
            UploadKind::GalleryImage | UploadKind::Avatar => MAX_IMAGE_SIZE,
        }
    }

    fn invalid_type_message(&self) -> &'static str {
        match self {
            UploadKind::Document => {
                "Invalid file type. Allowed: application/pdf, application/msword, \
                 application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            UploadKind::GalleryImage | UploadKind::Avatar => {
                "Invalid file type. Allowed: image/jpeg, image/png, image/webp"
            }
        }
    }

    fn too_large_message(&self) -> &'static str {
        match self {
            UploadKind::Document => "File size exceeds maximum allowed size of 10MB",
            UploadKind::GalleryImage | UploadKind::Avatar => {
                "File size exceeds maximum allowed size of 8MB"
            }
        }
    }
}

/// A buffered file part, not yet written anywhere.
#[derive(Debug)]
pub struct FilePart {
    pub original_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Text fields plus the (single) file part of a multipart form.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub file: Option<FilePart>,
}

impl UploadForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Drain a multipart request, buffering the field named `file_field` as
/// the upload and everything else as text.
pub async fn read_multipart(
    multipart: &mut Multipart,
    file_field: &str,
) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == file_field {
            let original_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field.bytes().await?;
            form.file = Some(FilePart {
                original_name,
                content_type,
                data,
            });
        } else {
            form.fields.insert(name, field.text().await?);
        }
    }
    Ok(form)
}

/// Check MIME type and size against the kind's rules.
pub fn validate(kind: UploadKind, part: &FilePart) -> Result<(), ApiError> {
    if !kind.allowed_types().contains(&part.content_type.as_str()) {
        return Err(ApiError::BadRequest(kind.invalid_type_message()));
    }
    if part.data.len() > kind.max_size() {
        return Err(ApiError::BadRequest(kind.too_large_message()));
    }
    Ok(())
}

/// A file that made it to disk.
#[derive(Debug)]
pub struct StoredFile {
    pub filename: String,
    pub disk_path: PathBuf,
    /// Path the frontend uses, under `/uploads/`.
    pub public_path: String,
    pub size: u64,
}

/// Write a validated part under the uploads root. Gallery images pass
/// their category so files land in a per-category subdirectory.
pub async fn store(
    uploads_root: &str,
    kind: UploadKind,
    category: Option<&str>,
    part: &FilePart,
) -> Result<StoredFile, ApiError> {
    let rel_dir = match category {
        Some(c) => format!("{}/{}", kind.subdir(), c),
        None => kind.subdir().to_string(),
    };
    let dir = Path::new(uploads_root).join(&rel_dir);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let filename = unique_filename(&part.original_name);
    let disk_path = dir.join(&filename);
    tokio::fs::write(&disk_path, &part.data)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    tracing::info!("Stored upload {} ({} bytes)", disk_path.display(), part.data.len());

    Ok(StoredFile {
        public_path: format!("/uploads/{}/{}", rel_dir, filename),
        filename,
        disk_path,
        size: part.data.len() as u64,
    })
}

/// Remove a file, logging instead of failing. Resource deletion and
/// cleanup paths never turn a missing file into an error response.
pub async fn remove_file(path: &Path) -> bool {
    match tokio::fs::remove_file(path).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Failed to delete file {}: {}", path.display(), e);
            false
        }
    }
}

/// Resolve a stored `/uploads/...` public path back to its disk location.
/// Returns None for anything outside the uploads root.
pub fn disk_path(uploads_root: &str, public_path: &str) -> Option<PathBuf> {
    let rel = public_path.strip_prefix("/uploads/")?;
    if rel.is_empty() || rel.split('/').any(|c| c.is_empty() || c == "." || c == "..") {
        return None;
    }
    Some(Path::new(uploads_root).join(rel))
}

/// Strip path separators and characters invalid in filenames. Degenerate
/// results are replaced with a fresh UUID.
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '<' | '>' | ':' | '"' | '|' | '?' | '*'))
        .collect();
    let sanitized = sanitized.trim().to_string();
    if sanitized.len() < 3 {
        Uuid::new_v4().to_string()
    } else {
        sanitized
    }
}

/// `{sanitized-stem}-{8 uuid chars}{.ext}` keeps names readable while
/// avoiding collisions.
pub fn unique_filename(original: &str) -> String {
    let path = Path::new(original);
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let sanitized = sanitize_filename(&stem);
    let unique = Uuid::new_v4().simple().to_string();
    format!("{}-{}{}", sanitized, &unique[..8], ext)
}
