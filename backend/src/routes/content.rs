//! Key-value content blocks the public site renders from.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::require_admin;
use crate::error::{ApiError, ApiResult, FieldError};
use crate::models::ContentBlock;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateContentRequest {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentValue {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentUpdated {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

/// GET /api/admin/content - All blocks as one key-to-value map.
async fn content_map(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<BTreeMap<String, String>>> {
    let blocks = state.db.list_content_blocks()?;
    let map = blocks
        .into_iter()
        .map(|block| (block.key, block.value))
        .collect();
    Ok(Json(map))
}

/// GET /api/admin/content/:key - One block.
async fn get_content(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<Json<ContentValue>> {
    let key = key.to_lowercase();
    let Some(block) = state.db.find_content_block(&key)? else {
        return Err(ApiError::NotFound("Content not found"));
    };
    Ok(Json(ContentValue {
        key: block.key,
        value: block.value,
    }))
}

/// PUT /api/admin/content/:key - Create or replace a block.
async fn put_content(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(key): Path<String>,
    Json(req): Json<UpdateContentRequest>,
) -> ApiResult<Json<ContentUpdated>> {
    let admin = require_admin(&state, &headers)?;

    let value = req.value.trim().to_string();
    if value.is_empty() {
        return Err(ApiError::Validation(vec![FieldError::new(
            "value",
            "Value is required",
        )]));
    }

    let block = ContentBlock {
        key: key.to_lowercase().trim().to_string(),
        value,
        updated_at: Utc::now(),
        updated_by: admin.name.clone(),
        updated_by_id: admin.id.clone(),
    };
    state.db.upsert_content_block(&block)?;
    info!(key = %block.key, by = %admin.email, "Content block updated");

    Ok(Json(ContentUpdated {
        key: block.key,
        value: block.value,
        updated_at: block.updated_at,
        updated_by: block.updated_by,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(content_map))
        .route("/:key", get(get_content).put(put_content))
        .with_state(state)
}
