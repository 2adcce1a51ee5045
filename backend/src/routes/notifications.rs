//! Site notifications: public banner feed, admin management.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::require_admin;
use crate::error::{ApiError, ApiResult, FieldError};
use crate::models::{Notification, NotificationKind, NotificationPriority};
use crate::realtime::{ChannelEvent, NotificationBroadcast};
use crate::routes::MessageResponse;
use crate::AppState;

/// Most recent actives shown on the public site.
const PUBLIC_FEED_LIMIT: u32 = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub priority: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNotificationRequest {
    pub title: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub priority: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

/// Trimmed shape for the public feed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicNotification {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub priority: NotificationPriority,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub priority: NotificationPriority,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

fn parse_kind(raw: Option<&str>, errors: &mut Vec<FieldError>) -> Option<NotificationKind> {
    match raw {
        None => None,
        Some(raw) => {
            let parsed = NotificationKind::parse(raw);
            if parsed.is_none() {
                errors.push(FieldError::new("type", "Invalid notification type"));
            }
            parsed
        }
    }
}

fn parse_priority(
    raw: Option<&str>,
    errors: &mut Vec<FieldError>,
) -> Option<NotificationPriority> {
    match raw {
        None => None,
        Some(raw) => {
            let parsed = NotificationPriority::parse(raw);
            if parsed.is_none() {
                errors.push(FieldError::new("priority", "Invalid priority"));
            }
            parsed
        }
    }
}

/// GET /api/notifications - Active, unexpired banners for the public site.
async fn active_notifications(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<PublicNotification>>> {
    let notifications = state
        .db
        .active_notifications(Utc::now(), PUBLIC_FEED_LIMIT)?;
    let feed = notifications
        .into_iter()
        .map(|n| PublicNotification {
            id: n.id,
            title: n.title,
            message: n.message,
            kind: n.kind,
            priority: n.priority,
            created_at: n.created_at,
        })
        .collect();
    Ok(Json(feed))
}

/// GET /api/notifications/all - Every notification, newest first.
async fn all_notifications(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Notification>>> {
    require_admin(&state, &headers)?;
    Ok(Json(state.db.list_notifications()?))
}

/// POST /api/notifications - Publish a notification.
async fn create_notification(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateNotificationRequest>,
) -> ApiResult<(StatusCode, Json<NotificationResponse>)> {
    let admin = require_admin(&state, &headers)?;

    let mut errors = Vec::new();
    if req.title.trim().is_empty() {
        errors.push(FieldError::new("title", "Title is required"));
    }
    if req.message.trim().is_empty() {
        errors.push(FieldError::new("message", "Message is required"));
    }
    let kind = parse_kind(req.kind.as_deref(), &mut errors);
    let priority = parse_priority(req.priority.as_deref(), &mut errors);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let now = Utc::now();
    let notification = Notification {
        id: uuid::Uuid::new_v4().to_string(),
        title: req.title.trim().to_string(),
        message: req.message,
        kind: kind.unwrap_or(NotificationKind::Info),
        priority: priority.unwrap_or(NotificationPriority::Medium),
        is_active: true,
        expires_at: req.expires_at,
        created_by: admin.name.clone(),
        created_by_id: admin.id.clone(),
        created_at: now,
        updated_at: now,
    };
    state.db.insert_notification(&notification)?;
    info!(title = %notification.title, by = %admin.email, "Notification published");

    state
        .broadcaster
        .broadcast(ChannelEvent::NewNotification(NotificationBroadcast::created(
            &notification,
        )));

    Ok((
        StatusCode::CREATED,
        Json(NotificationResponse {
            id: notification.id,
            title: notification.title,
            message: notification.message,
            kind: notification.kind,
            priority: notification.priority,
            is_active: notification.is_active,
            created_by: notification.created_by,
            created_at: notification.created_at,
            updated_at: None,
            expires_at: notification.expires_at,
        }),
    ))
}

/// PUT /api/notifications/:id - Edit a notification in place.
async fn update_notification(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<UpdateNotificationRequest>,
) -> ApiResult<Json<NotificationResponse>> {
    require_admin(&state, &headers)?;

    let mut errors = Vec::new();
    if req.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        errors.push(FieldError::new("title", "Title is required"));
    }
    if req.message.as_deref().is_some_and(|m| m.trim().is_empty()) {
        errors.push(FieldError::new("message", "Message is required"));
    }
    let kind = parse_kind(req.kind.as_deref(), &mut errors);
    let priority = parse_priority(req.priority.as_deref(), &mut errors);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let Some(mut notification) = state.db.find_notification(&id)? else {
        return Err(ApiError::NotFound("Notification not found"));
    };

    if let Some(title) = req.title {
        notification.title = title.trim().to_string();
    }
    if let Some(message) = req.message {
        notification.message = message;
    }
    if let Some(kind) = kind {
        notification.kind = kind;
    }
    if let Some(priority) = priority {
        notification.priority = priority;
    }
    if let Some(is_active) = req.is_active {
        notification.is_active = is_active;
    }
    if let Some(expires_at) = req.expires_at {
        notification.expires_at = expires_at;
    }
    notification.updated_at = Utc::now();

    if !state.db.update_notification(&notification)? {
        return Err(ApiError::NotFound("Notification not found"));
    }
    info!(title = %notification.title, "Notification updated");

    state
        .broadcaster
        .broadcast(ChannelEvent::UpdateNotification(
            NotificationBroadcast::updated(&notification),
        ));

    Ok(Json(NotificationResponse {
        id: notification.id,
        title: notification.title,
        message: notification.message,
        kind: notification.kind,
        priority: notification.priority,
        is_active: notification.is_active,
        created_by: notification.created_by,
        created_at: notification.created_at,
        updated_at: Some(notification.updated_at),
        expires_at: notification.expires_at,
    }))
}

/// DELETE /api/notifications/:id - Retract a notification.
async fn delete_notification(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    require_admin(&state, &headers)?;

    if !state.db.delete_notification(&id)? {
        return Err(ApiError::NotFound("Notification not found"));
    }
    info!(%id, "Notification deleted");

    state
        .broadcaster
        .broadcast(ChannelEvent::DeleteNotification { id });
    Ok(Json(MessageResponse {
        message: "Notification deleted successfully",
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/",
            get(active_notifications).post(create_notification),
        )
        .route("/all", get(all_notifications))
        .route(
            "/:id",
            axum::routing::put(update_notification).delete(delete_notification),
        )
        .with_state(state)
}
