//! Club events and public attendee registration.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use crate::auth::require_admin;
use crate::error::{ApiError, ApiResult, FieldError};
use crate::models::{Attendee, Event};
use crate::realtime::ChannelEvent;
use crate::routes::MessageResponse;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// PATCH-style body: absent fields stay untouched, explicit nulls clear
/// the nullable ones.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub category: Option<String>,
    pub start: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub end: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub description: Option<Option<String>>,
    pub featured: Option<bool>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub image_url: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAttendeeRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub admission_number: String,
}

fn parse_start(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ApiError::BadRequest("Invalid start date format"))
}

fn parse_end(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ApiError::BadRequest("Invalid end date format"))
}

/// GET /api/events - All events, soonest first.
async fn list_events(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Event>>> {
    Ok(Json(state.db.list_events()?))
}

/// POST /api/events - Create an event.
async fn create_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateEventRequest>,
) -> ApiResult<(StatusCode, Json<Event>)> {
    require_admin(&state, &headers)?;

    let mut errors = Vec::new();
    if req.title.trim().is_empty() {
        errors.push(FieldError::new("title", "Title is required"));
    }
    if req.category.trim().is_empty() {
        errors.push(FieldError::new("category", "Category is required"));
    }
    if req.start.trim().is_empty() {
        errors.push(FieldError::new("start", "Start date is required"));
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let start = parse_start(&req.start)?;
    let end = req.end.as_deref().map(parse_end).transpose()?;

    let event = Event {
        id: uuid::Uuid::new_v4().to_string(),
        title: req.title.trim().to_string(),
        category: req.category.trim().to_string(),
        start,
        end,
        location: req.location,
        description: req.description,
        featured: req.featured,
        image_url: req.image_url,
        attendees: Vec::new(),
        created_at: Utc::now(),
    };
    state.db.insert_event(&event)?;
    info!(title = %event.title, "Event created");

    state.broadcaster.broadcast(ChannelEvent::NewEvent(event.clone()));
    Ok((StatusCode::CREATED, Json(event)))
}

/// PUT /api/events/:id - Update an event in place.
async fn update_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<UpdateEventRequest>,
) -> ApiResult<Json<Event>> {
    require_admin(&state, &headers)?;

    let Some(mut event) = state.db.find_event(&id)? else {
        return Err(ApiError::NotFound("Event not found"));
    };

    // Provided fields obey the same rules as on create.
    let mut errors = Vec::new();
    if matches!(&req.title, Some(title) if title.trim().is_empty()) {
        errors.push(FieldError::new("title", "Title is required"));
    }
    if matches!(&req.category, Some(category) if category.trim().is_empty()) {
        errors.push(FieldError::new("category", "Category is required"));
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    if let Some(title) = req.title {
        event.title = title.trim().to_string();
    }
    if let Some(category) = req.category {
        event.category = category.trim().to_string();
    }
    if let Some(start) = req.start.as_deref() {
        event.start = parse_start(start)?;
    }
    if let Some(end) = req.end {
        event.end = end.as_deref().map(parse_end).transpose()?;
    }
    if let Some(location) = req.location {
        event.location = location;
    }
    if let Some(description) = req.description {
        event.description = description;
    }
    if let Some(featured) = req.featured {
        event.featured = featured;
    }
    if let Some(image_url) = req.image_url {
        event.image_url = image_url;
    }

    if !state.db.update_event(&event)? {
        return Err(ApiError::NotFound("Event not found"));
    }

    state
        .broadcaster
        .broadcast(ChannelEvent::UpdateEvent(event.clone()));
    Ok(Json(event))
}

/// DELETE /api/events/:id - Remove an event.
async fn delete_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    require_admin(&state, &headers)?;

    if !state.db.delete_event(&id)? {
        return Err(ApiError::NotFound("Event not found"));
    }
    info!(%id, "Event deleted");

    state
        .broadcaster
        .broadcast(ChannelEvent::DeleteEvent { id });
    Ok(Json(MessageResponse {
        message: "Event removed",
    }))
}

/// POST /api/events/:id/register - Public attendee sign-up.
async fn register_attendee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<RegisterAttendeeRequest>,
) -> ApiResult<Json<Event>> {
    let mut errors = Vec::new();
    if req.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }
    if req.admission_number.trim().is_empty() {
        errors.push(FieldError::new(
            "admissionNumber",
            "Admission Number is required",
        ));
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let Some(mut event) = state.db.find_event(&id)? else {
        return Err(ApiError::NotFound("Event not found"));
    };

    let admission_number = req.admission_number.trim().to_string();
    if event.has_attendee(&admission_number) {
        return Err(ApiError::BadRequest(
            "Student with this admission number is already registered",
        ));
    }

    event.attendees.push(Attendee {
        name: req.name.trim().to_string(),
        admission_number,
        registered_at: Utc::now(),
    });
    if !state.db.update_event(&event)? {
        return Err(ApiError::NotFound("Event not found"));
    }
    info!(event = %event.title, "Attendee registered");

    state
        .broadcaster
        .broadcast(ChannelEvent::UpdateEvent(event.clone()));
    Ok(Json(event))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/:id", put(update_event).delete(delete_event))
        .route("/:id/register", post(register_attendee))
        .with_state(state)
}
