//! Contact form messages and admin responses.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::auth::require_admin;
use crate::error::{ApiError, ApiResult, FieldError};
use crate::models::ContactMessage;
use crate::realtime::ChannelEvent;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    #[serde(default)]
    pub message: String,
}

/// POST /api/contact - Public contact form submission.
async fn submit_contact(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitContactRequest>,
) -> ApiResult<(StatusCode, Json<ContactMessage>)> {
    let mut errors = Vec::new();
    if req.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }
    if !super::is_valid_email(&req.email) {
        errors.push(FieldError::new("email", "Please include a valid email"));
    }
    if req.subject.trim().is_empty() {
        errors.push(FieldError::new("subject", "Subject is required"));
    }
    if req.message.trim().is_empty() {
        errors.push(FieldError::new("message", "Message is required"));
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let contact = ContactMessage::new(
        req.name.trim().to_string(),
        req.email.trim().to_string(),
        req.subject.trim().to_string(),
        req.message.trim().to_string(),
    );
    state.db.insert_contact(&contact)?;
    info!(email = %contact.email, subject = %contact.subject, "Contact message received");

    let mailer = state.mailer.clone();
    let for_mail = contact.clone();
    tokio::spawn(async move {
        mailer
            .send_contact_confirmation(&for_mail.email, &for_mail.name)
            .await;
        mailer.send_admin_contact_notification(&for_mail).await;
    });

    state
        .broadcaster
        .broadcast_admin(ChannelEvent::NewContactMessage(contact.clone()));
    Ok((StatusCode::CREATED, Json(contact)))
}

/// GET /api/contact - All contact messages, newest first.
async fn list_contacts(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<ContactMessage>>> {
    require_admin(&state, &headers)?;
    Ok(Json(state.db.list_contacts()?))
}

/// PUT /api/contact/:id/respond - Reply to a message and mark it handled.
async fn respond_to_contact(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<RespondRequest>,
) -> ApiResult<Json<ContactMessage>> {
    let admin = require_admin(&state, &headers)?;

    let response_message = req.message.trim().to_string();
    if response_message.is_empty() {
        return Err(ApiError::BadRequest("Response message is required"));
    }

    let Some(mut contact) = state.db.find_contact(&id)? else {
        return Err(ApiError::NotFound("Message not found"));
    };

    // The reply email goes out before the record flips to responded.
    state
        .mailer
        .send_contact_response(&contact, &admin.name, &response_message)
        .await;

    let responded_at = Utc::now();
    if !state
        .db
        .respond_to_contact(&id, &admin.name, &response_message, responded_at)?
    {
        return Err(ApiError::NotFound("Message not found"));
    }
    contact.responded = true;
    contact.responded_by = Some(admin.name.clone());
    contact.response_message = Some(response_message);
    contact.responded_at = Some(responded_at);
    info!(email = %contact.email, "Contact message answered");

    state
        .broadcaster
        .broadcast_admin(ChannelEvent::UpdateContactMessage(contact.clone()));
    Ok(Json(contact))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_contacts).post(submit_contact))
        .route("/:id/respond", put(respond_to_contact))
        .with_state(state)
}
