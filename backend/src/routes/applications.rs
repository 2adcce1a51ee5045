//! Membership applications: public submission, admin review.

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
use crate::models::{Application, ApplicationStatus};
use crate::realtime::ChannelEvent;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplicationRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    #[serde(default)]
    pub status: String,
}

/// POST /api/applications - Public membership application.
async fn submit_application(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitApplicationRequest>,
) -> ApiResult<(StatusCode, Json<Application>)> {
    let mut errors = Vec::new();
    if req.full_name.trim().is_empty() {
        errors.push(FieldError::new("fullName", "Full name is required"));
    }
    if !super::is_valid_email(&req.email) {
        errors.push(FieldError::new("email", "Please include a valid email"));
    }
    if req.phone.trim().is_empty() {
        errors.push(FieldError::new("phone", "Phone number is required"));
    }
    if req.course.trim().is_empty() {
        errors.push(FieldError::new("course", "Course is required"));
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let application = Application::new(
        req.full_name.trim().to_string(),
        req.email.trim().to_string(),
        req.phone.trim().to_string(),
        req.course.trim().to_string(),
        req.message,
    );
    state.db.insert_application(&application)?;
    info!(email = %application.email, "Application submitted");

    // Confirmation and admin notice are fire-and-forget.
    let mailer = state.mailer.clone();
    let for_mail = application.clone();
    tokio::spawn(async move {
        mailer
            .send_application_confirmation(&for_mail.email, &for_mail.full_name)
            .await;
        mailer.send_admin_application_notification(&for_mail).await;
    });

    state
        .broadcaster
        .broadcast_admin(ChannelEvent::NewApplication(application.clone()));
    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /api/applications - All applications, newest first.
async fn list_applications(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Application>>> {
    require_admin(&state, &headers)?;
    Ok(Json(state.db.list_applications()?))
}

/// PUT /api/applications/:id/status - Approve or reject an application.
async fn review_application(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<ReviewRequest>,
) -> ApiResult<Json<Application>> {
    let admin = require_admin(&state, &headers)?;

    let status = match ApplicationStatus::parse(&req.status) {
        Some(status @ (ApplicationStatus::Approved | ApplicationStatus::Rejected)) => status,
        _ => {
            return Err(ApiError::Validation(vec![FieldError::new(
                "status",
                "Status is required (approved/rejected)",
            )]))
        }
    };

    let Some(mut application) = state.db.find_application(&id)? else {
        return Err(ApiError::NotFound("Application not found"));
    };

    let reviewed_at = Utc::now();
    if !state
        .db
        .update_application_status(&id, status, &admin.name, reviewed_at)?
    {
        return Err(ApiError::NotFound("Application not found"));
    }
    application.status = status;
    application.reviewed_by = Some(admin.name.clone());
    application.reviewed_at = Some(reviewed_at);
    info!(email = %application.email, status = status.as_str(), "Application reviewed");

    // The applicant hears about the decision before the dashboard does.
    state
        .mailer
        .send_application_status_update(&application.email, &application.full_name, status)
        .await;

    state
        .broadcaster
        .broadcast_admin(ChannelEvent::UpdateApplication(application.clone()));
    Ok(Json(application))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_applications).post(submit_application))
        .route("/:id/status", put(review_application))
        .with_state(state)
}
