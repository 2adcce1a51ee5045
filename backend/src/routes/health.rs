use std::sync::Arc;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
struct HealthResponse {
    message: String,
    status: &'static str,
    timestamp: DateTime<Utc>,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        message: format!("{} API is running...", state.config.mail.site_name),
        status: "ok",
        timestamp: Utc::now(),
    })
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .with_state(state)
}
