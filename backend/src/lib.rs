pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod mail;
pub mod models;
pub mod realtime;
pub mod routes;
pub mod test_util;
pub mod uploads;

pub use config::Config;
pub use db::Database;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, StatusCode};
use axum::routing::get;
use axum::{middleware, Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::auth::TokenKeys;
use crate::mail::Mailer;
use crate::realtime::Broadcaster;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<Database>,
    pub token_keys: TokenKeys,
    pub broadcaster: Broadcaster,
    pub mailer: Arc<Mailer>,
}

/// Largest accepted request body. Sits above the 10MB document cap so
/// oversize uploads fail with the upload pipeline's message.
const BODY_LIMIT: usize = 11 * 1024 * 1024;

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Route not found" })),
    )
}

fn cors_layer(origins: &str) -> CorsLayer {
    if origins.trim() == "*" {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = origins
            .split(',')
            .filter_map(|origin| origin.trim().parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Assemble the full application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .merge(routes::health::router(state.clone()))
        .nest("/api/auth", routes::auth::router(state.clone()))
        .nest("/api/users", routes::users::router(state.clone()))
        .nest("/api/events", routes::events::router(state.clone()))
        .nest(
            "/api/applications",
            routes::applications::router(state.clone()),
        )
        .nest("/api/contact", routes::contacts::router(state.clone()))
        .nest("/api/documents", routes::documents::router(state.clone()))
        .nest("/api/gallery", routes::gallery::router(state.clone()))
        .nest("/api/admin/content", routes::content::router(state.clone()))
        .nest(
            "/api/notifications",
            routes::notifications::router(state.clone()),
        )
        .merge(
            Router::new()
                .route("/ws", get(realtime::ws_handler))
                .with_state(state.clone()),
        )
        .nest_service("/uploads", ServeDir::new(&state.config.uploads.path))
        .fallback(not_found)
        .layer(cors)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(middleware::from_fn(logging::request_logger))
}
