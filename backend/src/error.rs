//! Error types shared across route handlers.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::auth::token::TokenError;
use crate::db::DbError;

/// A single field-level validation failure.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    pub fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Error type for API handlers. Variants map to the HTTP status and
/// body shape the frontend expects.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("Not authorized, no token")]
    MissingToken,

    #[error("Your session has expired. Please log in again.")]
    TokenExpired,

    #[error("Invalid token. Please log in again.")]
    TokenInvalid,

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("Session expired due to inactivity. Please log in again.")]
    SessionInactive,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Admin registration limit reached")]
    RegistrationLimitReached,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("Server error")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingToken
            | ApiError::TokenExpired
            | ApiError::TokenInvalid
            | ApiError::Unauthorized(_)
            | ApiError::SessionInactive
            | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::RegistrationLimitReached | ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Validation(errors) => json!({ "errors": errors }),
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "request failed");
                // Release builds never leak internals to clients.
                if cfg!(debug_assertions) {
                    json!({ "message": "Server error", "error": detail })
                } else {
                    json!({ "message": "Server error" })
                }
            }
            ApiError::TokenExpired | ApiError::TokenInvalid | ApiError::SessionInactive => {
                json!({ "message": self.to_string(), "expired": true })
            }
            ApiError::RegistrationLimitReached => json!({
                "message": self.to_string(),
                "registrationOpen": false,
                "remainingSlots": 0,
            }),
            _ => json!({ "message": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => ApiError::TokenExpired,
            TokenError::Invalid => ApiError::TokenInvalid,
            TokenError::Creation(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(_: MultipartError) -> Self {
        ApiError::BadRequest("Invalid upload payload")
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(err: ApiError) -> serde_json::Value {
        let response = err.into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            ApiError::Validation(vec![]).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::MissingToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::TokenExpired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Forbidden("Not authorized as admin").status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("Event not found").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal("boom".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn expired_variants_carry_flag() {
        let body = body_json(ApiError::TokenExpired).await;
        assert_eq!(body["expired"], Value::Bool(true));
        assert_eq!(body["message"], "Your session has expired. Please log in again.");

        let body = body_json(ApiError::SessionInactive).await;
        assert_eq!(body["expired"], Value::Bool(true));

        let body = body_json(ApiError::MissingToken).await;
        assert_eq!(body["message"], "Not authorized, no token");
        assert!(body.get("expired").is_none());
    }

    #[tokio::test]
    async fn registration_limit_body_reports_closed() {
        let body = body_json(ApiError::RegistrationLimitReached).await;
        assert_eq!(body["message"], "Admin registration limit reached");
        assert_eq!(body["registrationOpen"], Value::Bool(false));
        assert_eq!(body["remainingSlots"], 0);
    }

    #[tokio::test]
    async fn validation_body_is_field_array() {
        let body = body_json(ApiError::Validation(vec![
            FieldError::new("email", "Valid email is required"),
            FieldError::new("name", "Name is required"),
        ]))
        .await;
        let errors = body["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0]["field"], "email");
        assert_eq!(errors[1]["message"], "Name is required");
    }
}
