use crate::services::platform::PlatformError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("User not authenticated")]
    Unauthenticated,
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error(transparent)]
    Upstream(PlatformError),
    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl From<PlatformError> for AppError {
    fn from(error: PlatformError) -> Self {
        match error {
            PlatformError::Unauthorized => Self::Unauthenticated,
            PlatformError::NotConfigured => Self::Configuration(error.to_string()),
            PlatformError::Status { .. } | PlatformError::Network(_) | PlatformError::Malformed(_) => {
                Self::Upstream(error)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthenticated => {
                tracing::debug!("Request without a usable session token");
                (StatusCode::UNAUTHORIZED, "User not authenticated".to_string())
            }
            Self::Validation(msg) => {
                tracing::debug!(message = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, msg)
            }
            Self::Upstream(e) => {
                tracing::error!(error = %e, "Upstream request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            Self::Configuration(msg) => {
                tracing::error!(message = %msg, "Configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
