use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::modules::media::{DownscaleError, SignatureError};
use crate::shared::types::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Malformed stored content: {0}")]
    MalformedContent(String),
}

impl From<SignatureError> for AppError {
    fn from(err: SignatureError) -> Self {
        AppError::InvalidFormat(format!(
            "{}. Supported media formats are .png and .mkv",
            err
        ))
    }
}

impl From<DownscaleError> for AppError {
    fn from(err: DownscaleError) -> Self {
        match err {
            DownscaleError::ExceedsLimits(_) => AppError::Internal(err.to_string()),
            _ => AppError::MalformedContent(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                    None,
                )
            }
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::Validation(ref msg) => (
                StatusCode::BAD_REQUEST,
                msg.clone(),
                Some(vec![msg.clone()]),
            ),
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            AppError::Auth(ref msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            AppError::Unauthorized(ref msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            AppError::Forbidden(ref msg) => (StatusCode::FORBIDDEN, msg.clone(), None),
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, msg.clone(), None),
            AppError::InvalidFormat(ref msg) => (
                StatusCode::BAD_REQUEST,
                msg.clone(),
                Some(vec![msg.clone()]),
            ),
            AppError::PayloadTooLarge(ref msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, msg.clone(), None)
            }
            AppError::MalformedContent(ref msg) => {
                tracing::error!("Malformed stored content: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Stored media could not be processed".to_string(),
                    None,
                )
            }
        };

        let body = Json(ApiResponse::<()>::error(Some(message), errors));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
