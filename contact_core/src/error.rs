//! Application error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::mail::TransportError;
use crate::models::ErrorBody;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("All fields are required")]
    MissingFields,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Email service not configured")]
    NotConfigured,

    #[error("Delivery error: {0}")]
    Delivery(#[from] TransportError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Text appended to "Failed to send email: " for a failure description.
fn failure_detail(description: String) -> String {
    if description.trim().is_empty() {
        "Unknown error".to_string()
    } else {
        description
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::MissingFields => {
                tracing::warn!("Validation failed: missing fields");
                (StatusCode::BAD_REQUEST, "All fields are required".to_string())
            }
            AppError::InvalidBody(detail) => {
                tracing::warn!(detail = %detail, "Rejected malformed request body");
                (StatusCode::BAD_REQUEST, "Invalid request body".to_string())
            }
            AppError::NotConfigured => {
                tracing::error!("SMTP credentials not configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Email service not configured".to_string(),
                )
            }
            AppError::Delivery(err) => {
                tracing::error!(error = ?err, "Mail transport failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to send email: {}", failure_detail(err.to_string())),
                )
            }
            AppError::IoError(err) => {
                tracing::error!("IO error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to send email: {}", failure_detail(err.to_string())),
                )
            }
            AppError::Other(err) => {
                tracing::error!("Unexpected error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to send email: {}", failure_detail(err.to_string())),
                )
            }
        };

        (status, Json(ErrorBody { error: error_message })).into_response()
    }
}
