use crate::services::converter::ConvertError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No file part in the request")]
    MissingFilePart,

    #[error("No file selected")]
    EmptyFilename,

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("File conversion error: {0}")]
    ConversionFailed(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl From<ConvertError> for AppError {
    fn from(err: ConvertError) -> Self {
        match err {
            ConvertError::UnsupportedFormat(msg) => AppError::UnsupportedFormat(msg),
            ConvertError::ConversionFailed(msg) => AppError::ConversionFailed(msg),
            ConvertError::Other(msg) => AppError::Internal(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::MissingFilePart => {
                tracing::error!("No file part in the request");
                (
                    StatusCode::BAD_REQUEST,
                    "No file part in the request".to_string(),
                )
            }
            AppError::EmptyFilename => {
                tracing::error!("No file selected");
                (StatusCode::BAD_REQUEST, "No file selected".to_string())
            }
            AppError::BadRequest(msg) => {
                tracing::error!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::PayloadTooLarge(msg) => {
                tracing::error!("Payload too large: {}", msg);
                (StatusCode::PAYLOAD_TOO_LARGE, msg)
            }
            AppError::UnsupportedFormat(msg) => {
                tracing::error!("Unsupported format: {}", msg);
                (
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    format!("Unsupported file format: {}", msg),
                )
            }
            AppError::ConversionFailed(msg) => {
                tracing::error!("Conversion error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("File conversion error: {}", msg),
                )
            }
            AppError::Internal(msg) => {
                // Log the cause, never echo it to the client
                tracing::error!("Unexpected error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "detail": detail
        }));

        (status, body).into_response()
    }
}
