//! HTTP error mapping.
//!
//! Handlers return [`AppError`]; [`IntoResponse`] turns each kind into a
//! status code and a short, generic body. Internal detail goes to the log only.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::qr::QrError;
use crate::storage::StorageError;

/// Errors a route handler can return.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("QR code error: {0}")]
    Qr(#[from] QrError),
}

/// Result type for route handlers.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Status code and client-facing message for this error.
    pub fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Storage(StorageError::InvalidFilename { .. }) => {
                (StatusCode::BAD_REQUEST, "Invalid filename")
            }
            // Escapes look exactly like missing files to the client
            AppError::Storage(StorageError::NotFound { .. })
            | AppError::Storage(StorageError::PathEscape { .. }) => {
                (StatusCode::NOT_FOUND, "File not found")
            }
            AppError::Storage(StorageError::Io { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Error while accessing file")
            }
            AppError::Multipart(e) => {
                let status = e.status();
                let message = match status {
                    StatusCode::PAYLOAD_TOO_LARGE => "Upload too large",
                    s if s.is_server_error() => "Error while receiving upload",
                    _ => "Malformed upload",
                };
                (status, message)
            }
            AppError::Template(_) | AppError::Qr(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Error while rendering page")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }
        (status, message).into_response()
    }
}
