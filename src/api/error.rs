use crate::services::storage::{StorageError, StorageErrorKind};
use crate::services::upload_service::{StagingError, UploadError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error("Staging error: {0}")]
    Staging(#[from] StagingError),

    #[error("Upload error: {0}")]
    Upload(#[from] StorageError),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

/// Body returned with every error response
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::InvalidRequest(msg) => AppError::BadRequest(msg),
            UploadError::Staging(e) => AppError::Staging(e),
            UploadError::Storage(e) => AppError::Upload(e),
        }
    }
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "bad_request",
            AppError::PayloadTooLarge(_) => "payload_too_large",
            AppError::Staging(_) => "staging_failed",
            AppError::Upload(e) => match e.kind {
                StorageErrorKind::Payload => "staging_failed",
                StorageErrorKind::Auth => "storage_auth_failed",
                StorageErrorKind::NotFound => "storage_not_found",
                StorageErrorKind::Network => "storage_unreachable",
                StorageErrorKind::Rejected => "storage_rejected",
            },
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Staging(_) | AppError::Upload(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = match &self {
            AppError::BadRequest(msg) | AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::Staging(e) => {
                tracing::error!("Staging error: {}", e);
                "The upload could not be staged".to_string()
            }
            AppError::Upload(e) if e.kind == StorageErrorKind::Payload => {
                tracing::error!("Upload error: {}", e);
                "The upload could not be staged".to_string()
            }
            AppError::Upload(e) => {
                tracing::error!("Upload error: {}", e);
                format!("The storage backend failed: {}", e.kind)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal Server Error".to_string()
            }
        };

        let body = Json(ErrorResponse {
            code: code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_request_errors_are_client_errors() {
        let err: AppError = UploadError::InvalidRequest("missing file".to_string()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "bad_request");
    }

    #[test]
    fn test_storage_category_is_preserved() {
        let cases = [
            (StorageErrorKind::Auth, "storage_auth_failed"),
            (StorageErrorKind::NotFound, "storage_not_found"),
            (StorageErrorKind::Network, "storage_unreachable"),
            (StorageErrorKind::Rejected, "storage_rejected"),
            (StorageErrorKind::Payload, "staging_failed"),
        ];
        for (kind, code) in cases {
            let err: AppError = UploadError::Storage(StorageError::new(kind, "boom")).into();
            assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn test_staging_error_maps_to_500() {
        let err: AppError = UploadError::Staging(StagingError::Write {
            dir: PathBuf::from("/nonexistent"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such directory"),
        })
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
