/// Unified error types for the catalog backend
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Main error type for catalog operations
///
/// "Entity absent" and "bad reference" are distinct variants from internal
/// failures, so callers never have to guess which one a failure was.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// A submitted foreign-id list contains ids that do not resolve
    /// to enabled entities
    #[error("{0}")]
    InvalidReference(String),

    /// Request payload failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Blob store write failed during an upload
    #[error("Upload failed: {0}")]
    Upload(String),

    /// Blob storage errors outside the upload path
    #[error("Blob storage error: {0}")]
    BlobStorage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON envelope returned for every failure
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub message: String,
    pub data: Option<Value>,
}

/// Convert ApiError to an HTTP response
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::InvalidReference(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            // Internal failures are logged at the failure site; the
            // response body never carries their detail.
            ApiError::Database(_)
            | ApiError::Upload(_)
            | ApiError::BlobStorage(_)
            | ApiError::Io(_)
            | ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong".to_string(),
            ),
        };

        let body = Json(ErrorEnvelope {
            success: false,
            message,
            data: None,
        });

        (status, body).into_response()
    }
}

/// Result type alias for catalog operations
pub type ApiResult<T> = Result<T, ApiError>;
