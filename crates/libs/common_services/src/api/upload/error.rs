use crate::api::error_detail::internal_error_body;
use crate::database::DbError;
use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file uploaded")]
    NoFile,

    #[error("Unexpected file field: {0}")]
    UnexpectedField(String),

    #[error("Too many files")]
    TooManyFiles,

    #[error("Invalid file type. Allowed types: {allowed}")]
    InvalidFileType { allowed: String },

    #[error("File too large. Maximum size is {max_mb}MB")]
    FileTooLarge { max_mb: u64 },

    #[error("Malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("File not found")]
    FileNotFound,

    /// Anything failing after the file has been staged.
    #[error("File upload failed: {0:?}")]
    UploadFailed(eyre::Report),

    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("internal error")]
    Internal(#[from] eyre::Report),
}

fn log_error(error: &UploadError) {
    match error {
        UploadError::UploadFailed(e) => error!("Upload failed after staging: {e:?}"),
        UploadError::Database(e) => error!("Database query failed: {e}"),
        UploadError::Internal(e) => error!("Internal error: {e:?}"),
        other => warn!("Upload rejected: {other}"),
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        log_error(&self);

        let (status, body) = match &self {
            Self::NoFile => (StatusCode::BAD_REQUEST, json!({ "error": "No file uploaded" })),
            Self::UnexpectedField(_) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Unexpected file field",
                    "message": "File field name must be \"file\"",
                }),
            ),
            Self::TooManyFiles => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Too many files",
                    "message": "Only one file can be uploaded at a time",
                }),
            ),
            Self::InvalidFileType { .. } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid file type", "message": self.to_string() }),
            ),
            Self::FileTooLarge { .. } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                json!({ "error": "File too large", "message": self.to_string() }),
            ),
            Self::Multipart(e) => (e.status(), json!({ "error": e.body_text() })),
            Self::FileNotFound => (StatusCode::NOT_FOUND, json!({ "error": "File not found" })),
            Self::UploadFailed(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                internal_error_body("File upload failed", e),
            ),
            Self::Database(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                internal_error_body("Internal server error", e),
            ),
            Self::Internal(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                internal_error_body("Internal server error", e),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<DbError> for UploadError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Sqlx(sql_err) | DbError::UniqueViolation(sql_err) => Self::Database(sql_err),
            other => Self::Internal(eyre::Report::new(other)),
        }
    }
}
