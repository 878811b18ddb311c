use crate::api::error_detail::internal_error_body;
use crate::database::DbError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Valid retention days required")]
    InvalidRetention,

    #[error("Invalid date filter: {0}")]
    InvalidDate(String),

    #[error("Note not found")]
    NoteNotFound,

    #[error("No notes found for the specified criteria")]
    NoNotesFound,

    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("internal error")]
    Internal(#[from] eyre::Report),
}

fn log_error(error: &AdminError) {
    match error {
        AdminError::Database(e) => warn!("Database query failed: {}", e),
        AdminError::Internal(e) => warn!("Internal error: {:?}", e),
        other => warn!("Admin request rejected: {other}"),
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        log_error(&self);

        let (status, body) = match &self {
            Self::InvalidRetention | Self::InvalidDate(_) => {
                (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() }))
            }
            Self::NoteNotFound | Self::NoNotesFound => {
                (StatusCode::NOT_FOUND, json!({ "error": self.to_string() }))
            }
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

impl From<DbError> for AdminError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Sqlx(sql_err) | DbError::UniqueViolation(sql_err) => Self::Database(sql_err),
            other => Self::Internal(eyre::Report::new(other)),
        }
    }
}
