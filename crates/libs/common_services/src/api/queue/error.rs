use crate::api::error_detail::internal_error_body;
use crate::database::DbError;
use crate::job_queue::JobQueueError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Invalid queue name")]
    InvalidQueue(String),

    #[error("Invalid job state")]
    InvalidState(String),

    #[error("Job not found")]
    JobNotFound,

    #[error("Job is not in failed state")]
    NotFailed,

    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("internal error")]
    Internal(#[from] eyre::Report),
}

fn log_error(error: &QueueError) {
    match error {
        QueueError::InvalidQueue(name) => warn!("Unknown queue requested: {name}"),
        QueueError::InvalidState(state) => warn!("Unknown job state requested: {state}"),
        QueueError::Database(e) => warn!("Database query failed: {}", e),
        QueueError::Internal(e) => warn!("Internal error: {:?}", e),
        other => warn!("Queue request rejected: {other}"),
    }
}

impl IntoResponse for QueueError {
    fn into_response(self) -> Response {
        log_error(&self);

        let (status, body) = match &self {
            Self::InvalidQueue(_) | Self::InvalidState(_) | Self::NotFailed => {
                (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() }))
            }
            Self::JobNotFound => (StatusCode::NOT_FOUND, json!({ "error": self.to_string() })),
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

impl From<DbError> for QueueError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Sqlx(sql_err) | DbError::UniqueViolation(sql_err) => Self::Database(sql_err),
            other => Self::Internal(eyre::Report::new(other)),
        }
    }
}

impl From<JobQueueError> for QueueError {
    fn from(err: JobQueueError) -> Self {
        match err {
            JobQueueError::JobNotFound(_) => Self::JobNotFound,
            JobQueueError::NotFailed(_) => Self::NotFailed,
            JobQueueError::Database(db_err) => db_err.into(),
        }
    }
}
