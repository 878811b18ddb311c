use crate::database::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobQueueError {
    #[error("Job {0} not found")]
    JobNotFound(i64),

    #[error("Job {0} is not in failed state")]
    NotFailed(i64),

    #[error(transparent)]
    Database(#[from] DbError),
}

impl From<sqlx::Error> for JobQueueError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.into())
    }
}
