use common_types::file_status::FileStatus;
use common_types::task_status::TaskStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(sqlx::Error),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(sqlx::Error),

    #[error("JSON serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error(
        "Illegal transition for file {file_id}: file {file_from:?} -> {file_to:?}, task {task_from:?} -> {task_to:?}"
    )]
    IllegalTransition {
        file_id: i32,
        file_from: Option<FileStatus>,
        file_to: Option<FileStatus>,
        task_from: Option<TaskStatus>,
        task_to: Option<TaskStatus>,
    },
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if err
            .as_database_error()
            .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
        {
            Self::UniqueViolation(err)
        } else {
            Self::Sqlx(err)
        }
    }
}

impl DbError {
    #[must_use]
    pub const fn is_illegal_transition(&self) -> bool {
        matches!(self, Self::IllegalTransition { .. })
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
