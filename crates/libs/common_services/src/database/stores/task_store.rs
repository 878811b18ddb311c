use crate::database::DbError;
use crate::database::tables::task::Task;
use common_types::task_status::TaskType;
use sqlx::{Executor, Postgres};

/// Priority and attempt budget of a freshly created processing task.
pub const DEFAULT_TASK_PRIORITY: i32 = 1;
pub const DEFAULT_TASK_MAX_ATTEMPTS: i32 = 3;

pub struct TaskStore;

impl TaskStore {
    /// Creates the `pending` processing task of a file.
    pub async fn create(
        executor: impl Executor<'_, Database = Postgres>,
        file_id: i32,
        user_id: Option<i32>,
        task_type: TaskType,
    ) -> Result<Task, DbError> {
        Ok(sqlx::query_as::<_, Task>(
            r"
            INSERT INTO task (file_id, user_id, task_type, priority, max_attempts)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            ",
        )
        .bind(file_id)
        .bind(user_id)
        .bind(task_type)
        .bind(DEFAULT_TASK_PRIORITY)
        .bind(DEFAULT_TASK_MAX_ATTEMPTS)
        .fetch_one(executor)
        .await?)
    }

    pub async fn find_for_file(
        executor: impl Executor<'_, Database = Postgres>,
        file_id: i32,
        task_type: TaskType,
    ) -> Result<Option<Task>, DbError> {
        Ok(sqlx::query_as::<_, Task>(
            "SELECT * FROM task WHERE file_id = $1 AND task_type = $2",
        )
        .bind(file_id)
        .bind(task_type)
        .fetch_optional(executor)
        .await?)
    }

    pub async fn delete_for_file(
        executor: impl Executor<'_, Database = Postgres>,
        file_id: i32,
    ) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM task WHERE file_id = $1")
            .bind(file_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
