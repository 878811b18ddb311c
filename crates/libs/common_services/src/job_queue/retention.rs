use crate::database::DbError;
use common_types::queue::QueueName;
use sqlx::{Executor, Postgres};

/// Keeps only the newest `keep_completed` completed and `keep_failed` failed jobs
/// of a queue. Returns the number of jobs discarded.
pub async fn trim_finished_jobs(
    executor: impl Executor<'_, Database = Postgres>,
    queue: QueueName,
    keep_completed: i64,
    keep_failed: i64,
) -> Result<u64, DbError> {
    let result = sqlx::query(
        r"
        DELETE FROM jobs
        WHERE id IN (
            (SELECT id FROM jobs
             WHERE queue = $1 AND status = 'completed'
             ORDER BY finished_at DESC NULLS LAST, id DESC
             OFFSET $2)
            UNION ALL
            (SELECT id FROM jobs
             WHERE queue = $1 AND status = 'failed'
             ORDER BY finished_at DESC NULLS LAST, id DESC
             OFFSET $3)
        )
        ",
    )
    .bind(queue)
    .bind(keep_completed.max(0))
    .bind(keep_failed.max(0))
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
