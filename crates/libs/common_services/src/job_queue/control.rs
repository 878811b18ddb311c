use crate::database::DbError;
use crate::database::jobs::Job;
use crate::database::transitions::transition_task;
use crate::job_queue::JobQueueError;
use common_types::queue::{JobState, QueueName};
use common_types::task_status::TaskStatus;
use sqlx::{Executor, PgConnection, PgPool, Postgres};
use tracing::{debug, info};

/// Re-queues a failed job with a fresh attempt budget.
///
/// The processing task of the referenced file is reset to `pending` in the same
/// transaction when its current state allows it.
pub async fn retry_job(
    pool: &PgPool,
    queue: QueueName,
    job_id: i64,
) -> Result<Job, JobQueueError> {
    let mut tx = pool.begin().await?;

    let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1 AND queue = $2 FOR UPDATE")
        .bind(job_id)
        .bind(queue)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(JobQueueError::JobNotFound(job_id))?;
    if job.status != JobState::Failed {
        return Err(JobQueueError::NotFailed(job_id));
    }

    let job = sqlx::query_as::<_, Job>(
        r"
        UPDATE jobs
        SET status = 'waiting',
            attempts_made = 0,
            progress = 0,
            failed_reason = NULL,
            return_value = NULL,
            owner = NULL,
            started_at = NULL,
            finished_at = NULL,
            last_heartbeat = NULL,
            run_at = now()
        WHERE id = $1
        RETURNING *
        ",
    )
    .bind(job_id)
    .fetch_one(&mut *tx)
    .await?;

    if let Some(file_id) = job.file_id() {
        move_task_if_allowed(&mut *tx, file_id, TaskStatus::Pending).await?;
    }

    tx.commit().await?;
    info!("Retrying {} job {job_id} on {queue}", job.name);
    Ok(job)
}

/// Deletes a job in any state. Removing a file-processing job cancels its task.
///
/// A handler already running the job is not interrupted; its later status writes
/// are rejected because `cancelled` is terminal.
pub async fn remove_job(
    pool: &PgPool,
    queue: QueueName,
    job_id: i64,
) -> Result<Job, JobQueueError> {
    let mut tx = pool.begin().await?;

    let job = sqlx::query_as::<_, Job>("DELETE FROM jobs WHERE id = $1 AND queue = $2 RETURNING *")
        .bind(job_id)
        .bind(queue)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(JobQueueError::JobNotFound(job_id))?;

    if queue == QueueName::FileProcessing
        && let Some(file_id) = job.file_id()
    {
        move_task_if_allowed(&mut *tx, file_id, TaskStatus::Cancelled).await?;
    }

    tx.commit().await?;
    info!("Removed {} job {job_id} from {queue}", job.name);
    Ok(job)
}

async fn move_task_if_allowed(
    conn: &mut PgConnection,
    file_id: i32,
    task_to: TaskStatus,
) -> Result<(), DbError> {
    match transition_task(conn, file_id, task_to, None).await {
        Ok(_) => Ok(()),
        Err(e) if e.is_illegal_transition() || e.is_not_found() => {
            debug!("Task of file {file_id} left unchanged: {e}");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Stops or restarts intake of a queue. Jobs already running are not affected.
pub async fn set_queue_paused(
    executor: impl Executor<'_, Database = Postgres>,
    queue: QueueName,
    paused: bool,
) -> Result<(), DbError> {
    sqlx::query(
        r"
        INSERT INTO queue_state (queue, paused, updated_at)
        VALUES ($1, $2, now())
        ON CONFLICT (queue) DO UPDATE SET paused = EXCLUDED.paused, updated_at = now()
        ",
    )
    .bind(queue)
    .bind(paused)
    .execute(executor)
    .await?;
    info!(
        "Queue {queue} {}",
        if paused { "paused" } else { "resumed" }
    );
    Ok(())
}

/// Stops workers from claiming new jobs of `queue`. Active jobs run to completion.
pub async fn pause_queue(
    executor: impl Executor<'_, Database = Postgres>,
    queue: QueueName,
) -> Result<(), DbError> {
    set_queue_paused(executor, queue, true).await
}

pub async fn resume_queue(
    executor: impl Executor<'_, Database = Postgres>,
    queue: QueueName,
) -> Result<(), DbError> {
    set_queue_paused(executor, queue, false).await
}

/// Deletes every job of a queue in the given state. Returns the number removed.
pub async fn clean_jobs(
    executor: impl Executor<'_, Database = Postgres>,
    queue: QueueName,
    state: JobState,
) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM jobs WHERE queue = $1 AND status = $2")
        .bind(queue)
        .bind(state)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Drops jobs of a file that have not started yet.
pub async fn remove_pending_jobs_for_file(
    executor: impl Executor<'_, Database = Postgres>,
    file_id: i32,
) -> Result<u64, DbError> {
    let result = sqlx::query(
        r"
        DELETE FROM jobs
        WHERE payload ->> 'fileId' = $1 AND status IN ('waiting', 'delayed')
        ",
    )
    .bind(file_id.to_string())
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
