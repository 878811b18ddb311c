use crate::context::WorkerContext;
use crate::handlers::JobResult;
use color_eyre::{Report, Result};
use common_services::alert;
use common_services::database::DbError;
use common_services::database::jobs::Job;
use common_services::database::transitions::transition_file_and_task;
use common_services::job_queue::trim_finished_jobs;
use common_types::file_status::FileStatus;
use common_types::queue::{JobState, QueueName, backoff_delay_ms};
use common_types::task_status::TaskStatus;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{debug, error, info, warn};

/// Reason recorded on jobs whose worker stopped sending heartbeats.
pub const STALLED_REASON: &str = "job stalled more than allowable limit";

/// Atomically claims the next runnable job of the worker's queues.
///
/// Waiting jobs and delayed jobs whose delay has passed are eligible; jobs of a
/// paused queue are left alone. Concurrent workers never receive the same job.
///
/// # Errors
///
/// Returns an error if the database transaction fails.
pub async fn claim_next_job(context: &WorkerContext) -> Result<Option<Job>> {
    let queues: Vec<&str> = context.queues.iter().map(|q| q.db_name()).collect();
    let mut tx = context.pool.begin().await?;

    let job = sqlx::query_as::<_, Job>(
        r"
        WITH candidate AS (
            SELECT j.id FROM jobs j
            WHERE j.status IN ('waiting', 'delayed')
              AND j.run_at <= now()
              AND j.queue::text = ANY($2)
              AND NOT EXISTS (
                  SELECT 1 FROM queue_state q WHERE q.queue = j.queue AND q.paused
              )
            ORDER BY j.priority, j.run_at, j.id
            FOR UPDATE SKIP LOCKED
            LIMIT 1
        )
        UPDATE jobs
        SET status = 'active',
            owner = $1,
            started_at = now(),
            last_heartbeat = now()
        WHERE id = (SELECT id FROM candidate)
        RETURNING *
        ",
    )
    .bind(&context.worker_id)
    .bind(&queues)
    .fetch_optional(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(job)
}

/// Stores the progress (0 to 100) of an active job.
pub async fn report_progress(pool: &PgPool, job_id: i64, progress: i32) -> Result<()> {
    sqlx::query("UPDATE jobs SET progress = $2 WHERE id = $1 AND status = 'active'")
        .bind(job_id)
        .bind(progress.clamp(0, 100))
        .execute(pool)
        .await?;
    Ok(())
}

/// Updates a job's status based on a successful completion result.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub async fn update_job_on_completion(
    context: &WorkerContext,
    job: &Job,
    result: JobResult,
) -> Result<()> {
    let return_value = match result {
        JobResult::Done(value) => Some(value),
        JobResult::Skipped => None,
    };

    let updated = sqlx::query(
        r"
        UPDATE jobs
        SET status = 'completed',
            attempts_made = attempts_made + 1,
            return_value = $3,
            failed_reason = NULL,
            finished_at = now()
        WHERE id = $1 AND status = 'active' AND owner = $2
        ",
    )
    .bind(job.id)
    .bind(&context.worker_id)
    .bind(&return_value)
    .execute(&context.pool)
    .await?
    .rows_affected();

    if updated == 0 {
        warn!(
            "{} job {} was removed or reclaimed before it completed",
            job.queue, job.id
        );
        return Ok(());
    }
    info!("✅ {} job {} ({}) completed", job.queue, job.id, job.name);
    trim_queue(context, job.queue).await
}

/// What happens to a job after a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePlan {
    /// Run again after the given delay.
    Retry { delay_ms: i64 },
    /// Attempt budget used up.
    Fail,
}

/// Decides between a delayed retry and a final failure for the run that just failed.
#[must_use]
pub fn plan_failure(attempts_made: i32, max_attempts: i32, backoff_ms: i64) -> FailurePlan {
    let attempts = attempts_made.saturating_add(1);
    if attempts >= max_attempts {
        FailurePlan::Fail
    } else {
        FailurePlan::Retry {
            delay_ms: backoff_delay_ms(attempts, backoff_ms),
        }
    }
}

/// Updates a job's status on failure, either marking it as failed or rescheduling it.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub async fn update_job_on_failure(context: &WorkerContext, job: &Job, error: &Report) -> Result<()> {
    let reason = error.to_string();
    debug!("{} job {} failed: {error:?}", job.queue, job.id);

    match plan_failure(job.attempts_made, job.max_attempts, job.backoff_ms) {
        FailurePlan::Fail => {
            if mark_job_failed(context, job, &reason).await? {
                error!("❌ {} job {} ({}) failed: {reason}", job.queue, job.id, job.name);
                alert!("Marked {} job {} as failed after {} attempts", job.queue, job.id, job.max_attempts);
                trim_queue(context, job.queue).await?;
            }
        }
        FailurePlan::Retry { delay_ms } => {
            if reschedule_for_retry(context, job, delay_ms, &reason).await? {
                warn!(
                    "⚠️ Rescheduling {} job {} ({}). Backoff: {delay_ms}ms. Error: {reason}",
                    job.queue, job.id, job.name
                );
            }
        }
    }
    Ok(())
}

async fn mark_job_failed(context: &WorkerContext, job: &Job, reason: &str) -> Result<bool> {
    let updated = sqlx::query(
        r"
        UPDATE jobs
        SET status = 'failed',
            attempts_made = attempts_made + 1,
            failed_reason = $3,
            finished_at = now()
        WHERE id = $1 AND status = 'active' AND owner = $2
        ",
    )
    .bind(job.id)
    .bind(&context.worker_id)
    .bind(reason)
    .execute(&context.pool)
    .await?
    .rows_affected();
    Ok(updated > 0)
}

async fn reschedule_for_retry(
    context: &WorkerContext,
    job: &Job,
    delay_ms: i64,
    reason: &str,
) -> Result<bool> {
    let updated = sqlx::query(
        r"
        UPDATE jobs
        SET status = 'delayed',
            attempts_made = attempts_made + 1,
            failed_reason = $4,
            run_at = now() + ($3::bigint * interval '1 millisecond'),
            owner = NULL,
            started_at = NULL,
            last_heartbeat = NULL
        WHERE id = $1 AND status = 'active' AND owner = $2
        ",
    )
    .bind(job.id)
    .bind(&context.worker_id)
    .bind(delay_ms)
    .bind(reason)
    .execute(&context.pool)
    .await?
    .rows_affected();
    Ok(updated > 0)
}

/// Discards finished jobs beyond the configured retention of the queue.
async fn trim_queue(context: &WorkerContext, queue: QueueName) -> Result<()> {
    let removed = trim_finished_jobs(
        &context.pool,
        queue,
        context.settings.queue.keep_completed,
        context.settings.queue.keep_failed,
    )
    .await?;
    if removed > 0 {
        debug!("Trimmed {removed} finished jobs from {queue}");
    }
    Ok(())
}

/// Re-queues active jobs whose heartbeat is older than `timeout_secs`.
///
/// A stall counts as an attempt, so a job that keeps stalling ends up failed.
/// A file-processing job failed this way also fails its file and task.
/// Returns the number of stalled jobs found.
pub async fn recover_stalled_jobs(pool: &PgPool, timeout_secs: u64) -> Result<usize> {
    let timeout_secs = i64::try_from(timeout_secs)?;
    let stalled = sqlx::query_as::<_, (i64, QueueName, String, JobState, Value)>(
        r"
        UPDATE jobs
        SET status = CASE
                WHEN attempts_made + 1 >= max_attempts THEN 'failed'::job_state
                ELSE 'waiting'::job_state
            END,
            finished_at = CASE WHEN attempts_made + 1 >= max_attempts THEN now() END,
            attempts_made = attempts_made + 1,
            failed_reason = $2,
            owner = NULL,
            started_at = NULL,
            last_heartbeat = NULL,
            run_at = now()
        WHERE status = 'active'
          AND last_heartbeat < now() - ($1::bigint * interval '1 second')
        RETURNING id, queue, name, status, payload
        ",
    )
    .bind(timeout_secs)
    .bind(STALLED_REASON)
    .fetch_all(pool)
    .await?;

    for (id, queue, name, status, payload) in &stalled {
        warn!("⚠️ {queue} job {id} ({name}) stalled, now {status}");
        if let Some(file_id) = stalled_file_to_fail(*queue, *status, payload) {
            fail_stalled_file(pool, file_id).await?;
        }
    }
    Ok(stalled.len())
}

/// The file whose task ends with a stalled job: only a file-processing job that
/// ran out of attempts has one.
fn stalled_file_to_fail(queue: QueueName, status: JobState, payload: &Value) -> Option<i32> {
    if queue != QueueName::FileProcessing || status != JobState::Failed {
        return None;
    }
    payload
        .get("fileId")
        .and_then(Value::as_i64)
        .and_then(|id| i32::try_from(id).ok())
}

async fn fail_stalled_file(pool: &PgPool, file_id: i32) -> Result<()> {
    let result = async {
        let mut tx = pool.begin().await?;
        transition_file_and_task(
            &mut *tx,
            file_id,
            FileStatus::Failed,
            TaskStatus::Failed,
            Some(STALLED_REASON),
        )
        .await?;
        tx.commit().await?;
        Ok::<(), DbError>(())
    }
    .await;

    match result {
        Ok(()) => {
            info!("File {file_id} failed after its processing job stalled");
            Ok(())
        }
        Err(e) if e.is_illegal_transition() || e.is_not_found() => {
            debug!("Stalled job left file {file_id} as is: {e}");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
