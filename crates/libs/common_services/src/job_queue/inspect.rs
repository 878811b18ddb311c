use crate::database::DbError;
use crate::database::jobs::Job;
use chrono::{DateTime, Utc};
use common_types::queue::{JobState, QueueName};
use serde::Serialize;
use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};
use utoipa::ToSchema;

/// Job counts of one queue. While a queue is paused its waiting jobs count as `paused`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct JobCounts {
    pub waiting: i64,
    pub active: i64,
    pub completed: i64,
    pub failed: i64,
    pub delayed: i64,
    pub paused: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BackoffView {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub delay: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JobOptionsView {
    pub attempts: i32,
    pub backoff: BackoffView,
    pub priority: i32,
}

/// A job as reported by the queue admin API. Times are unix milliseconds.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobView {
    pub id: i64,
    pub queue: QueueName,
    pub name: String,
    #[schema(value_type = Object)]
    pub data: Value,
    pub status: JobState,
    pub progress: i32,
    pub timestamp: i64,
    pub processed_on: Option<i64>,
    pub finished_on: Option<i64>,
    pub failed_reason: Option<String>,
    pub attempts_made: i32,
    pub delay: i64,
    pub priority: i32,
    #[schema(value_type = Option<Object>)]
    pub return_value: Option<Value>,
    pub opts: JobOptionsView,
}

impl From<Job> for JobView {
    fn from(job: Job) -> Self {
        let millis = |t: DateTime<Utc>| t.timestamp_millis();
        Self {
            id: job.id,
            queue: job.queue,
            name: job.name,
            data: job.payload,
            status: job.status,
            progress: job.progress,
            timestamp: millis(job.created_at),
            processed_on: job.started_at.map(millis),
            finished_on: job.finished_at.map(millis),
            failed_reason: job.failed_reason,
            attempts_made: job.attempts_made,
            delay: (job.run_at - job.created_at).num_milliseconds().max(0),
            priority: job.priority,
            return_value: job.return_value,
            opts: JobOptionsView {
                attempts: job.max_attempts,
                backoff: BackoffView {
                    kind: "exponential",
                    delay: job.backoff_ms,
                },
                priority: job.priority,
            },
        }
    }
}

/// Fills [`JobCounts`] from `(state, count)` rows.
#[must_use]
pub fn fold_job_counts(rows: &[(JobState, i64)], paused: bool) -> JobCounts {
    let mut counts = JobCounts::default();
    for &(state, count) in rows {
        match state {
            JobState::Waiting if paused => counts.paused += count,
            JobState::Waiting => counts.waiting += count,
            JobState::Active => counts.active += count,
            JobState::Completed => counts.completed += count,
            JobState::Failed => counts.failed += count,
            JobState::Delayed => counts.delayed += count,
        }
    }
    counts
}

pub async fn is_queue_paused(
    executor: impl Executor<'_, Database = Postgres>,
    queue: QueueName,
) -> Result<bool, DbError> {
    Ok(
        sqlx::query_scalar::<_, bool>("SELECT paused FROM queue_state WHERE queue = $1")
            .bind(queue)
            .fetch_optional(executor)
            .await?
            .unwrap_or(false),
    )
}

pub async fn job_counts(pool: &PgPool, queue: QueueName) -> Result<JobCounts, DbError> {
    let rows = sqlx::query_as::<_, (JobState, i64)>(
        "SELECT status, COUNT(*) FROM jobs WHERE queue = $1 GROUP BY status",
    )
    .bind(queue)
    .fetch_all(pool)
    .await?;
    let paused = is_queue_paused(pool, queue).await?;
    Ok(fold_job_counts(&rows, paused))
}

/// Jobs of a queue in any of `states`, newest first.
pub async fn list_jobs(
    executor: impl Executor<'_, Database = Postgres>,
    queue: QueueName,
    states: &[JobState],
    limit: i64,
    offset: i64,
) -> Result<Vec<Job>, DbError> {
    let states: Vec<&str> = states.iter().map(|s| s.as_str()).collect();
    Ok(sqlx::query_as::<_, Job>(
        r"
        SELECT * FROM jobs
        WHERE queue = $1 AND status::text = ANY($2)
        ORDER BY created_at DESC, id DESC
        LIMIT $3 OFFSET $4
        ",
    )
    .bind(queue)
    .bind(states)
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await?)
}

pub async fn count_jobs(
    executor: impl Executor<'_, Database = Postgres>,
    queue: QueueName,
    states: &[JobState],
) -> Result<i64, DbError> {
    let states: Vec<&str> = states.iter().map(|s| s.as_str()).collect();
    Ok(sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM jobs WHERE queue = $1 AND status::text = ANY($2)",
    )
    .bind(queue)
    .bind(states)
    .fetch_one(executor)
    .await?)
}

pub async fn get_job(
    executor: impl Executor<'_, Database = Postgres>,
    queue: QueueName,
    job_id: i64,
) -> Result<Option<Job>, DbError> {
    Ok(
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1 AND queue = $2")
            .bind(job_id)
            .bind(queue)
            .fetch_optional(executor)
            .await?,
    )
}
