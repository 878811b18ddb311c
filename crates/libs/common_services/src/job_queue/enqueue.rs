use crate::database::DbError;
use app_state::QueuePolicy;
use bon::builder;
use common_types::queue::JobName;
use serde::Serialize;
use serde_json::to_value;
use sqlx::PgConnection;
use tracing::info;

/// Publishes a job on the queue its name belongs to.
///
/// Takes a connection rather than a pool so the job can be written in the same
/// transaction as the rows it refers to.
///
/// # Errors
///
/// Returns an error if the payload cannot be serialized or the insert fails.
#[builder]
pub async fn enqueue_job<T: Serialize + Sync>(
    #[builder(start_fn)] conn: &mut PgConnection,
    #[builder(start_fn)] name: JobName,
    payload: &T,
    policy: QueuePolicy,
    #[builder(default)] priority: i32,
    #[builder(default)] delay_ms: i64,
) -> Result<i64, DbError> {
    let json_payload = to_value(payload)?;
    let queue = name.queue();

    let job_id = sqlx::query_scalar::<_, i64>(
        r"
        INSERT INTO jobs (queue, name, payload, status, priority, max_attempts, backoff_ms, run_at)
        VALUES (
            $1, $2, $3,
            CASE WHEN $7 > 0 THEN 'delayed'::job_state ELSE 'waiting'::job_state END,
            $4, $5, $6,
            now() + ($7::bigint * interval '1 millisecond')
        )
        RETURNING id
        ",
    )
    .bind(queue)
    .bind(name.as_str())
    .bind(&json_payload)
    .bind(priority)
    .bind(policy.attempts.max(1))
    .bind(policy.backoff_ms.max(0))
    .bind(delay_ms.max(0))
    .fetch_one(&mut *conn)
    .await?;

    info!("Enqueued {name} job {job_id} on {queue}, payload: {json_payload}");
    Ok(job_id)
}
