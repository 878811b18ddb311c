use sqlx::PgPool;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Spawns a background task to periodically update the `last_heartbeat` for an active job.
///
/// The loop ends by itself once the job is no longer active, for instance after it
/// has been removed through the queue API.
#[must_use]
pub fn start_heartbeat_loop(pool: &PgPool, job_id: i64, every: Duration) -> JoinHandle<()> {
    let pool_clone = pool.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // The first tick completes immediately, the claim already set the heartbeat.
        interval.tick().await;
        loop {
            interval.tick().await;
            let result = sqlx::query(
                "UPDATE jobs SET last_heartbeat = now() WHERE id = $1 AND status = 'active'",
            )
            .bind(job_id)
            .execute(&pool_clone)
            .await;

            let Ok(res) = result else { break };
            if res.rows_affected() == 0 {
                debug!("Job {job_id} is no longer active, stopping heartbeat");
                break;
            }
        }
    })
}
