use crate::context::WorkerContext;
use crate::handlers::handle_job;
use crate::jobs::management::{
    claim_next_job, recover_stalled_jobs, update_job_on_completion, update_job_on_failure,
};
use app_state::AppSettings;
use color_eyre::Result;
use common_services::utils::nice_id;
use common_types::queue::QueueName;
use sqlx::PgPool;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{info, warn};

pub async fn create_worker(
    pool: PgPool,
    settings: AppSettings,
    queues: Vec<QueueName>,
    stop_on_sleep: bool,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let worker_id = nice_id(8);
    info!("🛠️ [Worker ID: {}] Starting.", worker_id);
    let context = WorkerContext::new(pool, settings, worker_id, queues)?;
    info!("Listening on queues: {:?}", context.queues);

    run_worker_loop(&context, stop_on_sleep, shutdown).await
}

/// The main loop for the worker process, continuously fetching and processing jobs.
///
/// Stalled jobs of crashed workers are re-queued along the way. A job that is
/// running when shutdown is requested is finished first.
///
/// # Errors
///
/// This function will return an error if there is a problem communicating with the
/// database when claiming or updating a job. The loop will terminate in such a case.
pub async fn run_worker_loop(
    context: &WorkerContext,
    stop_on_sleep: bool,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let queue_settings = &context.settings.queue;
    let poll_interval = Duration::from_millis(queue_settings.poll_interval_ms);
    let stall_check_interval = Duration::from_secs(queue_settings.heartbeat_interval_secs.max(1));
    let mut last_stall_check: Option<Instant> = None;
    let mut sleeping = false;

    loop {
        if *shutdown.borrow() {
            info!("🛑 Worker {} stopping.", context.worker_id);
            return Ok(());
        }

        if last_stall_check.is_none_or(|at| at.elapsed() >= stall_check_interval) {
            let stalled =
                recover_stalled_jobs(&context.pool, queue_settings.stall_timeout_secs).await?;
            if stalled > 0 {
                warn!("Re-queued {stalled} stalled jobs");
            }
            last_stall_check = Some(Instant::now());
        }

        let maybe_job = claim_next_job(context).await?;

        if let Some(job) = maybe_job {
            sleeping = false;
            info!(
                "🐜 Picked up {} job {} from {} (attempt {}/{})",
                job.name,
                job.id,
                job.queue,
                job.attempts_made + 1,
                job.max_attempts
            );

            let job_result = handle_job(context, &job).await;

            match job_result {
                Ok(result) => update_job_on_completion(context, &job, result).await?,
                Err(e) => update_job_on_failure(context, &job, &e).await?,
            }
        } else {
            if !sleeping {
                sleeping = true;
                info!("💤 No jobs, going to sleep...");
                if stop_on_sleep {
                    return Ok(());
                }
            }
            tokio::select! {
                () = sleep(poll_interval) => {}
                _ = shutdown.changed() => {}
            }
        }
    }
}
