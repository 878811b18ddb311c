use crate::context::WorkerContext;
use crate::jobs::heartbeat::start_heartbeat_loop;
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use common_services::database::jobs::Job;
use common_types::queue::JobName;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

pub mod forward_file;
pub mod notify_admin;
pub mod process_file;

/// The outcome of a job handler's execution.
#[derive(Debug, PartialEq, Eq)]
pub enum JobResult {
    /// Finished; the value is stored as the job's return value.
    Done(Value),
    /// Nothing left to do, for instance because the file was removed meanwhile.
    Skipped,
}

/// Dispatches a job to its corresponding handler and keeps its heartbeat alive.
///
/// # Errors
///
/// This function will return an error if the job name is unknown or the specific
/// job handler fails during execution.
pub async fn handle_job(context: &WorkerContext, job: &Job) -> Result<JobResult> {
    let name: JobName = job
        .name
        .parse()
        .map_err(|e| eyre!("Cannot handle job {}: {e}", job.id))?;
    let heartbeat_handle = start_heartbeat_loop(
        &context.pool,
        job.id,
        Duration::from_secs(context.settings.queue.heartbeat_interval_secs.max(1)),
    );

    let result = match name {
        JobName::ProcessFile => process_file::handle(context, job).await,
        JobName::NotifyAdmin => notify_admin::handle(context, job).await,
        JobName::ForwardFile => forward_file::handle(context, job).await,
    };

    heartbeat_handle.abort();
    result
}

/// Deserializes the payload of a job.
pub fn job_payload<T: DeserializeOwned>(job: &Job) -> Result<T> {
    serde_json::from_value(job.payload.clone())
        .wrap_err_with(|| format!("Invalid payload for {} job {}", job.name, job.id))
}
