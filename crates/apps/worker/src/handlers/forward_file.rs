use crate::context::WorkerContext;
use crate::handlers::{JobResult, job_payload};
use color_eyre::Result;
use color_eyre::eyre::Report;
use common_services::database::jobs::Job;
use common_services::database::transitions::transition_task;
use common_types::ForwardFilePayload;
use common_types::task_status::TaskStatus;
use serde_json::json;
use sqlx::PgPool;
use tracing::{debug, info, warn};

/// Sends an upload's public URL to the external webhook.
///
/// Success marks the task `sent_to_make`. A failure is retried by the queue; only
/// the last attempt marks the task `make_error`. The upload itself is never affected.
pub async fn handle(context: &WorkerContext, job: &Job) -> Result<JobResult> {
    let payload: ForwardFilePayload = job_payload(job)?;
    if !context.forward_client.is_configured() {
        warn!(
            "No external webhook configured, dropping forward of file {}",
            payload.file_id
        );
        return Ok(JobResult::Skipped);
    }

    match context.forward_client.forward_upload(&payload).await {
        Ok(()) => {
            record_task_status(&context.pool, payload.file_id, TaskStatus::SentToMake, None)
                .await?;
            info!("📤 Forwarded file {} to external webhook", payload.file_id);
            Ok(JobResult::Done(json!({
                "fileId": payload.file_id,
                "status": TaskStatus::SentToMake,
            })))
        }
        Err(e) => {
            let detail = e.to_string();
            if job.is_final_attempt() {
                record_task_status(
                    &context.pool,
                    payload.file_id,
                    TaskStatus::MakeError,
                    Some(&detail),
                )
                .await?;
            }
            Err(Report::new(e).wrap_err(format!(
                "Forwarding file {} failed",
                payload.file_id
            )))
        }
    }
}

/// Moves the task unless processing has already taken it further.
async fn record_task_status(
    pool: &PgPool,
    file_id: i32,
    task_to: TaskStatus,
    error_message: Option<&str>,
) -> Result<()> {
    let mut tx = pool.begin().await?;
    match transition_task(&mut *tx, file_id, task_to, error_message).await {
        Ok(_) => tx.commit().await?,
        Err(e) if e.is_illegal_transition() || e.is_not_found() => {
            debug!("Task of file {file_id} not marked {task_to}: {e}");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
