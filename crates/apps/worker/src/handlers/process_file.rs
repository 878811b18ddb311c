use crate::context::WorkerContext;
use crate::handlers::{JobResult, job_payload};
use crate::jobs::management::report_progress;
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, bail};
use common_services::database::jobs::Job;
use common_services::database::transitions::transition_file_and_task;
use common_types::ProcessFilePayload;
use common_types::file_status::FileStatus;
use common_types::task_status::TaskStatus;
use serde_json::{Value, json};
use sqlx::PgPool;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Prepares an uploaded file for note generation.
///
/// On failure the file and its task are marked `failed` and the error is returned,
/// so the queue's retry policy decides whether the job runs again.
pub async fn handle(context: &WorkerContext, job: &Job) -> Result<JobResult> {
    let payload: ProcessFilePayload = job_payload(job)?;
    info!(
        "🔄 Processing file: {} ({})",
        payload.original_name, payload.filename
    );

    match process(context, job, &payload).await {
        Ok(result) => Ok(result),
        Err(e) => {
            error!(
                "❌ File processing failed: {}: {e:?}",
                payload.original_name
            );
            mark_failed(&context.pool, payload.file_id, &e.to_string()).await;
            Err(e)
        }
    }
}

async fn process(
    context: &WorkerContext,
    job: &Job,
    payload: &ProcessFilePayload,
) -> Result<JobResult> {
    let pool = &context.pool;
    if !move_file(
        pool,
        payload.file_id,
        FileStatus::Processing,
        TaskStatus::Processing,
    )
    .await?
    {
        return Ok(JobResult::Skipped);
    }

    let step = Duration::from_millis(context.settings.queue.simulated_step_ms);
    ensure_stored(payload).await?;
    sleep(step).await;
    report_progress(pool, job.id, 50).await?;
    sleep(step).await;
    report_progress(pool, job.id, 100).await?;

    if !move_file(
        pool,
        payload.file_id,
        FileStatus::ReadyForNotes,
        TaskStatus::Completed,
    )
    .await?
    {
        return Ok(JobResult::Skipped);
    }

    info!("✅ File processing completed: {}", payload.original_name);
    Ok(JobResult::Done(processed_result(payload)))
}

fn processed_result(payload: &ProcessFilePayload) -> Value {
    json!({
        "fileId": payload.file_id,
        "filename": payload.filename,
        "originalName": payload.original_name,
        "status": FileStatus::ReadyForNotes,
    })
}

/// The stored upload must still be on disk.
async fn ensure_stored(payload: &ProcessFilePayload) -> Result<()> {
    let exists = tokio::fs::try_exists(&payload.file_path)
        .await
        .wrap_err_with(|| format!("Cannot access {}", payload.file_path))?;
    if !exists {
        bail!("Stored file {} is missing", payload.file_path);
    }
    Ok(())
}

/// Moves the file and its task together. Returns `false` when the file is gone or
/// has moved on, for instance after its job was removed.
async fn move_file(
    pool: &PgPool,
    file_id: i32,
    file_to: FileStatus,
    task_to: TaskStatus,
) -> Result<bool> {
    let mut tx = pool.begin().await?;
    match transition_file_and_task(&mut *tx, file_id, file_to, task_to, None).await {
        Ok(_) => {
            tx.commit().await?;
            Ok(true)
        }
        Err(e) if e.is_illegal_transition() || e.is_not_found() => {
            warn!("Skipping file {file_id}: {e}");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Records the failure on the file and its task. Problems doing so are only logged,
/// the original error is what gets reported.
async fn mark_failed(pool: &PgPool, file_id: i32, message: &str) {
    let result = async {
        let mut tx = pool.begin().await?;
        transition_file_and_task(
            &mut *tx,
            file_id,
            FileStatus::Failed,
            TaskStatus::Failed,
            Some(message),
        )
        .await?;
        tx.commit().await?;
        Ok::<(), common_services::database::DbError>(())
    }
    .await;

    if let Err(e) = result {
        warn!("Could not mark file {file_id} as failed: {e}");
    }
}
