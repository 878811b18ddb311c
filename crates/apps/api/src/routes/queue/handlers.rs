use crate::api_state::ApiContext;
use axum::Json;
use axum::extract::{Path, Query, State};
use common_services::api::common::MessageResponse;
use common_services::api::queue::error::QueueError;
use common_services::api::queue::interfaces::{
    ClearJobsResponse, JobListParams, JobListResponse, JobResponse, QueueStatusResponse,
};
use common_services::api::queue::service::{
    clear_jobs, parse_job_id, parse_queue_name, pause, queue_job, queue_jobs, queue_status,
    remove_queue_job, resume, retry_queue_job,
};
use common_types::queue::JobState;
use tracing::instrument;

/// Counts and recent jobs of every queue, with task counts from the database.
///
/// # Errors
///
/// Returns `QueueError` if a query fails.
#[utoipa::path(
    get,
    path = "/api/queue/status",
    tag = "Queue",
    responses(
        (status = 200, description = "Queue overview", body = QueueStatusResponse),
        (status = 403, description = "Admin role required"),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context), err(Debug))]
pub async fn queue_status_handler(
    State(context): State<ApiContext>,
) -> Result<Json<QueueStatusResponse>, QueueError> {
    Ok(Json(queue_status(&context.pool).await?))
}

/// Jobs of one queue, optionally filtered by state.
///
/// # Errors
///
/// Returns `QueueError::InvalidQueue` or `QueueError::InvalidState` for unknown names.
#[utoipa::path(
    get,
    path = "/api/queue/{queue_name}/jobs",
    tag = "Queue",
    params(
        ("queue_name" = String, Path, description = "file-processing, note-generation or file-forwarding"),
        JobListParams
    ),
    responses(
        (status = 200, description = "Paginated jobs", body = JobListResponse),
        (status = 400, description = "Invalid queue name or state"),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context), err(Debug))]
pub async fn queue_jobs_handler(
    State(context): State<ApiContext>,
    Path(queue_name): Path<String>,
    Query(params): Query<JobListParams>,
) -> Result<Json<JobListResponse>, QueueError> {
    let queue = parse_queue_name(&queue_name)?;
    Ok(Json(queue_jobs(&context.pool, queue, &params).await?))
}

/// A single job.
///
/// # Errors
///
/// Returns `QueueError::JobNotFound` if the job is not on that queue.
#[utoipa::path(
    get,
    path = "/api/queue/job/{queue_name}/{job_id}",
    tag = "Queue",
    params(
        ("queue_name" = String, Path, description = "Queue name"),
        ("job_id" = String, Path, description = "Job id"),
    ),
    responses(
        (status = 200, description = "Job details", body = JobResponse),
        (status = 400, description = "Invalid queue name"),
        (status = 404, description = "Job not found"),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context), err(Debug))]
pub async fn queue_job_handler(
    State(context): State<ApiContext>,
    Path((queue_name, job_id)): Path<(String, String)>,
) -> Result<Json<JobResponse>, QueueError> {
    let queue = parse_queue_name(&queue_name)?;
    let job_id = parse_job_id(&job_id)?;
    Ok(Json(queue_job(&context.pool, queue, job_id).await?))
}

/// Re-queue a failed job and reset its file's task to `pending`.
///
/// # Errors
///
/// Returns `QueueError::NotFailed` if the job is not in the failed state.
#[utoipa::path(
    post,
    path = "/api/queue/job/{queue_name}/{job_id}/retry",
    tag = "Queue",
    params(
        ("queue_name" = String, Path, description = "Queue name"),
        ("job_id" = String, Path, description = "Job id"),
    ),
    responses(
        (status = 200, description = "Retry initiated", body = MessageResponse),
        (status = 400, description = "Invalid queue name or job not failed"),
        (status = 404, description = "Job not found"),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context), err(Debug))]
pub async fn retry_job_handler(
    State(context): State<ApiContext>,
    Path((queue_name, job_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, QueueError> {
    let queue = parse_queue_name(&queue_name)?;
    let job_id = parse_job_id(&job_id)?;
    Ok(Json(retry_queue_job(&context.pool, queue, job_id).await?))
}

/// Remove a job in any state.
///
/// # Errors
///
/// Returns `QueueError::JobNotFound` if the job is not on that queue.
#[utoipa::path(
    delete,
    path = "/api/queue/job/{queue_name}/{job_id}",
    tag = "Queue",
    params(
        ("queue_name" = String, Path, description = "Queue name"),
        ("job_id" = String, Path, description = "Job id"),
    ),
    responses(
        (status = 200, description = "Job removed", body = MessageResponse),
        (status = 400, description = "Invalid queue name"),
        (status = 404, description = "Job not found"),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context), err(Debug))]
pub async fn remove_job_handler(
    State(context): State<ApiContext>,
    Path((queue_name, job_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, QueueError> {
    let queue = parse_queue_name(&queue_name)?;
    let job_id = parse_job_id(&job_id)?;
    Ok(Json(remove_queue_job(&context.pool, queue, job_id).await?))
}

/// Stop workers from claiming jobs of a queue.
///
/// # Errors
///
/// Returns `QueueError::InvalidQueue` for unknown queue names.
#[utoipa::path(
    post,
    path = "/api/queue/{queue_name}/pause",
    tag = "Queue",
    params(("queue_name" = String, Path, description = "Queue name")),
    responses(
        (status = 200, description = "Queue paused", body = MessageResponse),
        (status = 400, description = "Invalid queue name"),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context), err(Debug))]
pub async fn pause_queue_handler(
    State(context): State<ApiContext>,
    Path(queue_name): Path<String>,
) -> Result<Json<MessageResponse>, QueueError> {
    let queue = parse_queue_name(&queue_name)?;
    Ok(Json(pause(&context.pool, queue).await?))
}

/// Let workers claim jobs of a paused queue again.
///
/// # Errors
///
/// Returns `QueueError::InvalidQueue` for unknown queue names.
#[utoipa::path(
    post,
    path = "/api/queue/{queue_name}/resume",
    tag = "Queue",
    params(("queue_name" = String, Path, description = "Queue name")),
    responses(
        (status = 200, description = "Queue resumed", body = MessageResponse),
        (status = 400, description = "Invalid queue name"),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context), err(Debug))]
pub async fn resume_queue_handler(
    State(context): State<ApiContext>,
    Path(queue_name): Path<String>,
) -> Result<Json<MessageResponse>, QueueError> {
    let queue = parse_queue_name(&queue_name)?;
    Ok(Json(resume(&context.pool, queue).await?))
}

/// Delete all completed jobs of a queue.
///
/// # Errors
///
/// Returns `QueueError::InvalidQueue` for unknown queue names.
#[utoipa::path(
    delete,
    path = "/api/queue/{queue_name}/clear-completed",
    tag = "Queue",
    params(("queue_name" = String, Path, description = "Queue name")),
    responses(
        (status = 200, description = "Completed jobs cleared", body = ClearJobsResponse),
        (status = 400, description = "Invalid queue name"),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context), err(Debug))]
pub async fn clear_completed_handler(
    State(context): State<ApiContext>,
    Path(queue_name): Path<String>,
) -> Result<Json<ClearJobsResponse>, QueueError> {
    let queue = parse_queue_name(&queue_name)?;
    Ok(Json(clear_jobs(&context.pool, queue, JobState::Completed).await?))
}

/// Delete all failed jobs of a queue.
///
/// # Errors
///
/// Returns `QueueError::InvalidQueue` for unknown queue names.
#[utoipa::path(
    delete,
    path = "/api/queue/{queue_name}/clear-failed",
    tag = "Queue",
    params(("queue_name" = String, Path, description = "Queue name")),
    responses(
        (status = 200, description = "Failed jobs cleared", body = ClearJobsResponse),
        (status = 400, description = "Invalid queue name"),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context), err(Debug))]
pub async fn clear_failed_handler(
    State(context): State<ApiContext>,
    Path(queue_name): Path<String>,
) -> Result<Json<ClearJobsResponse>, QueueError> {
    let queue = parse_queue_name(&queue_name)?;
    Ok(Json(clear_jobs(&context.pool, queue, JobState::Failed).await?))
}
