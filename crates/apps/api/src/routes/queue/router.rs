use crate::api_state::ApiContext;
use crate::queue::handlers::{
    clear_completed_handler, clear_failed_handler, pause_queue_handler, queue_job_handler,
    queue_jobs_handler, queue_status_handler, remove_job_handler, resume_queue_handler,
    retry_job_handler,
};
use axum::{
    Router,
    routing::{delete, get, post},
};

pub fn queue_admin_router() -> Router<ApiContext> {
    Router::new()
        .route("/api/queue/status", get(queue_status_handler))
        .route("/api/queue/{queue_name}/jobs", get(queue_jobs_handler))
        .route(
            "/api/queue/job/{queue_name}/{job_id}",
            get(queue_job_handler).delete(remove_job_handler),
        )
        .route(
            "/api/queue/job/{queue_name}/{job_id}/retry",
            post(retry_job_handler),
        )
        .route("/api/queue/{queue_name}/pause", post(pause_queue_handler))
        .route("/api/queue/{queue_name}/resume", post(resume_queue_handler))
        .route(
            "/api/queue/{queue_name}/clear-completed",
            delete(clear_completed_handler),
        )
        .route(
            "/api/queue/{queue_name}/clear-failed",
            delete(clear_failed_handler),
        )
}
