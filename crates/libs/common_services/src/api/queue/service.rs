use crate::api::common::{MessageResponse, PageParams, Pagination};
use crate::api::queue::error::QueueError;
use crate::api::queue::interfaces::{
    ClearJobsResponse, JobListParams, JobListResponse, JobResponse, QueueOverview,
    QueueStatusResponse,
};
use crate::database::report_store::{ReportStore, TaskStatusCount};
use crate::job_queue::{
    JobView, clean_jobs, count_jobs, get_job, job_counts, list_jobs, pause_queue, remove_job,
    resume_queue, retry_job,
};
use chrono::Utc;
use common_types::queue::{JobState, QueueName};
use sqlx::PgPool;
use std::collections::BTreeMap;
use tracing::info;

const OVERVIEW_JOB_LIMIT: i64 = 10;
const JOBS_PAGE_SIZE: i64 = 20;
const RECENT_STATES: [JobState; 3] = [JobState::Active, JobState::Waiting, JobState::Delayed];

pub fn parse_queue_name(name: &str) -> Result<QueueName, QueueError> {
    name.parse()
        .map_err(|_| QueueError::InvalidQueue(name.to_owned()))
}

/// Job ids that do not parse cannot name an existing job.
pub fn parse_job_id(raw: &str) -> Result<i64, QueueError> {
    raw.trim().parse().map_err(|_| QueueError::JobNotFound)
}

/// Parses a comma-separated state list. `paused` selects waiting jobs.
fn parse_states(raw: Option<&str>) -> Result<Vec<JobState>, QueueError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(JobState::ALL.to_vec());
    };
    let mut states = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let state = if part == "paused" {
            JobState::Waiting
        } else {
            part.parse()
                .map_err(|_| QueueError::InvalidState(part.to_owned()))?
        };
        if !states.contains(&state) {
            states.push(state);
        }
    }
    Ok(states)
}

/// Groups `(task_type, status, count)` rows into nested maps.
fn group_task_counts(rows: Vec<TaskStatusCount>) -> BTreeMap<String, BTreeMap<String, i64>> {
    let mut grouped: BTreeMap<String, BTreeMap<String, i64>> = BTreeMap::new();
    for row in rows {
        grouped
            .entry(row.task_type.as_str().to_owned())
            .or_default()
            .insert(row.status.as_str().to_owned(), row.count);
    }
    grouped
}

async fn queue_overview(pool: &PgPool, queue: QueueName) -> Result<QueueOverview, QueueError> {
    let counts = job_counts(pool, queue).await?;
    let recent_jobs = list_jobs(pool, queue, &RECENT_STATES, OVERVIEW_JOB_LIMIT, 0).await?;
    let failed_jobs = list_jobs(pool, queue, &[JobState::Failed], OVERVIEW_JOB_LIMIT, 0).await?;

    Ok(QueueOverview {
        counts,
        recent_jobs: recent_jobs.into_iter().map(JobView::from).collect(),
        failed_jobs: failed_jobs.into_iter().map(JobView::from).collect(),
    })
}

/// Counts and recent jobs for every queue plus task counts from the database.
pub async fn queue_status(pool: &PgPool) -> Result<QueueStatusResponse, QueueError> {
    let (file_processing_queue, note_generation_queue, file_forwarding_queue) = tokio::try_join!(
        queue_overview(pool, QueueName::FileProcessing),
        queue_overview(pool, QueueName::NoteGeneration),
        queue_overview(pool, QueueName::FileForwarding),
    )?;
    let task_counts = ReportStore::task_status_counts(pool).await?;

    Ok(QueueStatusResponse {
        file_processing_queue,
        note_generation_queue,
        file_forwarding_queue,
        database_tasks: group_task_counts(task_counts),
        timestamp: Utc::now(),
    })
}

pub async fn queue_jobs(
    pool: &PgPool,
    queue: QueueName,
    params: &JobListParams,
) -> Result<JobListResponse, QueueError> {
    let states = parse_states(params.state.as_deref())?;
    let (page, limit, offset) = PageParams {
        page: params.page,
        limit: params.limit,
    }
    .resolve(JOBS_PAGE_SIZE);

    let total = count_jobs(pool, queue, &states).await?;
    let jobs = list_jobs(pool, queue, &states, limit, offset).await?;

    Ok(JobListResponse {
        queue,
        jobs: jobs.into_iter().map(JobView::from).collect(),
        pagination: Pagination::new(page, limit, total),
    })
}

pub async fn queue_job(
    pool: &PgPool,
    queue: QueueName,
    job_id: i64,
) -> Result<JobResponse, QueueError> {
    let job = get_job(pool, queue, job_id)
        .await?
        .ok_or(QueueError::JobNotFound)?;
    Ok(JobResponse {
        job: JobView::from(job),
    })
}

pub async fn retry_queue_job(
    pool: &PgPool,
    queue: QueueName,
    job_id: i64,
) -> Result<MessageResponse, QueueError> {
    retry_job(pool, queue, job_id).await?;
    Ok(MessageResponse::new("Job retry initiated successfully"))
}

pub async fn remove_queue_job(
    pool: &PgPool,
    queue: QueueName,
    job_id: i64,
) -> Result<MessageResponse, QueueError> {
    remove_job(pool, queue, job_id).await?;
    Ok(MessageResponse::new("Job removed successfully"))
}

pub async fn pause(pool: &PgPool, queue: QueueName) -> Result<MessageResponse, QueueError> {
    pause_queue(pool, queue).await?;
    Ok(MessageResponse::new(format!("{queue} queue paused successfully")))
}

pub async fn resume(pool: &PgPool, queue: QueueName) -> Result<MessageResponse, QueueError> {
    resume_queue(pool, queue).await?;
    Ok(MessageResponse::new(format!("{queue} queue resumed successfully")))
}

/// Deletes all finished jobs of one state (`completed` or `failed`).
pub async fn clear_jobs(
    pool: &PgPool,
    queue: QueueName,
    state: JobState,
) -> Result<ClearJobsResponse, QueueError> {
    let cleared = clean_jobs(pool, queue, state).await?;
    info!("🧹 Cleared {cleared} {state} jobs from {queue}");
    Ok(ClearJobsResponse {
        message: format!("Cleared {cleared} {state} jobs from {queue} queue"),
        cleared_count: cleared,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use common_types::task_status::{TaskStatus, TaskType};

    #[test]
    fn queue_names_use_kebab_case() {
        assert!(matches!(
            parse_queue_name("file-processing"),
            Ok(QueueName::FileProcessing)
        ));
        assert!(matches!(
            parse_queue_name("file_processing"),
            Err(QueueError::InvalidQueue(_))
        ));
    }

    #[test]
    fn non_numeric_job_id_is_not_found() {
        assert!(matches!(parse_job_id("42"), Ok(42)));
        assert!(matches!(parse_job_id("abc"), Err(QueueError::JobNotFound)));
    }

    #[test]
    fn states_default_to_all() {
        assert!(matches!(parse_states(None), Ok(s) if s == JobState::ALL.to_vec()));
        assert!(matches!(parse_states(Some(" ")), Ok(s) if s.len() == 5));
    }

    #[test]
    fn paused_selects_waiting_jobs_once() {
        let states = parse_states(Some("paused, waiting,failed"));
        assert!(matches!(
            states,
            Ok(s) if s == vec![JobState::Waiting, JobState::Failed]
        ));
        assert!(matches!(
            parse_states(Some("done")),
            Err(QueueError::InvalidState(s)) if s == "done"
        ));
    }

    #[test]
    fn task_counts_are_nested_by_type_and_status() {
        let grouped = group_task_counts(vec![
            TaskStatusCount {
                task_type: TaskType::FileProcessing,
                status: TaskStatus::Pending,
                count: 2,
            },
            TaskStatusCount {
                task_type: TaskType::FileProcessing,
                status: TaskStatus::Completed,
                count: 5,
            },
        ]);
        let inner = grouped.get("file_processing");
        assert_eq!(inner.and_then(|m| m.get("pending")), Some(&2));
        assert_eq!(inner.and_then(|m| m.get("completed")), Some(&5));
        assert_eq!(grouped.len(), 1);
    }
}
