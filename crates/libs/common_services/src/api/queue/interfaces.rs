use crate::api::common::Pagination;
use crate::job_queue::{JobCounts, JobView};
use chrono::{DateTime, Utc};
use common_types::queue::QueueName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

/// Counts and recent jobs of one queue.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueOverview {
    pub counts: JobCounts,
    /// Active, waiting and delayed jobs, newest first.
    pub recent_jobs: Vec<JobView>,
    pub failed_jobs: Vec<JobView>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatusResponse {
    pub file_processing_queue: QueueOverview,
    pub note_generation_queue: QueueOverview,
    pub file_forwarding_queue: QueueOverview,
    /// Task counts keyed by task type, then status.
    pub database_tasks: BTreeMap<String, BTreeMap<String, i64>>,
    pub timestamp: DateTime<Utc>,
}

/// Query of `GET /api/queue/{queueName}/jobs`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct JobListParams {
    /// Comma-separated states (`waiting,active,completed,failed,delayed,paused`). All when absent.
    pub state: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JobListResponse {
    pub queue: QueueName,
    pub jobs: Vec<JobView>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JobResponse {
    pub job: JobView,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClearJobsResponse {
    pub message: String,
    pub cleared_count: u64,
}
