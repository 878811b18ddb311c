use chrono::{DateTime, Utc};
use common_types::task_status::{TaskStatus, TaskType};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// A row of `task`. Every upload has exactly one `file_processing` task.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i32,
    pub file_id: i32,
    pub user_id: Option<i32>,
    pub task_type: TaskType,
    pub status: TaskStatus,
    pub priority: i32,
    pub attempts: i32,
    pub max_attempts: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}
