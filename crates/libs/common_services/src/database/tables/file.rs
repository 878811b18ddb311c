use chrono::{DateTime, Utc};
use common_types::file_status::FileStatus;
use common_types::task_status::TaskStatus;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// A row of `uploaded_file`.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub id: i32,
    pub filename: String,
    pub original_name: String,
    #[serde(skip)]
    pub file_path: String,
    pub file_size: i64,
    pub file_type: String,
    pub user_id: Option<i32>,
    pub status: FileStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values needed to insert a freshly staged upload.
#[derive(Debug, Clone)]
pub struct NewUploadedFile {
    pub filename: String,
    pub original_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub file_type: String,
    pub user_id: Option<i32>,
}

/// A file joined with the status and error of its processing task.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileWithTask {
    pub id: i32,
    pub filename: String,
    pub original_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub user_id: Option<i32>,
    pub status: FileStatus,
    pub task_status: Option<TaskStatus>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}
