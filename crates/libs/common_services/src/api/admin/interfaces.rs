use crate::api::common::Pagination;
use crate::api::notes::interfaces::{AdminNoteView, FileListing};
use crate::database::report_store::{FileStats, NoteStats, TaskStats, UserStats};
use chrono::{DateTime, Utc};
use common_types::file_status::FileStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

/// Query of `GET /api/admin/dashboard`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DashboardParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<FileStatus>,
    pub note_type: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`.
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// Query of the admin note listing and export.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct NoteListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub note_type: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub files: Vec<FileListing>,
    pub stats: FileStats,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminNotesResponse {
    pub notes: Vec<AdminNoteView>,
    pub pagination: Pagination,
}

/// Body of `PUT /api/admin/notes/{noteId}/retention`. Accepts a number or a numeric string.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RetentionUpdate {
    #[serde(default)]
    #[schema(value_type = Option<i32>)]
    pub retention_days: Option<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteExpiredResponse {
    pub message: String,
    pub deleted_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub files: FileStats,
    pub notes: NoteStats,
    pub users: UserStats,
    pub tasks: TaskStats,
    pub timestamp: DateTime<Utc>,
}
