use crate::api::common::Pagination;
use chrono::{DateTime, NaiveDate, Utc};
use common_types::file_status::FileStatus;
use common_types::note::NoteStatus;
use common_types::task_status::TaskStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

/// A file id sent either as a JSON number or as a string.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum FlexibleId {
    Number(i64),
    Text(String),
}

/// Callback sent by the note generator.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    #[serde(default)]
    pub file_id: Option<FlexibleId>,
    /// Generated notes, stored as their JSON text.
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub notes: Option<Value>,
    #[serde(default)]
    pub note_type: Option<String>,
    /// `success` or `error`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A note as returned to its owner. `content` is the parsed JSON when possible.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteView {
    pub id: i32,
    #[serde(rename = "type")]
    pub note_type: String,
    #[schema(value_type = Object)]
    pub content: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileDetails {
    pub id: i32,
    pub filename: String,
    pub original_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub status: FileStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FileNotesResponse {
    pub file: FileDetails,
    pub notes: Vec<NoteView>,
}

/// A file on a listing, with its task state and notes.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileListing {
    pub id: i32,
    pub filename: String,
    pub original_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub status: FileStatus,
    pub user_email: Option<String>,
    pub task_status: Option<TaskStatus>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub notes: Vec<NoteView>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct UserNotesParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<FileStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserFilesResponse {
    pub files: Vec<FileListing>,
    pub pagination: Pagination,
}

/// A rendered text attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDownload {
    pub filename: String,
    pub body: String,
}

/// Note row as listed to admins.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminNoteView {
    pub id: i32,
    #[serde(rename = "type")]
    pub note_type: String,
    #[schema(value_type = Object)]
    pub content: Value,
    pub status: NoteStatus,
    pub created_at: DateTime<Utc>,
    pub retention_date: NaiveDate,
    pub file: AdminNoteFile,
    pub user: AdminNoteUser,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminNoteFile {
    pub id: i32,
    pub original_name: String,
    pub file_size: i64,
    pub file_type: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminNoteUser {
    pub id: Option<i32>,
    pub email: Option<String>,
}
