use chrono::{DateTime, NaiveDate, Utc};
use common_types::note::NoteStatus;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// A row of `note`. `content` holds the JSON text sent by the generator.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i32,
    pub file_id: i32,
    pub user_id: Option<i32>,
    pub note_type: String,
    pub content: String,
    pub status: NoteStatus,
    pub retention_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A note joined with its file and owner, as listed and exported by admins.
#[derive(Debug, Clone, FromRow)]
pub struct NoteWithFile {
    pub id: i32,
    pub note_type: String,
    pub content: String,
    pub status: NoteStatus,
    pub retention_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub file_id: i32,
    pub filename: String,
    pub original_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub user_id: Option<i32>,
    pub user_email: Option<String>,
}
