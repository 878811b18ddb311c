use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Note type used when the webhook caller does not send one.
pub const DEFAULT_NOTE_TYPE: &str = "general";

/// Maps to the `note_status` Postgres enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "note_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NoteStatus {
    Generated,
}
