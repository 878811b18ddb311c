use crate::api::common::{MessageResponse, PageParams, Pagination};
use crate::api::notes::error::NotesError;
use crate::api::notes::interfaces::{
    FileDetails, FileListing, FileNotesResponse, FlexibleId, NoteView, TextDownload,
    UserFilesResponse, UserNotesParams, WebhookPayload,
};
use crate::api::notes::render::{note_download_filename, parse_note_content, render_note_document};
use crate::database::DbError;
use crate::database::file::UploadedFile;
use crate::database::file_store::FileStore;
use crate::database::note::Note;
use crate::database::note_store::NoteStore;
use crate::database::report_store::{FileFilter, FileReportRow, ReportStore};
use crate::database::transitions::transition_file_and_task;
use crate::job_queue::enqueue_job;
use app_state::AppSettings;
use common_types::NotifyAdminPayload;
use common_types::file_status::FileStatus;
use common_types::note::DEFAULT_NOTE_TYPE;
use common_types::queue::{JobName, QueueName};
use common_types::task_status::TaskStatus;
use serde_json::Value;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{debug, info, warn};

pub const WEBHOOK_ACK: &str = "Webhook processed successfully";
pub const DEFAULT_NOTE_ERROR: &str = "Note generation failed";
const USER_FILES_PAGE_SIZE: i64 = 10;

impl FlexibleId {
    /// Resolves the id. Absent-looking values (`0`, `""`) count as missing,
    /// anything else that is not a valid id cannot match a file.
    pub fn file_id(&self) -> Result<i32, NotesError> {
        match self {
            Self::Number(0) => Err(NotesError::FileIdRequired),
            Self::Number(n) => i32::try_from(*n).map_err(|_| NotesError::FileNotFound),
            Self::Text(text) if text.trim().is_empty() => Err(NotesError::FileIdRequired),
            Self::Text(text) => text.trim().parse().map_err(|_| NotesError::FileNotFound),
        }
    }
}

/// What a webhook call asks for, decided from its `status` and `notes`.
#[derive(Debug, Clone, PartialEq)]
enum WebhookOutcome {
    Generated { notes: Value, note_type: String },
    Failed { error: String },
    Ignored,
}

fn classify_webhook(payload: &WebhookPayload) -> WebhookOutcome {
    match payload.status.as_deref() {
        Some("success") => match &payload.notes {
            Some(notes) if has_content(notes) => WebhookOutcome::Generated {
                notes: notes.clone(),
                note_type: payload
                    .note_type
                    .clone()
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_NOTE_TYPE.to_owned()),
            },
            _ => WebhookOutcome::Ignored,
        },
        Some("error") => WebhookOutcome::Failed {
            error: payload
                .error
                .clone()
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| DEFAULT_NOTE_ERROR.to_owned()),
        },
        _ => WebhookOutcome::Ignored,
    }
}

/// Whether a `notes` value carries anything. `null`, `false`, `0` and `""` do
/// not; empty objects and arrays do.
fn has_content(notes: &Value) -> bool {
    match notes {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text stored in `note.content`: the notes as received, in compact JSON with
/// key order kept.
fn note_content(notes: &Value) -> serde_json::Result<String> {
    serde_json::to_string(notes)
}

/// Handles a callback from the note generator.
///
/// Only a missing or unknown file is reported back. Every other outcome,
/// including a rejected status change, is acknowledged.
pub async fn process_webhook(
    pool: &PgPool,
    settings: &AppSettings,
    payload: WebhookPayload,
) -> Result<MessageResponse, NotesError> {
    let file_id = payload
        .file_id
        .as_ref()
        .ok_or(NotesError::FileIdRequired)?
        .file_id()?;
    let file = FileStore::find_by_id(pool, file_id)
        .await?
        .ok_or(NotesError::FileNotFound)?;
    info!(
        "📨 Webhook for file {} with status {:?}",
        file.id, payload.status
    );

    let outcome = match classify_webhook(&payload) {
        WebhookOutcome::Generated { notes, note_type } => {
            store_generated_notes(pool, settings, &file, &notes, &note_type).await
        }
        WebhookOutcome::Failed { error } => mark_generation_failed(pool, file.id, &error).await,
        WebhookOutcome::Ignored => {
            debug!("Ignoring webhook for file {} without actionable status", file.id);
            Ok(())
        }
    };

    match outcome {
        Ok(()) => {}
        Err(e) if e.is_illegal_transition() || e.is_not_found() => {
            warn!("Webhook for file {} rejected: {e}", file.id);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(MessageResponse::new(WEBHOOK_ACK))
}

async fn store_generated_notes(
    pool: &PgPool,
    settings: &AppSettings,
    file: &UploadedFile,
    notes: &Value,
    note_type: &str,
) -> Result<(), DbError> {
    let content = note_content(notes)?;

    let mut tx = pool.begin().await?;
    transition_file_and_task(
        &mut *tx,
        file.id,
        FileStatus::Processed,
        TaskStatus::Completed,
        None,
    )
    .await?;
    let note = NoteStore::create(
        &mut *tx,
        file.id,
        file.user_id,
        note_type,
        &content,
        settings.notes.retention_days,
    )
    .await?;
    enqueue_job(&mut *tx, JobName::NotifyAdmin)
        .payload(&NotifyAdminPayload {
            file_id: file.id,
            filename: file.filename.clone(),
            original_name: file.original_name.clone(),
            user_id: file.user_id,
            note_type: note.note_type.clone(),
            note_id: note.id,
        })
        .policy(settings.queue.policy(QueueName::NoteGeneration))
        .call()
        .await?;
    tx.commit().await?;

    info!("📝 Stored {} note {} for file {}", note.note_type, note.id, file.id);
    Ok(())
}

async fn mark_generation_failed(pool: &PgPool, file_id: i32, error: &str) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;
    transition_file_and_task(
        &mut *tx,
        file_id,
        FileStatus::Failed,
        TaskStatus::Failed,
        Some(error),
    )
    .await?;
    tx.commit().await?;

    warn!("Note generation failed for file {file_id}: {error}");
    Ok(())
}

fn note_view(note: Note) -> NoteView {
    NoteView {
        id: note.id,
        note_type: note.note_type,
        content: parse_note_content(&note.content),
        created_at: note.created_at,
    }
}

/// A file of `user_id` with all its notes.
pub async fn file_notes(
    pool: &PgPool,
    file_id: i32,
    user_id: i32,
) -> Result<FileNotesResponse, NotesError> {
    let file = FileStore::find_owned(pool, file_id, Some(user_id))
        .await?
        .ok_or(NotesError::FileNotFound)?;
    let notes = NoteStore::list_for_file(pool, file.id)
        .await?
        .into_iter()
        .map(note_view)
        .collect();

    Ok(FileNotesResponse {
        file: FileDetails {
            id: file.id,
            filename: file.filename,
            original_name: file.original_name,
            file_size: file.file_size,
            file_type: file.file_type,
            status: file.status,
            created_at: file.created_at,
        },
        notes,
    })
}

/// Attaches notes to a page of file rows, keeping the row order.
pub async fn attach_notes(
    pool: &PgPool,
    rows: Vec<FileReportRow>,
) -> Result<Vec<FileListing>, DbError> {
    let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
    let mut by_file: HashMap<i32, Vec<NoteView>> = HashMap::new();
    if !ids.is_empty() {
        for note in NoteStore::list_for_files(pool, &ids).await? {
            by_file.entry(note.file_id).or_default().push(note_view(note));
        }
    }

    Ok(rows
        .into_iter()
        .map(|row| FileListing {
            notes: by_file.remove(&row.id).unwrap_or_default(),
            id: row.id,
            filename: row.filename,
            original_name: row.original_name,
            file_size: row.file_size,
            file_type: row.file_type,
            status: row.status,
            user_email: row.user_email,
            task_status: row.task_status,
            error_message: row.error_message,
            created_at: row.created_at,
        })
        .collect())
}

/// Files of `user_id`, newest first, with their notes.
pub async fn user_files(
    pool: &PgPool,
    user_id: i32,
    params: UserNotesParams,
) -> Result<UserFilesResponse, NotesError> {
    let (page, limit, offset) = PageParams {
        page: params.page,
        limit: params.limit,
    }
    .resolve(USER_FILES_PAGE_SIZE);
    let filter = FileFilter {
        user_id: Some(user_id),
        status: params.status,
        ..FileFilter::default()
    };

    let total = ReportStore::count_files(pool, &filter).await?;
    let rows = ReportStore::list_files(pool, &filter, limit, offset).await?;
    let files = attach_notes(pool, rows).await?;

    Ok(UserFilesResponse {
        files,
        pagination: Pagination::new(page, limit, total),
    })
}

/// Renders one of the caller's notes as a text attachment.
pub async fn download_note(
    pool: &PgPool,
    note_id: i32,
    user_id: i32,
) -> Result<TextDownload, NotesError> {
    let note = NoteStore::find_owned_with_file(pool, note_id, user_id)
        .await?
        .ok_or(NotesError::NoteNotFound)?;

    Ok(TextDownload {
        filename: note_download_filename(note.created_at, &note.note_type, &note.original_name),
        body: render_note_document(&note),
    })
}
