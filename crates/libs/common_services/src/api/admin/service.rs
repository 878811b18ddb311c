use crate::api::admin::error::AdminError;
use crate::api::admin::interfaces::{
    AdminNotesResponse, DashboardParams, DashboardResponse, DeleteExpiredResponse, NoteListParams,
    RetentionUpdate, StatsResponse,
};
use crate::api::common::{MessageResponse, PageParams, Pagination};
use crate::api::notes::interfaces::{AdminNoteFile, AdminNoteUser, AdminNoteView, TextDownload};
use crate::api::notes::render::{parse_note_content, render_notes_export};
use crate::api::notes::service::attach_notes;
use crate::database::note::NoteWithFile;
use crate::database::note_store::NoteStore;
use crate::database::report_store::{FileFilter, NoteFilter, ReportStore};
use crate::utils::parse_date_filter;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;

const DASHBOARD_PAGE_SIZE: i64 = 20;
const NOTES_PAGE_SIZE: i64 = 20;
/// Upper bound on a retention period, about a century.
pub const MAX_RETENTION_DAYS: i32 = 36_500;

fn parse_optional_date(value: Option<&str>) -> Result<Option<DateTime<Utc>>, AdminError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => parse_date_filter(raw)
            .map(Some)
            .ok_or_else(|| AdminError::InvalidDate(raw.to_owned())),
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).cloned()
}

fn note_filter(params: &NoteListParams) -> Result<NoteFilter, AdminError> {
    Ok(NoteFilter {
        note_type: non_empty(params.note_type.as_ref()),
        date_from: parse_optional_date(params.date_from.as_deref())?,
        date_to: parse_optional_date(params.date_to.as_deref())?,
    })
}

/// Files of all users with their notes and overall file statistics.
pub async fn dashboard(
    pool: &PgPool,
    params: &DashboardParams,
) -> Result<DashboardResponse, AdminError> {
    let (page, limit, offset) = PageParams {
        page: params.page,
        limit: params.limit,
    }
    .resolve(DASHBOARD_PAGE_SIZE);
    let filter = FileFilter {
        user_id: None,
        status: params.status,
        note_type: non_empty(params.note_type.as_ref()),
        date_from: parse_optional_date(params.date_from.as_deref())?,
        date_to: parse_optional_date(params.date_to.as_deref())?,
    };

    let total = ReportStore::count_files(pool, &filter).await?;
    let rows = ReportStore::list_files(pool, &filter, limit, offset).await?;
    let files = attach_notes(pool, rows).await?;
    let stats = ReportStore::file_stats(pool).await?;

    Ok(DashboardResponse {
        files,
        stats,
        pagination: Pagination::new(page, limit, total),
    })
}

fn admin_note_view(note: NoteWithFile) -> AdminNoteView {
    AdminNoteView {
        id: note.id,
        content: parse_note_content(&note.content),
        note_type: note.note_type,
        status: note.status,
        created_at: note.created_at,
        retention_date: note.retention_date,
        file: AdminNoteFile {
            id: note.file_id,
            original_name: note.original_name,
            file_size: note.file_size,
            file_type: note.file_type,
        },
        user: AdminNoteUser {
            id: note.user_id,
            email: note.user_email,
        },
    }
}

pub async fn list_notes(
    pool: &PgPool,
    params: &NoteListParams,
) -> Result<AdminNotesResponse, AdminError> {
    let (page, limit, offset) = PageParams {
        page: params.page,
        limit: params.limit,
    }
    .resolve(NOTES_PAGE_SIZE);
    let filter = note_filter(params)?;

    let total = ReportStore::count_notes(pool, &filter).await?;
    let notes = ReportStore::list_notes(pool, &filter, Some(limit), offset)
        .await?
        .into_iter()
        .map(admin_note_view)
        .collect();

    Ok(AdminNotesResponse {
        notes,
        pagination: Pagination::new(page, limit, total),
    })
}

/// Every note matching the filters as one text file.
pub async fn export_notes(
    pool: &PgPool,
    params: &NoteListParams,
) -> Result<TextDownload, AdminError> {
    let filter = note_filter(params)?;
    let notes = ReportStore::list_notes(pool, &filter, None, 0).await?;
    if notes.is_empty() {
        return Err(AdminError::NoNotesFound);
    }

    info!("📦 Exporting {} notes", notes.len());
    Ok(TextDownload {
        filename: format!("admin_notes_{}.txt", Utc::now().format("%Y-%m-%d")),
        body: render_notes_export(&notes),
    })
}

/// Reads `retentionDays` as a whole number in `1..=MAX_RETENTION_DAYS`.
fn parse_retention_days(value: Option<&Value>) -> Option<i32> {
    let days = match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    i32::try_from(days)
        .ok()
        .filter(|d| (1..=MAX_RETENTION_DAYS).contains(d))
}

pub async fn update_retention(
    pool: &PgPool,
    note_id: i32,
    update: &RetentionUpdate,
) -> Result<MessageResponse, AdminError> {
    let days =
        parse_retention_days(update.retention_days.as_ref()).ok_or(AdminError::InvalidRetention)?;
    if !NoteStore::update_retention(pool, note_id, days).await? {
        return Err(AdminError::NoteNotFound);
    }

    info!("Retention of note {note_id} set to {days} days");
    Ok(MessageResponse::new("Retention period updated successfully"))
}

/// Hard-deletes notes past their retention date.
pub async fn delete_expired_notes(pool: &PgPool) -> Result<DeleteExpiredResponse, AdminError> {
    let deleted = NoteStore::delete_expired(pool).await?;
    info!("🧹 Deleted {deleted} expired notes");
    Ok(DeleteExpiredResponse {
        message: format!("Deleted {deleted} expired notes"),
        deleted_count: deleted,
    })
}

pub async fn system_stats(pool: &PgPool) -> Result<StatsResponse, AdminError> {
    let (files, notes, users, tasks) = tokio::try_join!(
        ReportStore::file_stats(pool),
        ReportStore::note_stats(pool),
        ReportStore::user_stats(pool),
        ReportStore::task_stats(pool),
    )?;

    Ok(StatsResponse {
        files,
        notes,
        users,
        tasks,
        timestamp: Utc::now(),
    })
}
