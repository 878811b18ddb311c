use crate::database::DbError;
use crate::database::tables::note::NoteWithFile;
use chrono::{DateTime, Utc};
use common_types::file_status::FileStatus;
use common_types::task_status::{TaskStatus, TaskType};
use serde::Serialize;
use sqlx::{Executor, FromRow, Postgres, QueryBuilder};
use utoipa::ToSchema;

/// Filters for file listings. `user_id` restricts to one owner, the rest are optional.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    pub user_id: Option<i32>,
    pub status: Option<FileStatus>,
    /// Only files with at least one note of this type.
    pub note_type: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

/// Filters for note listings and exports, applied to the note's creation time.
#[derive(Debug, Clone, Default)]
pub struct NoteFilter {
    pub note_type: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

/// A file with its owner and task, as shown on listings.
#[derive(Debug, Clone, FromRow)]
pub struct FileReportRow {
    pub id: i32,
    pub filename: String,
    pub original_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub status: FileStatus,
    pub user_id: Option<i32>,
    pub user_email: Option<String>,
    pub task_status: Option<TaskStatus>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct FileStats {
    pub total_files: i64,
    pub processed_files: i64,
    pub failed_files: i64,
    pub pending_files: i64,
    pub total_size_bytes: i64,
}

#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct NoteStats {
    pub total_notes: i64,
    pub soap_notes: i64,
    pub summary_notes: i64,
    pub general_notes: i64,
}

#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct UserStats {
    pub total_users: i64,
    pub admin_users: i64,
    pub regular_users: i64,
}

#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct TaskStats {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub failed_tasks: i64,
    pub pending_tasks: i64,
}

/// Number of tasks of one type in one status.
#[derive(Debug, Clone, FromRow)]
pub struct TaskStatusCount {
    pub task_type: TaskType,
    pub status: TaskStatus,
    pub count: i64,
}

const FILE_REPORT_SELECT: &str = r"
    SELECT f.id, f.filename, f.original_name, f.file_size, f.file_type, f.status,
           f.user_id, u.email AS user_email, t.status AS task_status, t.error_message,
           f.created_at
    FROM uploaded_file f
    LEFT JOIN app_user u ON u.id = f.user_id
    LEFT JOIN task t ON t.file_id = f.id AND t.task_type = 'file_processing'
    WHERE 1 = 1";

const NOTE_REPORT_SELECT: &str = r"
    SELECT n.id, n.note_type, n.content, n.status, n.retention_date, n.created_at,
           f.id AS file_id, f.filename, f.original_name, f.file_size, f.file_type,
           n.user_id, u.email AS user_email
    FROM note n
    JOIN uploaded_file f ON f.id = n.file_id
    LEFT JOIN app_user u ON u.id = n.user_id
    WHERE 1 = 1";

fn push_file_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &FileFilter) {
    if let Some(user_id) = filter.user_id {
        builder.push(" AND f.user_id = ").push_bind(user_id);
    }
    if let Some(status) = filter.status {
        builder.push(" AND f.status = ").push_bind(status);
    }
    if let Some(note_type) = &filter.note_type {
        builder
            .push(" AND EXISTS (SELECT 1 FROM note n WHERE n.file_id = f.id AND n.note_type = ")
            .push_bind(note_type.clone())
            .push(")");
    }
    if let Some(date_from) = filter.date_from {
        builder.push(" AND f.created_at >= ").push_bind(date_from);
    }
    if let Some(date_to) = filter.date_to {
        builder.push(" AND f.created_at <= ").push_bind(date_to);
    }
}

fn push_note_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &NoteFilter) {
    if let Some(note_type) = &filter.note_type {
        builder.push(" AND n.note_type = ").push_bind(note_type.clone());
    }
    if let Some(date_from) = filter.date_from {
        builder.push(" AND n.created_at >= ").push_bind(date_from);
    }
    if let Some(date_to) = filter.date_to {
        builder.push(" AND n.created_at <= ").push_bind(date_to);
    }
}

pub struct ReportStore;

impl ReportStore {
    pub async fn count_files(
        executor: impl Executor<'_, Database = Postgres>,
        filter: &FileFilter,
    ) -> Result<i64, DbError> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM uploaded_file f WHERE 1 = 1");
        push_file_filters(&mut builder, filter);
        Ok(builder
            .build_query_scalar::<i64>()
            .fetch_one(executor)
            .await?)
    }

    /// One page of files, newest first.
    pub async fn list_files(
        executor: impl Executor<'_, Database = Postgres>,
        filter: &FileFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FileReportRow>, DbError> {
        let mut builder = QueryBuilder::<Postgres>::new(FILE_REPORT_SELECT);
        push_file_filters(&mut builder, filter);
        builder
            .push(" ORDER BY f.created_at DESC, f.id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        Ok(builder
            .build_query_as::<FileReportRow>()
            .fetch_all(executor)
            .await?)
    }

    pub async fn count_notes(
        executor: impl Executor<'_, Database = Postgres>,
        filter: &NoteFilter,
    ) -> Result<i64, DbError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM note n WHERE 1 = 1");
        push_note_filters(&mut builder, filter);
        Ok(builder
            .build_query_scalar::<i64>()
            .fetch_one(executor)
            .await?)
    }

    /// Notes with their file and owner, newest first. Without `limit` every match is returned.
    pub async fn list_notes(
        executor: impl Executor<'_, Database = Postgres>,
        filter: &NoteFilter,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<NoteWithFile>, DbError> {
        let mut builder = QueryBuilder::<Postgres>::new(NOTE_REPORT_SELECT);
        push_note_filters(&mut builder, filter);
        builder.push(" ORDER BY n.created_at DESC, n.id DESC");
        if let Some(limit) = limit {
            builder
                .push(" LIMIT ")
                .push_bind(limit)
                .push(" OFFSET ")
                .push_bind(offset);
        }
        Ok(builder
            .build_query_as::<NoteWithFile>()
            .fetch_all(executor)
            .await?)
    }

    pub async fn file_stats(
        executor: impl Executor<'_, Database = Postgres>,
    ) -> Result<FileStats, DbError> {
        Ok(sqlx::query_as::<_, FileStats>(
            r"
            SELECT COUNT(*)                                     AS total_files,
                   COUNT(*) FILTER (WHERE status = 'processed') AS processed_files,
                   COUNT(*) FILTER (WHERE status = 'failed')    AS failed_files,
                   COUNT(*) FILTER (WHERE status = 'uploaded')  AS pending_files,
                   COALESCE(SUM(file_size), 0)::BIGINT          AS total_size_bytes
            FROM uploaded_file
            ",
        )
        .fetch_one(executor)
        .await?)
    }

    pub async fn note_stats(
        executor: impl Executor<'_, Database = Postgres>,
    ) -> Result<NoteStats, DbError> {
        Ok(sqlx::query_as::<_, NoteStats>(
            r"
            SELECT COUNT(*)                                     AS total_notes,
                   COUNT(*) FILTER (WHERE note_type = 'soap')    AS soap_notes,
                   COUNT(*) FILTER (WHERE note_type = 'summary') AS summary_notes,
                   COUNT(*) FILTER (WHERE note_type = 'general') AS general_notes
            FROM note
            ",
        )
        .fetch_one(executor)
        .await?)
    }

    pub async fn user_stats(
        executor: impl Executor<'_, Database = Postgres>,
    ) -> Result<UserStats, DbError> {
        Ok(sqlx::query_as::<_, UserStats>(
            r"
            SELECT COUNT(*)                              AS total_users,
                   COUNT(*) FILTER (WHERE role = 'admin') AS admin_users,
                   COUNT(*) FILTER (WHERE role = 'user')  AS regular_users
            FROM app_user
            ",
        )
        .fetch_one(executor)
        .await?)
    }

    pub async fn task_stats(
        executor: impl Executor<'_, Database = Postgres>,
    ) -> Result<TaskStats, DbError> {
        Ok(sqlx::query_as::<_, TaskStats>(
            r"
            SELECT COUNT(*)                                     AS total_tasks,
                   COUNT(*) FILTER (WHERE status = 'completed') AS completed_tasks,
                   COUNT(*) FILTER (WHERE status = 'failed')    AS failed_tasks,
                   COUNT(*) FILTER (WHERE status = 'pending')   AS pending_tasks
            FROM task
            ",
        )
        .fetch_one(executor)
        .await?)
    }

    pub async fn task_status_counts(
        executor: impl Executor<'_, Database = Postgres>,
    ) -> Result<Vec<TaskStatusCount>, DbError> {
        Ok(sqlx::query_as::<_, TaskStatusCount>(
            r"
            SELECT task_type, status, COUNT(*) AS count
            FROM task
            GROUP BY task_type, status
            ORDER BY task_type, status
            ",
        )
        .fetch_all(executor)
        .await?)
    }
}
