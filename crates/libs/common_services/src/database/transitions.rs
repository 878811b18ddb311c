//! Status changes of a file and its processing task.
//!
//! Every change locks the file row first, so concurrent writers (worker, webhook,
//! queue admin) serialize per file, and both rows move together or not at all.

use crate::database::DbError;
use common_types::file_status::FileStatus;
use common_types::task_status::TaskStatus;
use sqlx::PgConnection;
use tracing::debug;

/// Current status of a file and of its processing task, if it has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockedStatus {
    pub file: FileStatus,
    pub task: Option<TaskStatus>,
}

/// Locks the file row and returns its status together with the task status.
pub async fn lock_file_status(
    conn: &mut PgConnection,
    file_id: i32,
) -> Result<LockedStatus, DbError> {
    let row = sqlx::query_as::<_, (FileStatus, Option<TaskStatus>)>(
        r"
        SELECT f.status, t.status
        FROM uploaded_file f
        LEFT JOIN task t ON t.file_id = f.id AND t.task_type = 'file_processing'
        WHERE f.id = $1
        FOR UPDATE OF f
        ",
    )
    .bind(file_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(DbError::NotFound {
        entity: "file",
        id: i64::from(file_id),
    })?;

    Ok(LockedStatus {
        file: row.0,
        task: row.1,
    })
}

/// Validates a file/task pair move. A missing task only constrains the file.
pub fn check_pair(
    file_id: i32,
    current: LockedStatus,
    file_to: FileStatus,
    task_to: TaskStatus,
) -> Result<(), DbError> {
    let file_ok = current.file.can_transition_to(file_to);
    let task_ok = current
        .task
        .is_none_or(|task| task.can_transition_to(task_to));
    if file_ok && task_ok {
        Ok(())
    } else {
        Err(DbError::IllegalTransition {
            file_id,
            file_from: Some(current.file),
            file_to: Some(file_to),
            task_from: current.task,
            task_to: Some(task_to),
        })
    }
}

/// Validates a task-only move. The task must exist.
pub fn check_task(
    file_id: i32,
    current: LockedStatus,
    task_to: TaskStatus,
) -> Result<TaskStatus, DbError> {
    let Some(task_from) = current.task else {
        return Err(DbError::NotFound {
            entity: "task for file",
            id: i64::from(file_id),
        });
    };
    if task_from.can_transition_to(task_to) {
        Ok(task_from)
    } else {
        Err(DbError::IllegalTransition {
            file_id,
            file_from: None,
            file_to: None,
            task_from: Some(task_from),
            task_to: Some(task_to),
        })
    }
}

/// Moves a file and its processing task in one step.
///
/// Fails with [`DbError::IllegalTransition`] if either move is not allowed, in which
/// case neither row is changed, and with [`DbError::NotFound`] if the file is gone.
/// Run inside a transaction so the row lock is held until commit.
pub async fn transition_file_and_task(
    conn: &mut PgConnection,
    file_id: i32,
    file_to: FileStatus,
    task_to: TaskStatus,
    error_message: Option<&str>,
) -> Result<LockedStatus, DbError> {
    let current = lock_file_status(conn, file_id).await?;
    check_pair(file_id, current, file_to, task_to)?;

    sqlx::query("UPDATE uploaded_file SET status = $2, updated_at = now() WHERE id = $1")
        .bind(file_id)
        .bind(file_to)
        .execute(&mut *conn)
        .await?;
    if current.task.is_some() {
        update_task_row(conn, file_id, task_to, error_message).await?;
    }

    debug!(
        "File {file_id}: {} -> {file_to}, task {:?} -> {task_to}",
        current.file, current.task
    );
    Ok(current)
}

/// Moves only the processing task of a file, returning its previous status.
pub async fn transition_task(
    conn: &mut PgConnection,
    file_id: i32,
    task_to: TaskStatus,
    error_message: Option<&str>,
) -> Result<TaskStatus, DbError> {
    let current = lock_file_status(conn, file_id).await?;
    let task_from = check_task(file_id, current, task_to)?;
    update_task_row(conn, file_id, task_to, error_message).await?;

    debug!("File {file_id}: task {task_from} -> {task_to}");
    Ok(task_from)
}

async fn update_task_row(
    conn: &mut PgConnection,
    file_id: i32,
    task_to: TaskStatus,
    error_message: Option<&str>,
) -> Result<(), DbError> {
    let resets = task_to == TaskStatus::Pending;
    sqlx::query(
        r"
        UPDATE task
        SET status        = $2,
            error_message = CASE WHEN $3 THEN $4 WHEN $5 THEN NULL ELSE error_message END,
            attempts      = CASE WHEN $5 THEN 0 WHEN $6 THEN attempts + 1 ELSE attempts END,
            processed_at  = CASE WHEN $7 THEN now() ELSE processed_at END,
            updated_at    = now()
        WHERE file_id = $1 AND task_type = 'file_processing'
        ",
    )
    .bind(file_id)
    .bind(task_to)
    .bind(task_to.records_error())
    .bind(error_message)
    .bind(resets)
    .bind(task_to == TaskStatus::Processing)
    .bind(task_to == TaskStatus::Completed)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
