use crate::database::DbError;
use crate::database::tables::note::{Note, NoteWithFile};
use sqlx::{Executor, Postgres};

pub struct NoteStore;

impl NoteStore {
    /// Inserts a generated note that expires `retention_days` from today.
    pub async fn create(
        executor: impl Executor<'_, Database = Postgres>,
        file_id: i32,
        user_id: Option<i32>,
        note_type: &str,
        content: &str,
        retention_days: i32,
    ) -> Result<Note, DbError> {
        Ok(sqlx::query_as::<_, Note>(
            r"
            INSERT INTO note (file_id, user_id, note_type, content, retention_date)
            VALUES ($1, $2, $3, $4, CURRENT_DATE + $5::int)
            RETURNING *
            ",
        )
        .bind(file_id)
        .bind(user_id)
        .bind(note_type)
        .bind(content)
        .bind(retention_days)
        .fetch_one(executor)
        .await?)
    }

    pub async fn find_by_id(
        executor: impl Executor<'_, Database = Postgres>,
        id: i32,
    ) -> Result<Option<Note>, DbError> {
        Ok(sqlx::query_as::<_, Note>("SELECT * FROM note WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?)
    }

    /// Notes of a file, newest first.
    pub async fn list_for_file(
        executor: impl Executor<'_, Database = Postgres>,
        file_id: i32,
    ) -> Result<Vec<Note>, DbError> {
        Ok(sqlx::query_as::<_, Note>(
            "SELECT * FROM note WHERE file_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(file_id)
        .fetch_all(executor)
        .await?)
    }

    /// Notes of several files at once, newest first.
    pub async fn list_for_files(
        executor: impl Executor<'_, Database = Postgres>,
        file_ids: &[i32],
    ) -> Result<Vec<Note>, DbError> {
        Ok(sqlx::query_as::<_, Note>(
            "SELECT * FROM note WHERE file_id = ANY($1) ORDER BY created_at DESC, id DESC",
        )
        .bind(file_ids)
        .fetch_all(executor)
        .await?)
    }

    /// A note together with its file, if that file belongs to `user_id`.
    pub async fn find_owned_with_file(
        executor: impl Executor<'_, Database = Postgres>,
        id: i32,
        user_id: i32,
    ) -> Result<Option<NoteWithFile>, DbError> {
        Ok(sqlx::query_as::<_, NoteWithFile>(
            r"
            SELECT n.id, n.note_type, n.content, n.status, n.retention_date, n.created_at,
                   f.id AS file_id, f.filename, f.original_name, f.file_size, f.file_type,
                   n.user_id, u.email AS user_email
            FROM note n
            JOIN uploaded_file f ON f.id = n.file_id
            LEFT JOIN app_user u ON u.id = n.user_id
            WHERE n.id = $1 AND f.user_id = $2
            ",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?)
    }

    /// Sets `retention_date` to today plus `retention_days`. Returns whether the note exists.
    pub async fn update_retention(
        executor: impl Executor<'_, Database = Postgres>,
        id: i32,
        retention_days: i32,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r"
            UPDATE note
            SET retention_date = CURRENT_DATE + $2::int, updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(retention_days)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Hard-deletes notes whose retention date lies strictly before today.
    pub async fn delete_expired(
        executor: impl Executor<'_, Database = Postgres>,
    ) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM note WHERE retention_date < CURRENT_DATE")
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_for_file(
        executor: impl Executor<'_, Database = Postgres>,
        file_id: i32,
    ) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM note WHERE file_id = $1")
            .bind(file_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
