use crate::database::DbError;
use crate::database::tables::file::{FileWithTask, NewUploadedFile, UploadedFile};
use sqlx::{Executor, Postgres};

pub struct FileStore;

impl FileStore {
    /// Inserts an uploaded file with status `uploaded`.
    pub async fn create(
        executor: impl Executor<'_, Database = Postgres>,
        file: &NewUploadedFile,
    ) -> Result<UploadedFile, DbError> {
        Ok(sqlx::query_as::<_, UploadedFile>(
            r"
            INSERT INTO uploaded_file (filename, original_name, file_path, file_size, file_type, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            ",
        )
        .bind(&file.filename)
        .bind(&file.original_name)
        .bind(&file.file_path)
        .bind(file.file_size)
        .bind(&file.file_type)
        .bind(file.user_id)
        .fetch_one(executor)
        .await?)
    }

    pub async fn find_by_id(
        executor: impl Executor<'_, Database = Postgres>,
        id: i32,
    ) -> Result<Option<UploadedFile>, DbError> {
        Ok(
            sqlx::query_as::<_, UploadedFile>("SELECT * FROM uploaded_file WHERE id = $1")
                .bind(id)
                .fetch_optional(executor)
                .await?,
        )
    }

    /// Finds a file visible to `user_id`. Anonymous callers (`None`) only see anonymous files.
    pub async fn find_owned(
        executor: impl Executor<'_, Database = Postgres>,
        id: i32,
        user_id: Option<i32>,
    ) -> Result<Option<UploadedFile>, DbError> {
        Ok(sqlx::query_as::<_, UploadedFile>(
            "SELECT * FROM uploaded_file WHERE id = $1 AND user_id IS NOT DISTINCT FROM $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?)
    }

    /// Like [`Self::find_owned`], joined with the processing task.
    pub async fn find_owned_with_task(
        executor: impl Executor<'_, Database = Postgres>,
        id: i32,
        user_id: Option<i32>,
    ) -> Result<Option<FileWithTask>, DbError> {
        Ok(sqlx::query_as::<_, FileWithTask>(
            r"
            SELECT f.id, f.filename, f.original_name, f.file_size, f.file_type, f.user_id,
                   f.status, t.status AS task_status, t.error_message, f.created_at
            FROM uploaded_file f
            LEFT JOIN task t ON t.file_id = f.id AND t.task_type = 'file_processing'
            WHERE f.id = $1 AND f.user_id IS NOT DISTINCT FROM $2
            ",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?)
    }

    pub async fn delete(
        executor: impl Executor<'_, Database = Postgres>,
        id: i32,
    ) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM uploaded_file WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
