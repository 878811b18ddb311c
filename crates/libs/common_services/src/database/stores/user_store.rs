use crate::database::DbError;
use crate::database::tables::app_user::{User, UserRole, UserWithPassword};
use sqlx::{Executor, Postgres};

pub struct UserStore;

impl UserStore {
    /// Creates a new user.
    pub async fn create(
        executor: impl Executor<'_, Database = Postgres>,
        email: &str,
        hashed_password: &str,
        role: UserRole,
    ) -> Result<User, DbError> {
        Ok(sqlx::query_as::<_, User>(
            r"
            INSERT INTO app_user (email, password, role)
            VALUES ($1, $2, $3)
            RETURNING id, email, role, created_at, updated_at
            ",
        )
        .bind(email)
        .bind(hashed_password)
        .bind(role)
        .fetch_one(executor)
        .await?)
    }

    /// Inserts the user unless the email is already taken. Returns whether a row was created.
    pub async fn create_if_missing(
        executor: impl Executor<'_, Database = Postgres>,
        email: &str,
        hashed_password: &str,
        role: UserRole,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r"
            INSERT INTO app_user (email, password, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO NOTHING
            ",
        )
        .bind(email)
        .bind(hashed_password)
        .bind(role)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_by_id(
        executor: impl Executor<'_, Database = Postgres>,
        id: i32,
    ) -> Result<Option<User>, DbError> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT id, email, role, created_at, updated_at FROM app_user WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?)
    }

    pub async fn find_by_email_with_password(
        executor: impl Executor<'_, Database = Postgres>,
        email: &str,
    ) -> Result<Option<UserWithPassword>, DbError> {
        Ok(sqlx::query_as::<_, UserWithPassword>(
            r"
            SELECT id, email, role, password, created_at, updated_at
            FROM app_user
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(executor)
        .await?)
    }

    pub async fn find_email(
        executor: impl Executor<'_, Database = Postgres>,
        id: i32,
    ) -> Result<Option<String>, DbError> {
        Ok(
            sqlx::query_scalar::<_, String>("SELECT email FROM app_user WHERE id = $1")
                .bind(id)
                .fetch_optional(executor)
                .await?,
        )
    }

    /// Bumps `updated_at`, used as the last-login marker.
    pub async fn touch(
        executor: impl Executor<'_, Database = Postgres>,
        id: i32,
    ) -> Result<(), DbError> {
        sqlx::query("UPDATE app_user SET updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Replaces the password hash of the user with this email. Returns whether the user exists.
    pub async fn update_password(
        executor: impl Executor<'_, Database = Postgres>,
        email: &str,
        hashed_password: &str,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE app_user SET password = $1, updated_at = now() WHERE email = $2",
        )
        .bind(hashed_password)
        .bind(email)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
