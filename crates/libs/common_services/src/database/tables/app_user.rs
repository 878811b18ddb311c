use chrono::{DateTime, Utc};
pub use common_types::app_user::UserRole;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Represents a user in the application.
#[derive(Debug, Serialize, FromRow, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Represents a user record from db, including the password hash.
#[derive(Debug, FromRow)]
pub struct UserWithPassword {
    pub id: i32,
    pub email: String,
    pub role: UserRole,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserWithPassword> for User {
    fn from(user: UserWithPassword) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
