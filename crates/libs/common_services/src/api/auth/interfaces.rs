use chrono::{DateTime, Utc};
use common_types::app_user::UserRole;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Email and password, used for login, registration and password changes.
#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    #[schema(value_type = String, format = "password", example = "my-secret-password")]
    pub password: String,
}

/// Represents the claims contained within a JWT.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct AuthClaims {
    /// User id.
    pub sub: i32,
    pub email: String,
    pub role: UserRole,
    /// Expiration time (unix seconds).
    pub exp: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserSummary {
    pub id: i32,
    pub email: String,
    pub role: UserRole,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserSummary,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedUser {
    pub id: i32,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: VerifiedUser,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserSummary,
}
