use crate::api::error_detail::internal_error_body;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};
use utoipa::ToSchema;

/// One failed input check, reported under `details` on a validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    TokenExpired,
    InvalidCredentials,
    Validation(Vec<FieldError>),
    UserAlreadyExists,
    /// The user referenced by a valid token no longer exists.
    UserNotFound,
    /// An admin addressed an account that does not exist.
    UnknownAccount,
    PermissionDenied { user_email: String, path: String },
    Internal(eyre::Report),
}

fn log_auth_failure(error: &AuthError) {
    match error {
        AuthError::MissingToken => info!("Authentication failed: Missing Authorization token."),
        AuthError::InvalidToken => warn!("Authentication failed: Invalid token provided."),
        AuthError::TokenExpired => info!("Authentication failed: Token expired."),
        AuthError::InvalidCredentials => {
            info!("Authentication failed: Invalid credentials provided.");
        }
        AuthError::Validation(details) => info!("Auth request rejected: {details:?}"),
        AuthError::UserAlreadyExists => info!("Registration failed: User already exists."),
        AuthError::UserNotFound => warn!("Authentication failed: User from token not found."),
        AuthError::UnknownAccount => info!("Password change failed: No such user."),
        AuthError::PermissionDenied { user_email, path } => {
            warn!("Authorization failed: User {user_email} tried to access admin endpoint: {path}");
        }
        AuthError::Internal(e) => {
            error!("Internal server error during authentication: {:?}", e);
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        log_auth_failure(&self);

        let (status, body) = match self {
            Self::MissingToken => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Access token required" }),
            ),
            Self::InvalidToken | Self::UserNotFound => {
                (StatusCode::UNAUTHORIZED, json!({ "error": "Invalid token" }))
            }
            Self::TokenExpired => (StatusCode::UNAUTHORIZED, json!({ "error": "Token expired" })),
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Invalid credentials" }),
            ),
            Self::Validation(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation error", "details": details }),
            ),
            Self::UserAlreadyExists => (
                StatusCode::CONFLICT,
                json!({ "error": "A user with this email already exists" }),
            ),
            Self::UnknownAccount => (StatusCode::NOT_FOUND, json!({ "error": "User not found" })),
            Self::PermissionDenied { .. } => (
                StatusCode::FORBIDDEN,
                json!({ "error": "Admin access required" }),
            ),
            Self::Internal(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                internal_error_body("Internal server error", &e),
            ),
        };

        (status, Json(body)).into_response()
    }
}

// Lets `?` turn database, hashing and token errors into `AuthError::Internal`.
impl<E> From<E> for AuthError
where
    E: Into<eyre::Report>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}
