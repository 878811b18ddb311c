//! This module defines the HTTP handlers for authentication-related routes.

use crate::api_state::ApiContext;
use axum::{Extension, Json, extract::State, http::StatusCode};
use common_services::api::auth::error::AuthError;
use common_services::api::auth::interfaces::{
    Credentials, LoginResponse, RegisterResponse, UserSummary, VerifiedUser, VerifyResponse,
};
use common_services::api::auth::service::{change_password as update_password, register_user};
use common_services::api::common::MessageResponse;
use common_services::database::app_user::User;
use tracing::instrument;

/// Handles user login and returns an access token.
///
/// # Errors
///
/// Returns `AuthError` if the input is malformed or the credentials are invalid.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = Credentials,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[instrument(skip(context, payload), err(Debug))]
pub async fn login(
    State(context): State<ApiContext>,
    Json(payload): Json<Credentials>,
) -> Result<Json<LoginResponse>, AuthError> {
    let response = common_services::api::auth::service::login(
        &context.pool,
        &context.settings.secrets.jwt,
        context.settings.auth.token_expiry_hours,
        &payload,
    )
    .await?;
    Ok(Json(response))
}

/// Handles the registration of a new user.
///
/// # Errors
///
/// Returns `AuthError` if a user with the provided email already exists or
/// if a database error occurs during user creation.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = Credentials,
    responses(
        (status = 201, description = "User created successfully", body = RegisterResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "User with this email already exists"),
    )
)]
#[instrument(skip(context, payload), err(Debug))]
pub async fn register(
    State(context): State<ApiContext>,
    Json(payload): Json<Credentials>,
) -> Result<(StatusCode, Json<RegisterResponse>), AuthError> {
    let user = register_user(&context.pool, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_owned(),
            user: UserSummary {
                id: user.id,
                email: user.email,
                role: user.role,
            },
        }),
    ))
}

/// Checks the bearer token and returns the user it belongs to.
#[utoipa::path(
    get,
    path = "/api/auth/verify",
    tag = "Auth",
    responses(
        (status = 200, description = "Token is valid", body = VerifyResponse),
        (status = 401, description = "Missing, invalid or expired token"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn verify(Extension(user): Extension<User>) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        valid: true,
        user: VerifiedUser {
            id: user.id,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        },
    })
}

/// Sets a new password for an account. Admin only.
///
/// # Errors
///
/// Returns `AuthError` if the input is malformed or the account does not exist.
#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    tag = "Auth",
    request_body = Credentials,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
#[instrument(skip(context, payload), err(Debug))]
pub async fn change_password(
    State(context): State<ApiContext>,
    Json(payload): Json<Credentials>,
) -> Result<Json<MessageResponse>, AuthError> {
    update_password(&context.pool, &payload).await?;
    Ok(Json(MessageResponse::new("Password updated successfully")))
}

/// Tokens are stateless, so logging out only tells the client to drop its token.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Logout successful", body = MessageResponse),
    )
)]
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse::new("Logout successful"))
}
