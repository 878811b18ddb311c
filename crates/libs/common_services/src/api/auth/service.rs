use crate::api::auth::error::{AuthError, FieldError};
use crate::api::auth::hashing::{hash_password, verify_password};
use crate::api::auth::interfaces::{Credentials, LoginResponse, UserSummary};
use crate::api::auth::token::create_access_token;
use crate::database::DbError;
use crate::database::app_user::{User, UserRole};
use crate::database::user_store::UserStore;
use sqlx::PgPool;
use tracing::info;

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Normalizes the email (trimmed, lowercase) and checks both fields.
///
/// # Errors
///
/// * `AuthError::Validation` listing every field that failed.
pub fn validate_credentials(credentials: &Credentials) -> Result<(String, String), AuthError> {
    let email = credentials.email.trim().to_lowercase();
    let mut details = Vec::new();
    if !is_valid_email(&email) {
        details.push(FieldError {
            field: "email",
            message: "A valid email address is required",
        });
    }
    if credentials.password.chars().count() < MIN_PASSWORD_LENGTH {
        details.push(FieldError {
            field: "password",
            message: "Password must be at least 6 characters",
        });
    }
    if details.is_empty() {
        Ok((email, credentials.password.clone()))
    } else {
        Err(AuthError::Validation(details))
    }
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split('.')
            .filter(|label| !label.is_empty())
            .count()
            >= 2
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

/// Authenticates a user based on email and password.
///
/// # Errors
///
/// * `AuthError::InvalidCredentials` if the email or password is incorrect.
/// * `AuthError::Internal` for database or hashing errors.
pub async fn authenticate_user(pool: &PgPool, email: &str, password: &str) -> Result<User, AuthError> {
    let user = UserStore::find_by_email_with_password(pool, email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let valid = verify_password(password.as_bytes(), &user.password)?;
    if !valid {
        return Err(AuthError::InvalidCredentials);
    }

    Ok(user.into())
}

/// Validates credentials, authenticates and issues an access token.
pub async fn login(
    pool: &PgPool,
    jwt_secret: &str,
    token_expiry_hours: i64,
    credentials: &Credentials,
) -> Result<LoginResponse, AuthError> {
    let (email, password) = validate_credentials(credentials)?;
    let user = authenticate_user(pool, &email, &password).await?;
    let token = create_access_token(jwt_secret, &user, token_expiry_hours)?;
    UserStore::touch(pool, user.id).await?;

    info!("User {} logged in", user.email);
    Ok(LoginResponse {
        message: "Login successful".to_owned(),
        user: UserSummary {
            id: user.id,
            email: user.email,
            role: user.role,
        },
        token,
    })
}

/// Creates a regular user account.
///
/// # Errors
///
/// * `AuthError::Validation` for a malformed email or short password.
/// * `AuthError::UserAlreadyExists` if the email is taken.
pub async fn register_user(pool: &PgPool, credentials: &Credentials) -> Result<User, AuthError> {
    let (email, password) = validate_credentials(credentials)?;
    let hashed = hash_password(password.as_bytes())?;
    info!("Creating user email={email}");

    match UserStore::create(pool, &email, &hashed, UserRole::User).await {
        Ok(user) => Ok(user),
        Err(DbError::UniqueViolation(_)) => Err(AuthError::UserAlreadyExists),
        Err(e) => Err(e.into()),
    }
}

/// Sets a new password for the account with the given email.
///
/// # Errors
///
/// * `AuthError::UnknownAccount` if no user has that email.
pub async fn change_password(pool: &PgPool, credentials: &Credentials) -> Result<(), AuthError> {
    let (email, password) = validate_credentials(credentials)?;
    let hashed = hash_password(password.as_bytes())?;
    if !UserStore::update_password(pool, &email, &hashed).await? {
        return Err(AuthError::UnknownAccount);
    }
    info!("Password updated for {email}");
    Ok(())
}

/// Creates the configured admin account if it does not exist yet.
pub async fn ensure_admin_user(
    pool: &PgPool,
    email: &str,
    password: &str,
) -> color_eyre::Result<bool> {
    let email = email.trim().to_lowercase();
    if UserStore::find_by_email_with_password(pool, &email)
        .await?
        .is_some()
    {
        return Ok(false);
    }
    let hashed = hash_password(password.as_bytes())?;
    let created = UserStore::create_if_missing(pool, &email, &hashed, UserRole::Admin).await?;
    if created {
        info!("👑 Admin user {email} created");
    }
    Ok(created)
}
