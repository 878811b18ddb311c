use crate::api_state::ApiContext;
use axum::extract::{FromRequestParts, State};
use color_eyre::eyre::eyre;
use common_services::api::auth::error::AuthError;
use common_services::api::auth::interfaces::AuthClaims;
use common_services::api::auth::token::decode_access_token;
use common_services::database::app_user::User;
use common_services::database::user_store::UserStore;
use http::header;
use http::request::Parts;

pub async fn extract_context<S>(parts: &mut Parts, state: &S) -> Result<ApiContext, AuthError>
where
    S: Send + Sync,
    State<ApiContext>: FromRequestParts<S>,
{
    match State::<ApiContext>::from_request_parts(parts, state).await {
        Ok(State(context)) => Ok(context),
        Err(_e) => Err(AuthError::Internal(eyre!(
            "Server state is not configured correctly."
        ))),
    }
}

/// Get auth token from Authorization Header.
pub fn extract_token(parts: &Parts) -> Result<String, AuthError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToOwned::to_owned)
        .ok_or(AuthError::InvalidToken)
}

pub fn decode_token(token: &str, jwt_secret: &str) -> Result<AuthClaims, AuthError> {
    decode_access_token(token, jwt_secret)
}

/// Resolves the user a token was issued to. Deleted users invalidate their tokens.
pub async fn user_from_token(context: &ApiContext, token: &str) -> Result<User, AuthError> {
    let claims = decode_token(token, &context.settings.secrets.jwt)?;
    UserStore::find_by_id(&context.pool, claims.sub)
        .await?
        .ok_or(AuthError::UserNotFound)
}
