use crate::api::auth::error::AuthError;
use crate::api::auth::interfaces::AuthClaims;
use crate::database::app_user::User;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

/// Creates a signed HS256 access token for `user`, valid for `expiry_hours`.
///
/// # Errors
///
/// * `jsonwebtoken::Error` if token encoding fails.
pub fn create_access_token(
    jwt_secret: &str,
    user: &User,
    expiry_hours: i64,
) -> Result<String, AuthError> {
    let exp = (Utc::now() + Duration::hours(expiry_hours)).timestamp();
    let claims = AuthClaims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
        exp,
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_ref()),
    )?)
}

/// Validates signature and expiry of an access token.
///
/// # Errors
///
/// * `AuthError::TokenExpired` when the token is past its `exp`.
/// * `AuthError::InvalidToken` for any other decoding failure.
pub fn decode_access_token(token: &str, jwt_secret: &str) -> Result<AuthClaims, AuthError> {
    decode::<AuthClaims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })
}
