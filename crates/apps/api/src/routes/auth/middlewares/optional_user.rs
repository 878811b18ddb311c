use crate::api_state::ApiContext;
use crate::auth::middlewares::common::{extract_context, extract_token, user_from_token};
use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
};
use common_services::api::auth::error::AuthError;
use common_services::database::app_user::User;

/// The caller, if a token was sent. A token that is sent must be valid.
#[derive(Clone, Debug)]
pub struct OptionalUser(pub Option<User>);

impl OptionalUser {
    #[must_use]
    pub fn id(&self) -> Option<i32> {
        self.0.as_ref().map(|user| user.id)
    }
}

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
    State<ApiContext>: FromRequestParts<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match extract_token(parts) {
            Ok(token) => {
                let context = extract_context(parts, state).await?;
                let user = user_from_token(&context, &token).await?;
                parts.extensions.insert(Self(Some(user.clone())));
                Ok(Self(Some(user)))
            }
            Err(AuthError::MissingToken) => {
                parts.extensions.insert(Self(None));
                Ok(Self(None))
            }
            Err(e) => Err(e),
        }
    }
}
