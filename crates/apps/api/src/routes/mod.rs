pub mod admin;
mod api_doc;
pub mod auth;
pub mod notes;
pub mod queue;
pub mod root;
pub mod upload;

use crate::admin::router::admin_admin_router;
use crate::api_state::ApiContext;
use crate::auth::middlewares::optional_user::OptionalUser;
use crate::auth::middlewares::require_role::require_role;
use crate::auth::middlewares::user::ApiUser;
use crate::auth::router::{
    auth_admin_router, auth_protected_router, auth_public_router, auth_rate_limited_router,
};
use crate::notes::router::{notes_protected_router, notes_public_router};
use crate::queue::router::queue_admin_router;
use crate::root::router::root_public_router;
use crate::routes::api_doc::ApiDoc;
use crate::upload::router::upload_auth_optional_router;
use app_state::RateLimitingSettings;
use axum::Router;
use axum::middleware::{from_extractor_with_state, from_fn_with_state};
use color_eyre::Result;
use common_services::database::app_user::UserRole;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// --- Router Construction ---
pub fn create_router(api_state: ApiContext) -> Result<Router> {
    Ok(Router::new()
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .merge(public_routes(&api_state.settings.api.rate_limiting)?)
        .merge(protected_routes(api_state.clone()))
        .merge(auth_optional_routes(api_state.clone()))
        .merge(admin_routes(api_state.clone()))
        .with_state(api_state))
}

fn public_routes(rate_limiting: &RateLimitingSettings) -> Result<Router<ApiContext>> {
    Ok(Router::new()
        .merge(auth_rate_limited_router(rate_limiting)?)
        .merge(auth_public_router())
        .merge(root_public_router())
        .merge(notes_public_router()))
}

fn auth_optional_routes(api_state: ApiContext) -> Router<ApiContext> {
    Router::new()
        .merge(upload_auth_optional_router())
        .route_layer(from_extractor_with_state::<OptionalUser, ApiContext>(
            api_state,
        ))
}

fn protected_routes(api_state: ApiContext) -> Router<ApiContext> {
    Router::new()
        .merge(auth_protected_router())
        .merge(notes_protected_router())
        .route_layer(from_extractor_with_state::<ApiUser, ApiContext>(api_state))
}

fn admin_routes(api_state: ApiContext) -> Router<ApiContext> {
    Router::new()
        .merge(auth_admin_router())
        .merge(admin_admin_router())
        .merge(queue_admin_router())
        .route_layer(from_fn_with_state(UserRole::Admin, require_role))
        .route_layer(from_extractor_with_state::<ApiUser, ApiContext>(api_state))
}
