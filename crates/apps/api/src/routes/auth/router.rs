use crate::api_state::ApiContext;
use crate::auth::handlers::{change_password, login, logout, register, verify};
use app_state::RateLimitingSettings;
use axum::{
    Router,
    routing::{get, post},
};
use color_eyre::Result;
use color_eyre::eyre::eyre;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tracing::info;

/// Login and registration, limited per client IP.
pub fn auth_rate_limited_router(
    rate_limiting: &RateLimitingSettings,
) -> Result<Router<ApiContext>> {
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(rate_limiting.req_per_second)
        .burst_size(rate_limiting.burst_size)
        .finish()
        .ok_or_else(|| eyre!("Could not create rate-limiting governor."))?;

    info!(
        "Using request limits: one request per {}s, burst size {}",
        rate_limiting.req_per_second, rate_limiting.burst_size
    );

    Ok(Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .layer(GovernorLayer::new(governor_conf)))
}

pub fn auth_public_router() -> Router<ApiContext> {
    Router::new().route("/api/auth/logout", post(logout))
}

pub fn auth_protected_router() -> Router<ApiContext> {
    Router::new().route("/api/auth/verify", get(verify))
}

pub fn auth_admin_router() -> Router<ApiContext> {
    Router::new().route("/api/auth/change-password", post(change_password))
}
