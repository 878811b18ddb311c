use crate::api_state::ApiContext;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use serde_json::{Value, json};
use tracing::error;

#[utoipa::path(
    get,
    path = "/",
    tag = "System",
    responses(
        (status = 200, description = "Root message")
    )
)]
pub async fn root() -> &'static str {
    "Audio note transcription API"
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    responses(
        (status = 200, description = "API is healthy and ready to accept traffic"),
        (status = 503, description = "API is not healthy, likely due to a database issue.")
    )
)]
pub async fn health_check(
    State(context): State<ApiContext>,
) -> Result<Json<Value>, StatusCode> {
    match sqlx::query("SELECT 1").fetch_one(&context.pool).await {
        Ok(_) => Ok(Json(json!({
            "status": "OK",
            "timestamp": Utc::now(),
        }))),
        Err(e) => {
            error!("Health check failed: database connection error: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
