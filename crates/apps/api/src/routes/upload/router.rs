use crate::api_state::ApiContext;
use crate::upload::handlers::{delete_upload_handler, upload_file_handler, upload_status_handler};
use axum::{
    Router,
    routing::{delete, get, post},
};

pub fn upload_auth_optional_router() -> Router<ApiContext> {
    Router::new()
        .route("/api/upload", post(upload_file_handler))
        .route("/api/upload/status/{file_id}", get(upload_status_handler))
        .route("/api/upload/{file_id}", delete(delete_upload_handler))
}
