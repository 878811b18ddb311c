use crate::api_state::ApiContext;
use crate::notes::handlers::{
    download_note_handler, file_notes_handler, user_notes_handler, webhook_handler,
};
use axum::{
    Router,
    routing::{get, post},
};

pub fn notes_public_router() -> Router<ApiContext> {
    Router::new().route("/api/notes/webhook", post(webhook_handler))
}

pub fn notes_protected_router() -> Router<ApiContext> {
    Router::new()
        .route("/api/notes/file/{file_id}", get(file_notes_handler))
        .route("/api/notes/user", get(user_notes_handler))
        .route("/api/notes/download/{note_id}", get(download_note_handler))
}
