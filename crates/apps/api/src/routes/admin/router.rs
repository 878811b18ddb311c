use crate::admin::handlers::{
    admin_notes_handler, dashboard_handler, delete_expired_handler, download_all_handler,
    stats_handler, update_retention_handler,
};
use crate::api_state::ApiContext;
use axum::{
    Router,
    routing::{delete, get, put},
};

pub fn admin_admin_router() -> Router<ApiContext> {
    Router::new()
        .route("/api/admin/dashboard", get(dashboard_handler))
        .route("/api/admin/notes", get(admin_notes_handler))
        .route("/api/admin/download-all", get(download_all_handler))
        .route(
            "/api/admin/notes/{note_id}/retention",
            put(update_retention_handler),
        )
        .route("/api/admin/notes/expired", delete(delete_expired_handler))
        .route("/api/admin/stats", get(stats_handler))
}
