use crate::routes::{admin, auth, notes, queue, root, upload};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        root::handlers::root,
        root::handlers::health_check,
        // Auth handlers
        auth::handlers::login,
        auth::handlers::register,
        auth::handlers::verify,
        auth::handlers::change_password,
        auth::handlers::logout,
        // Upload handlers
        upload::handlers::upload_file_handler,
        upload::handlers::upload_status_handler,
        upload::handlers::delete_upload_handler,
        // Notes handlers
        notes::handlers::webhook_handler,
        notes::handlers::file_notes_handler,
        notes::handlers::user_notes_handler,
        notes::handlers::download_note_handler,
        // Admin handlers
        admin::handlers::dashboard_handler,
        admin::handlers::admin_notes_handler,
        admin::handlers::download_all_handler,
        admin::handlers::update_retention_handler,
        admin::handlers::delete_expired_handler,
        admin::handlers::stats_handler,
        // Queue handlers
        queue::handlers::queue_status_handler,
        queue::handlers::queue_jobs_handler,
        queue::handlers::queue_job_handler,
        queue::handlers::retry_job_handler,
        queue::handlers::remove_job_handler,
        queue::handlers::pause_queue_handler,
        queue::handlers::resume_queue_handler,
        queue::handlers::clear_completed_handler,
        queue::handlers::clear_failed_handler,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Transcribe", description = "Audio note transcription API"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Upload", description = "Uploading and managing audio and text files"),
        (name = "Notes", description = "Generated notes and the generator webhook"),
        (name = "Admin", description = "Reporting, exports and note retention"),
        (name = "Queue", description = "Job queue inspection and maintenance"),
        (name = "System", description = "Health check"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
