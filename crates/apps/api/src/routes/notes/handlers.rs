use crate::api_state::ApiContext;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use common_services::api::common::MessageResponse;
use common_services::api::notes::error::NotesError;
use common_services::api::notes::interfaces::{
    FileNotesResponse, TextDownload, UserFilesResponse, UserNotesParams, WebhookPayload,
};
use common_services::api::notes::service::{download_note, file_notes, process_webhook, user_files};
use common_services::database::app_user::User;
use tracing::instrument;

/// Turns a rendered text file into an attachment response.
pub fn text_attachment(download: TextDownload) -> impl IntoResponse {
    let headers = [
        (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_owned()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", download.filename),
        ),
    ];
    (headers, download.body)
}

/// Callback of the external note generator.
///
/// # Errors
///
/// Returns `NotesError` only when the file id is missing or unknown.
#[utoipa::path(
    post,
    path = "/api/notes/webhook",
    tag = "Notes",
    request_body = WebhookPayload,
    responses(
        (status = 200, description = "Webhook processed", body = MessageResponse),
        (status = 400, description = "File ID is required"),
        (status = 404, description = "File not found"),
    )
)]
#[instrument(skip(context, payload), err(Debug))]
pub async fn webhook_handler(
    State(context): State<ApiContext>,
    Json(payload): Json<WebhookPayload>,
) -> Result<Json<MessageResponse>, NotesError> {
    let response = process_webhook(&context.pool, &context.settings, payload).await?;
    Ok(Json(response))
}

/// A file of the caller with its generated notes.
///
/// # Errors
///
/// Returns `NotesError::FileNotFound` unless the file belongs to the caller.
#[utoipa::path(
    get,
    path = "/api/notes/file/{file_id}",
    tag = "Notes",
    params(("file_id" = i32, Path, description = "File id")),
    responses(
        (status = 200, description = "File with notes", body = FileNotesResponse),
        (status = 404, description = "File not found"),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, user), err(Debug))]
pub async fn file_notes_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(file_id): Path<i32>,
) -> Result<Json<FileNotesResponse>, NotesError> {
    let response = file_notes(&context.pool, file_id, user.id).await?;
    Ok(Json(response))
}

/// The caller's files with their notes, newest first.
///
/// # Errors
///
/// Returns `NotesError` if the database query fails.
#[utoipa::path(
    get,
    path = "/api/notes/user",
    tag = "Notes",
    params(UserNotesParams),
    responses(
        (status = 200, description = "Paginated files with notes", body = UserFilesResponse),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, user), err(Debug))]
pub async fn user_notes_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Query(params): Query<UserNotesParams>,
) -> Result<Json<UserFilesResponse>, NotesError> {
    let response = user_files(&context.pool, user.id, params).await?;
    Ok(Json(response))
}

/// Download one of the caller's notes as a text file.
///
/// # Errors
///
/// Returns `NotesError::NoteNotFound` unless the note's file belongs to the caller.
#[utoipa::path(
    get,
    path = "/api/notes/download/{note_id}",
    tag = "Notes",
    params(("note_id" = i32, Path, description = "Note id")),
    responses(
        (status = 200, description = "Plain-text attachment", content_type = "text/plain"),
        (status = 404, description = "Note not found"),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, user), err(Debug))]
pub async fn download_note_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(note_id): Path<i32>,
) -> Result<impl IntoResponse, NotesError> {
    let download = download_note(&context.pool, note_id, user.id).await?;
    Ok(text_attachment(download))
}
