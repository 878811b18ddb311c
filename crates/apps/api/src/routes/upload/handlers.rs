use crate::api_state::ApiContext;
use crate::auth::middlewares::optional_user::OptionalUser;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::{Extension, Json};
use common_services::api::common::MessageResponse;
use common_services::api::upload::error::UploadError;
use common_services::api::upload::interfaces::UploadResponse;
use common_services::api::upload::service::{delete_upload, stage_upload, store_upload, upload_status};
use common_services::database::file::FileWithTask;
use tracing::instrument;

/// Upload one audio or text file under the multipart field `file`.
///
/// # Errors
///
/// Returns an `UploadError` if the form is malformed, the file is not allowed or
/// too large, or storing it fails.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "Upload",
    request_body(content_type = "multipart/form-data", description = "Single file in the `file` field"),
    responses(
        (status = 200, description = "File stored and queued for processing", body = UploadResponse),
        (status = 400, description = "No file, too many files, wrong field or type"),
        (status = 413, description = "File too large"),
        (status = 500, description = "File upload failed"),
    ),
    security((), ("bearer_auth" = []))
)]
#[instrument(skip(context, user, multipart), err(Debug))]
pub async fn upload_file_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<OptionalUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, UploadError> {
    let multipart = multipart.map_err(|_| UploadError::NoFile)?;
    let staged = stage_upload(multipart, &context.settings.uploads).await?;
    let response = store_upload(&context.pool, &context.settings, staged, user.id()).await?;
    Ok(Json(response))
}

/// Processing status of an uploaded file.
///
/// # Errors
///
/// Returns `UploadError::FileNotFound` unless the file belongs to the caller.
#[utoipa::path(
    get,
    path = "/api/upload/status/{file_id}",
    tag = "Upload",
    params(("file_id" = i32, Path, description = "File id")),
    responses(
        (status = 200, description = "File and task status", body = FileWithTask),
        (status = 404, description = "File not found"),
    ),
    security((), ("bearer_auth" = []))
)]
#[instrument(skip(context, user), err(Debug))]
pub async fn upload_status_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<OptionalUser>,
    Path(file_id): Path<i32>,
) -> Result<Json<FileWithTask>, UploadError> {
    let status = upload_status(&context.pool, file_id, user.id()).await?;
    Ok(Json(status))
}

/// Delete a file together with its notes, task and queued jobs.
///
/// # Errors
///
/// Returns `UploadError::FileNotFound` unless the file belongs to the caller.
#[utoipa::path(
    delete,
    path = "/api/upload/{file_id}",
    tag = "Upload",
    params(("file_id" = i32, Path, description = "File id")),
    responses(
        (status = 200, description = "File deleted", body = MessageResponse),
        (status = 404, description = "File not found"),
    ),
    security((), ("bearer_auth" = []))
)]
#[instrument(skip(context, user), err(Debug))]
pub async fn delete_upload_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<OptionalUser>,
    Path(file_id): Path<i32>,
) -> Result<Json<MessageResponse>, UploadError> {
    let response = delete_upload(&context.pool, file_id, user.id()).await?;
    Ok(Json(response))
}
