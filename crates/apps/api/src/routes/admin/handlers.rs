use crate::api_state::ApiContext;
use crate::notes::handlers::text_attachment;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use common_services::api::admin::error::AdminError;
use common_services::api::admin::interfaces::{
    AdminNotesResponse, DashboardParams, DashboardResponse, DeleteExpiredResponse, NoteListParams,
    RetentionUpdate, StatsResponse,
};
use common_services::api::admin::service::{
    dashboard, delete_expired_notes, export_notes, list_notes, system_stats, update_retention,
};
use common_services::api::common::MessageResponse;
use tracing::instrument;

/// All files with task state and notes, plus file statistics.
///
/// # Errors
///
/// Returns `AdminError::InvalidDate` for unparseable date filters.
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "Admin",
    params(DashboardParams),
    responses(
        (status = 200, description = "Paginated files with stats", body = DashboardResponse),
        (status = 400, description = "Invalid filter"),
        (status = 403, description = "Admin role required"),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context), err(Debug))]
pub async fn dashboard_handler(
    State(context): State<ApiContext>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<DashboardResponse>, AdminError> {
    Ok(Json(dashboard(&context.pool, &params).await?))
}

/// All notes with their file and owner.
///
/// # Errors
///
/// Returns `AdminError::InvalidDate` for unparseable date filters.
#[utoipa::path(
    get,
    path = "/api/admin/notes",
    tag = "Admin",
    params(NoteListParams),
    responses(
        (status = 200, description = "Paginated notes", body = AdminNotesResponse),
        (status = 400, description = "Invalid filter"),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context), err(Debug))]
pub async fn admin_notes_handler(
    State(context): State<ApiContext>,
    Query(params): Query<NoteListParams>,
) -> Result<Json<AdminNotesResponse>, AdminError> {
    Ok(Json(list_notes(&context.pool, &params).await?))
}

/// Every matching note in one text file.
///
/// # Errors
///
/// Returns `AdminError::NoNotesFound` when nothing matches.
#[utoipa::path(
    get,
    path = "/api/admin/download-all",
    tag = "Admin",
    params(NoteListParams),
    responses(
        (status = 200, description = "Plain-text attachment", content_type = "text/plain"),
        (status = 404, description = "No notes found for the specified criteria"),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context), err(Debug))]
pub async fn download_all_handler(
    State(context): State<ApiContext>,
    Query(params): Query<NoteListParams>,
) -> Result<impl IntoResponse, AdminError> {
    let download = export_notes(&context.pool, &params).await?;
    Ok(text_attachment(download))
}

/// Move a note's retention date to `retentionDays` from today.
///
/// # Errors
///
/// Returns `AdminError::InvalidRetention` or `AdminError::NoteNotFound`.
#[utoipa::path(
    put,
    path = "/api/admin/notes/{note_id}/retention",
    tag = "Admin",
    params(("note_id" = i32, Path, description = "Note id")),
    request_body = RetentionUpdate,
    responses(
        (status = 200, description = "Retention updated", body = MessageResponse),
        (status = 400, description = "Valid retention days required"),
        (status = 404, description = "Note not found"),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, payload), err(Debug))]
pub async fn update_retention_handler(
    State(context): State<ApiContext>,
    Path(note_id): Path<i32>,
    Json(payload): Json<RetentionUpdate>,
) -> Result<Json<MessageResponse>, AdminError> {
    Ok(Json(update_retention(&context.pool, note_id, &payload).await?))
}

/// Delete notes whose retention date has passed.
///
/// # Errors
///
/// Returns `AdminError` if the delete fails.
#[utoipa::path(
    delete,
    path = "/api/admin/notes/expired",
    tag = "Admin",
    responses(
        (status = 200, description = "Expired notes deleted", body = DeleteExpiredResponse),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context), err(Debug))]
pub async fn delete_expired_handler(
    State(context): State<ApiContext>,
) -> Result<Json<DeleteExpiredResponse>, AdminError> {
    Ok(Json(delete_expired_notes(&context.pool).await?))
}

/// Counts of files, notes, users and tasks.
///
/// # Errors
///
/// Returns `AdminError` if a query fails.
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    tag = "Admin",
    responses(
        (status = 200, description = "System statistics", body = StatsResponse),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context), err(Debug))]
pub async fn stats_handler(
    State(context): State<ApiContext>,
) -> Result<Json<StatsResponse>, AdminError> {
    Ok(Json(system_stats(&context.pool).await?))
}
