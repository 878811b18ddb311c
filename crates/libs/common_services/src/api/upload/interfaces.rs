use common_types::file_status::FileStatus;
use serde::Serialize;
use tempfile::NamedTempFile;
use utoipa::ToSchema;

/// A validated upload, written to the temp directory but not yet stored.
#[derive(Debug)]
pub struct StagedUpload {
    pub temp_file: NamedTempFile,
    pub original_name: String,
    pub mime_type: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFileSummary {
    pub id: i32,
    pub filename: String,
    pub original_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub status: FileStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    pub file: UploadedFileSummary,
}
