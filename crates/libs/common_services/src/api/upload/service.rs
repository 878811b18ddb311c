use crate::api::common::MessageResponse;
use crate::api::upload::error::UploadError;
use crate::api::upload::interfaces::{StagedUpload, UploadResponse, UploadedFileSummary};
use crate::database::file::{FileWithTask, NewUploadedFile};
use crate::database::file_store::FileStore;
use crate::database::note_store::NoteStore;
use crate::database::task_store::{DEFAULT_TASK_PRIORITY, TaskStore};
use crate::job_queue::{enqueue_job, remove_pending_jobs_for_file};
use crate::utils::nice_id;
use app_state::{AppSettings, UploadSettings, extension_with_dot, to_posix_string};
use axum::extract::Multipart;
use axum::http::StatusCode;
use chrono::Utc;
use color_eyre::eyre::{Result, WrapErr};
use common_types::queue::{JobName, QueueName};
use common_types::task_status::TaskType;
use common_types::{ForwardFilePayload, ProcessFilePayload};
use sqlx::PgPool;
use std::io::ErrorKind;
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Name of the multipart field that carries the file.
pub const FILE_FIELD: &str = "file";

/// Reads the multipart body and stages its single file in the temp directory.
///
/// Type and extension are checked before any byte is written, and the size cap
/// while streaming, so rejected uploads leave nothing behind.
///
/// # Errors
///
/// * `UploadError::NoFile`, `UnexpectedField`, `TooManyFiles` for a malformed form.
/// * `UploadError::InvalidFileType` if the MIME type or extension is not allowed.
/// * `UploadError::FileTooLarge` if the file exceeds the configured size.
pub async fn stage_upload(
    mut multipart: Multipart,
    settings: &UploadSettings,
) -> Result<StagedUpload, UploadError> {
    let mut staged: Option<StagedUpload> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(|e| too_large_or(e, settings))? {
        let Some(original_name) = field.file_name().map(ToOwned::to_owned) else {
            continue;
        };
        if field.name() != Some(FILE_FIELD) {
            return Err(UploadError::UnexpectedField(
                field.name().unwrap_or_default().to_owned(),
            ));
        }
        if staged.is_some() {
            return Err(UploadError::TooManyFiles);
        }

        let mime_type = field.content_type().map_or_else(
            || {
                mime_guess::from_path(&original_name)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_owned()
            },
            mime_essence,
        );
        if !settings.is_allowed_mime_type(&mime_type)
            || !settings.is_allowed_extension(&original_name)
        {
            return Err(UploadError::InvalidFileType {
                allowed: settings.allowed_extensions.join(", "),
            });
        }

        let temp_file = NamedTempFile::new_in(&settings.temp_dir)
            .wrap_err("Cannot create staging file")?;
        let mut writer = fs::File::from_std(temp_file.reopen().wrap_err("Cannot open staging file")?);
        let max_bytes = settings.max_file_size_bytes();
        let mut size: u64 = 0;
        while let Some(chunk) = field.chunk().await.map_err(|e| too_large_or(e, settings))? {
            size += chunk.len() as u64;
            if size > max_bytes {
                return Err(UploadError::FileTooLarge {
                    max_mb: settings.max_file_size_mb,
                });
            }
            writer
                .write_all(&chunk)
                .await
                .wrap_err("Cannot write staging file")?;
        }
        writer.flush().await.wrap_err("Cannot flush staging file")?;

        staged = Some(StagedUpload {
            temp_file,
            original_name,
            mime_type,
            size,
        });
    }

    staged.ok_or(UploadError::NoFile)
}

/// Bare `type/subtype` of a content type header, lowercased.
fn mime_essence(content_type: &str) -> String {
    content_type.parse::<mime_guess::Mime>().map_or_else(
        |_| content_type.trim().to_ascii_lowercase(),
        |mime| mime.essence_str().to_ascii_lowercase(),
    )
}

fn too_large_or(
    err: axum::extract::multipart::MultipartError,
    settings: &UploadSettings,
) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::FileTooLarge {
            max_mb: settings.max_file_size_mb,
        }
    } else {
        UploadError::Multipart(err)
    }
}

/// Storage name of an upload: `{unix_millis}_{random}{.ext}`.
#[must_use]
pub fn storage_filename(original_name: &str) -> String {
    format!(
        "{}_{}{}",
        Utc::now().timestamp_millis(),
        nice_id(13),
        extension_with_dot(original_name).unwrap_or_default()
    )
}

/// Stores a staged upload: file and task rows plus the processing job (and the
/// forwarding job when a webhook is configured) are written in one transaction,
/// and the file is moved into the upload directory before it commits.
///
/// # Errors
///
/// * `UploadError::UploadFailed` if any database or filesystem step fails. The
///   staged file is removed in that case and no rows remain.
pub async fn store_upload(
    pool: &PgPool,
    settings: &AppSettings,
    staged: StagedUpload,
    user_id: Option<i32>,
) -> Result<UploadResponse, UploadError> {
    let filename = storage_filename(&staged.original_name);
    let final_path = settings.uploads.upload_dir.join(&filename);

    let file = persist_upload(pool, settings, staged, &filename, &final_path, user_id)
        .await
        .map_err(UploadError::UploadFailed)?;

    info!(
        "📁 File uploaded: {} as {} ({} bytes)",
        file.original_name, file.filename, file.file_size
    );
    Ok(UploadResponse {
        message: "File uploaded successfully".to_owned(),
        file,
    })
}

async fn persist_upload(
    pool: &PgPool,
    settings: &AppSettings,
    staged: StagedUpload,
    filename: &str,
    final_path: &Path,
    user_id: Option<i32>,
) -> Result<UploadedFileSummary> {
    let new_file = NewUploadedFile {
        filename: filename.to_owned(),
        original_name: staged.original_name.clone(),
        file_path: to_posix_string(final_path),
        file_size: i64::try_from(staged.size)?,
        file_type: staged.mime_type.clone(),
        user_id,
    };

    let mut tx = pool.begin().await?;
    let file = FileStore::create(&mut *tx, &new_file).await?;
    TaskStore::create(&mut *tx, file.id, user_id, TaskType::FileProcessing).await?;

    enqueue_job(&mut *tx, JobName::ProcessFile)
        .payload(&ProcessFilePayload {
            file_id: file.id,
            filename: file.filename.clone(),
            original_name: file.original_name.clone(),
            file_path: file.file_path.clone(),
            file_size: file.file_size,
            file_type: file.file_type.clone(),
            user_id,
        })
        .policy(settings.queue.policy(QueueName::FileProcessing))
        .priority(DEFAULT_TASK_PRIORITY)
        .call()
        .await?;

    if settings.integrations.webhook_url().is_some() {
        enqueue_job(&mut *tx, JobName::ForwardFile)
            .payload(&ForwardFilePayload {
                file_id: file.id,
                file_url: public_file_url(&settings.api.public_url, &file.filename),
                original_name: file.original_name.clone(),
                file_size: file.file_size,
                file_type: file.file_type.clone(),
                user_id,
                timestamp: file.created_at.to_rfc3339(),
            })
            .policy(settings.queue.policy(QueueName::FileForwarding))
            .call()
            .await?;
    }

    move_into_place(staged.temp_file, final_path).await?;

    if let Err(e) = tx.commit().await {
        remove_file_if_exists(final_path).await;
        return Err(e).wrap_err("Commit of upload failed");
    }

    Ok(UploadedFileSummary {
        id: file.id,
        filename: file.filename,
        original_name: file.original_name,
        file_size: file.file_size,
        file_type: file.file_type,
        status: file.status,
    })
}

/// Renames the staged file into place, copying when the directories are on
/// different filesystems.
async fn move_into_place(temp_file: NamedTempFile, final_path: &Path) -> Result<()> {
    match temp_file.persist_noclobber(final_path) {
        Ok(_) => Ok(()),
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
            Err(e.error).wrap_err("Upload destination already exists")
        }
        Err(e) => {
            fs::copy(e.file.path(), final_path)
                .await
                .wrap_err("Cannot move upload into place")?;
            Ok(())
        }
    }
}

async fn remove_file_if_exists(path: &Path) {
    if let Err(e) = fs::remove_file(path).await
        && e.kind() != ErrorKind::NotFound
    {
        warn!("Could not remove {}: {e}", path.display());
    }
}

/// Public URL under which the upload directory is served.
#[must_use]
pub fn public_file_url(public_url: &str, filename: &str) -> String {
    format!("{}/uploads/{filename}", public_url.trim_end_matches('/'))
}

/// File and task status, visible to the owner only (anonymous files to anonymous callers).
pub async fn upload_status(
    pool: &PgPool,
    file_id: i32,
    user_id: Option<i32>,
) -> Result<FileWithTask, UploadError> {
    FileStore::find_owned_with_task(pool, file_id, user_id)
        .await?
        .ok_or(UploadError::FileNotFound)
}

/// Removes a file with its notes, task and unstarted jobs, then the stored bytes.
pub async fn delete_upload(
    pool: &PgPool,
    file_id: i32,
    user_id: Option<i32>,
) -> Result<MessageResponse, UploadError> {
    let mut tx = pool.begin().await?;
    let file = FileStore::find_owned(&mut *tx, file_id, user_id)
        .await?
        .ok_or(UploadError::FileNotFound)?;

    let notes = NoteStore::delete_for_file(&mut *tx, file.id).await?;
    TaskStore::delete_for_file(&mut *tx, file.id).await?;
    let jobs = remove_pending_jobs_for_file(&mut *tx, file.id).await?;
    FileStore::delete(&mut *tx, file.id).await?;
    tx.commit().await?;

    remove_file_if_exists(Path::new(&file.file_path)).await;
    info!(
        "🗑️ Deleted file {} ({} notes, {} queued jobs)",
        file.filename, notes, jobs
    );
    Ok(MessageResponse::new("File deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;
    use axum::http::header::CONTENT_TYPE;
    use std::path::PathBuf;

    const BOUNDARY: &str = "XNOTEBOUNDARY";

    fn text_settings(temp_dir: PathBuf) -> UploadSettings {
        UploadSettings {
            upload_dir: temp_dir.clone(),
            temp_dir,
            max_file_size_mb: 1,
            allowed_mime_types: vec!["audio/mpeg".into(), "text/plain".into()],
            allowed_extensions: vec![".mp3".into(), ".txt".into()],
        }
    }

    async fn multipart_with(
        file_name: &str,
        content_type: &str,
        bytes: &str,
    ) -> Result<Multipart> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: {content_type}\r\n\r\n\
             {bytes}\r\n\
             --{BOUNDARY}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))?;
        Ok(Multipart::from_request(request, &()).await?)
    }

    #[test]
    fn essence_drops_parameters_and_case() {
        assert_eq!(mime_essence("text/plain; charset=utf-8"), "text/plain");
        assert_eq!(mime_essence("Audio/MPEG"), "audio/mpeg");
        assert_eq!(mime_essence("text/plain"), "text/plain");
    }

    #[tokio::test]
    async fn content_type_with_charset_is_accepted() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let settings = text_settings(dir.path().to_path_buf());
        let multipart =
            multipart_with("note.txt", "text/plain; charset=utf-8", "0123456789").await?;

        let staged = stage_upload(multipart, &settings).await?;

        assert_eq!(staged.mime_type, "text/plain");
        assert_eq!(staged.original_name, "note.txt");
        assert_eq!(staged.size, 10);
        Ok(())
    }

    #[tokio::test]
    async fn disallowed_content_type_is_rejected() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let settings = text_settings(dir.path().to_path_buf());
        let multipart =
            multipart_with("note.txt", "text/html; charset=utf-8", "<p>hi</p>").await?;

        let result = stage_upload(multipart, &settings).await;

        assert!(matches!(result, Err(UploadError::InvalidFileType { .. })));
        Ok(())
    }

    #[test]
    fn storage_name_keeps_only_the_extension() {
        let name = storage_filename("My Visit (final).MP3");
        let (millis, rest) = name.split_once('_').unwrap_or_default();
        assert!(millis.parse::<i64>().is_ok());
        assert!(rest.ends_with(".MP3"));
        assert_eq!(rest.len(), 13 + ".MP3".len());
        assert!(!name.contains(' '));
    }

    #[test]
    fn storage_name_without_extension() {
        let name = storage_filename("README");
        assert!(!name.contains('.'));
    }

    #[test]
    fn public_url_joins_cleanly() {
        assert_eq!(
            public_file_url("http://localhost:3001/", "1_abc.mp3"),
            "http://localhost:3001/uploads/1_abc.mp3"
        );
        assert_eq!(
            public_file_url("https://api.example.com", "1_abc.mp3"),
            "https://api.example.com/uploads/1_abc.mp3"
        );
    }

    #[tokio::test]
    async fn staged_file_moves_into_place() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let temp_file = NamedTempFile::new_in(dir.path())?;
        fs::write(temp_file.path(), b"hello").await?;
        let final_path = dir.path().join("stored.txt");

        move_into_place(temp_file, &final_path).await?;

        assert_eq!(fs::read(&final_path).await?, b"hello");
        Ok(())
    }
}
