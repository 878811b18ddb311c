use crate::context::WorkerContext;
use crate::handlers::{JobResult, job_payload};
use color_eyre::Result;
use common_services::database::jobs::Job;
use common_services::database::note_store::NoteStore;
use common_services::database::user_store::UserStore;
use common_types::NotifyAdminPayload;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

const UNKNOWN_USER: &str = "Unknown user";
const NO_CONTENT: &str = "No content";

/// Tells the admin that notes were generated. Delivery is a log entry for now.
pub async fn handle(context: &WorkerContext, job: &Job) -> Result<JobResult> {
    let payload: NotifyAdminPayload = job_payload(job)?;
    info!(
        "📝 Processing note generation notification: {}",
        payload.original_name
    );

    let user_email = match payload.user_id {
        Some(user_id) => UserStore::find_email(&context.pool, user_id).await?,
        None => None,
    }
    .unwrap_or_else(|| UNKNOWN_USER.to_owned());
    let note_content = NoteStore::find_by_id(&context.pool, payload.note_id)
        .await?
        .map(|note| note.content)
        .filter(|content| !content.is_empty())
        .unwrap_or_else(|| NO_CONTENT.to_owned());

    info!(
        file = %payload.original_name,
        user = %user_email,
        note_type = %payload.note_type,
        note_id = payload.note_id,
        "📧 Admin notification for note generation"
    );
    debug!("Note {} content: {note_content}", payload.note_id);

    sleep(Duration::from_millis(
        context.settings.queue.notification_delay_ms,
    ))
    .await;

    info!(
        "✅ Note generation notification processed: {}",
        payload.original_name
    );
    Ok(JobResult::Done(notification_result(&payload, &user_email)))
}

fn notification_result(payload: &NotifyAdminPayload, user_email: &str) -> Value {
    json!({
        "fileId": payload.file_id,
        "filename": payload.filename,
        "originalName": payload.original_name,
        "userEmail": user_email,
        "noteType": payload.note_type,
        "noteId": payload.note_id,
        "status": "notification_sent",
    })
}
