use app_state::QueueSettings;
use color_eyre::Result;
use common_services::database::note_store::NoteStore;
use common_services::job_queue::trim_finished_jobs;
use common_types::queue::QueueName;
use sqlx::PgPool;
use tracing::info;

/// What a maintenance run removed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MaintenanceReport {
    pub expired_notes: u64,
    pub trimmed_jobs: u64,
}

/// One maintenance pass: deletes notes past their retention date and discards
/// finished jobs beyond each queue's retention.
pub async fn run_tasks(pool: &PgPool, queue_settings: &QueueSettings) -> Result<MaintenanceReport> {
    let expired_notes = NoteStore::delete_expired(pool).await?;
    info!("🧹 Deleted {expired_notes} expired notes");

    let mut trimmed_jobs = 0;
    for queue in QueueName::ALL {
        let trimmed = trim_finished_jobs(
            pool,
            queue,
            queue_settings.keep_completed,
            queue_settings.keep_failed,
        )
        .await?;
        if trimmed > 0 {
            info!("🧹 Trimmed {trimmed} finished jobs from {queue}");
        }
        trimmed_jobs += trimmed;
    }

    Ok(MaintenanceReport {
        expired_notes,
        trimmed_jobs,
    })
}
