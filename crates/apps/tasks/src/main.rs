use app_state::load_app_settings;
use color_eyre::Result;
use common_services::database::{get_db_pool, run_migrations};
use tasks::task_runner::run_tasks;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = load_app_settings()?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    color_eyre::install()?;

    let pool = get_db_pool(&settings.secrets.database_url, &settings.database).await?;
    run_migrations(&pool).await?;
    let report = run_tasks(&pool, &settings.queue).await?;
    info!(
        "Maintenance finished: {} expired notes, {} finished jobs removed",
        report.expired_notes, report.trimmed_jobs
    );

    pool.close().await;
    Ok(())
}
