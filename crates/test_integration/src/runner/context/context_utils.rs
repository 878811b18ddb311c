use app_state::AppSettings;
use color_eyre::Result;
use common_services::database::{get_db_pool, run_migrations};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use tempfile::TempDir;
use tracing::info;
use url::Url;

/// Same server as `base_url`, different database.
pub fn database_url_for(base_url: &str, db_name: &str) -> Result<String> {
    let mut url = Url::parse(base_url)?;
    url.set_path(db_name);
    Ok(url.to_string())
}

/// Creates an empty, migrated database. Returns a pool for it and a pool on the
/// server's default database, used later to drop it again.
pub async fn create_test_database(
    settings: &AppSettings,
    db_name: &str,
) -> Result<(PgPool, PgPool)> {
    let base_url = &settings.secrets.database_url;
    let management_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(base_url)
        .await?;

    force_drop_db(&management_pool, db_name).await?;
    info!("Creating test database: {}", db_name);
    management_pool
        .execute(format!("CREATE DATABASE \"{db_name}\"").as_str())
        .await?;

    let pool = get_db_pool(&database_url_for(base_url, db_name)?, &settings.database).await?;
    run_migrations(&pool).await?;
    Ok((pool, management_pool))
}

pub async fn force_drop_db(management_pool: &PgPool, db_name: &str) -> Result<()> {
    management_pool
        .execute(format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)").as_str())
        .await?;
    Ok(())
}

/// Settings pointing at the test database, with fresh upload and temp directories.
pub fn create_test_settings(
    db_name: &str,
    base_settings: &AppSettings,
) -> Result<(AppSettings, TempDir, TempDir)> {
    let upload_dir = TempDir::new()?;
    let temp_dir = TempDir::new()?;

    let mut settings = base_settings.clone();
    settings.secrets.database_url = database_url_for(&base_settings.secrets.database_url, db_name)?;
    settings.uploads.upload_dir = upload_dir.path().to_path_buf();
    settings.uploads.temp_dir = temp_dir.path().to_path_buf();

    Ok((settings, upload_dir, temp_dir))
}
