use crate::runner::context::context_utils::{
    create_test_database, create_test_settings, force_drop_db,
};
use app_state::{AppSettings, load_settings_from_path};
use color_eyre::eyre::{Result, eyre};
use common_services::api::auth::service::ensure_admin_user;
use common_services::utils::nice_id;
use reqwest::Client;
use sqlx::PgPool;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// The main context for our integration tests.
///
/// Only the API runs in the background. Tests drive the worker themselves so they
/// can observe each state in between.
pub struct TestContext {
    pub pool: PgPool,
    pub settings: AppSettings,
    pub http_client: Client,
    db_name: String,
    management_pool: PgPool,
    upload_dir: TempDir,
    temp_dir: TempDir,
    api_handle: JoinHandle<()>,
}

impl TestContext {
    /// Sets up a dedicated database, the admin account and a running API.
    pub async fn new() -> Result<Self> {
        info!("Setting up test environment...");

        let settings_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("assets/settings.yaml")
            .canonicalize()?;
        let base_settings = load_settings_from_path(&settings_path, false)?;

        // 1. Set up the dedicated test database
        let db_name = format!("test_{}", nice_id(8).to_lowercase());
        let (main_pool, management_pool) = create_test_database(&base_settings, &db_name).await?;

        // 2. Generate the final settings for this test run
        let (settings, upload_dir, temp_dir) = create_test_settings(&db_name, &base_settings)?;
        ensure_admin_user(
            &main_pool,
            &settings.secrets.admin_email,
            &settings.secrets.admin_password,
        )
        .await?;

        // 3. Spawn the API
        let api_pool = main_pool.clone();
        let api_settings = settings.clone();
        let api_handle = tokio::spawn(async move {
            if let Err(e) = api::serve(api_pool, api_settings).await {
                error!("API server failed: {}", e);
            }
        });

        // 4. Wait for the API to be ready to accept traffic
        let http_client = Client::new();
        Self::wait_for_healthy_api(&settings, &http_client).await?;

        info!("Test environment is ready.");
        Ok(Self {
            pool: main_pool,
            settings,
            http_client,
            db_name,
            management_pool,
            upload_dir,
            temp_dir,
            api_handle,
        })
    }

    /// Polls the `/health` endpoint until it receives a successful response or times out.
    async fn wait_for_healthy_api(settings: &AppSettings, http_client: &Client) -> Result<()> {
        for attempt in 1..=20 {
            info!("Health check attempt {}...", attempt);
            let health_url = format!("{}/health", &settings.api.public_url);
            match http_client.get(&health_url).send().await {
                Ok(response) if response.status().is_success() => {
                    info!("API is healthy!");
                    return Ok(());
                }
                Ok(response) => {
                    warn!(
                        "API health check returned non-success status: {}",
                        response.status()
                    );
                }
                Err(e) => {
                    warn!("API health check failed: {:?}. Retrying...", e);
                }
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        Err(eyre!(
            "API did not become healthy within the timeout period."
        ))
    }

    /// Stops the API and drops the test database.
    pub async fn teardown(self) -> Result<()> {
        self.api_handle.abort();
        self.pool.close().await;

        info!("Dropping test database: {}", self.db_name);
        force_drop_db(&self.management_pool, &self.db_name).await?;
        self.management_pool.close().await;

        info!(
            "Teardown complete, removing {} and {}",
            self.upload_dir.path().display(),
            self.temp_dir.path().display()
        );
        Ok(())
    }
}
