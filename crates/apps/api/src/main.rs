use api::serve;
use app_state::load_app_settings;
use color_eyre::Result;
use common_services::api::auth::service::ensure_admin_user;
use common_services::api::error_detail::set_expose_error_details;
use common_services::database::{get_db_pool, run_migrations};
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

    set_expose_error_details(settings.is_development());
    let pool = get_db_pool(&settings.secrets.database_url, &settings.database).await?;
    run_migrations(&pool).await?;
    ensure_admin_user(
        &pool,
        &settings.secrets.admin_email,
        &settings.secrets.admin_password,
    )
    .await?;

    serve(pool, settings).await?;

    Ok(())
}
