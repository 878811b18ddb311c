use crate::api_state::ApiContext;
use crate::create_router;
use app_state::AppSettings;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get_service;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use http::{HeaderValue, header};
use sqlx::PgPool;
use std::iter::once;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::cors;
use tower_http::cors::CorsLayer;
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Slack on top of the file size cap for the multipart framing and other fields.
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Builds the full application: routes, middleware and static upload serving.
pub fn build_app(api_state: ApiContext) -> Result<Router> {
    let settings = api_state.settings.clone();

    // --- CORS Configuration ---
    let allowed_origins: Vec<HeaderValue> = settings
        .api
        .allowed_origins
        .iter()
        .filter_map(|s| match s.parse() {
            Ok(hv) => Some(hv),
            Err(e) => {
                error!("Invalid CORS origin configured: {} - Error: {}", s, e);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_methods(cors::Any)
        .allow_origin(allowed_origins)
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ORIGIN,
            header::USER_AGENT,
            header::CACHE_CONTROL,
            header::PRAGMA,
        ])
        .expose_headers([header::CONTENT_DISPOSITION]);

    let body_limit = usize::try_from(
        settings.uploads.max_file_size_bytes() + MULTIPART_OVERHEAD_BYTES,
    )?;

    // Stored uploads, reachable for the external webhook through `public_url`.
    let serve_dir = ServeDir::new(&settings.uploads.upload_dir);

    Ok(create_router(api_state)?
        .nest_service("/uploads", get_service(serve_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http().on_request(()))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(SetSensitiveRequestHeadersLayer::new(once(
            header::AUTHORIZATION,
        ))))
}

pub async fn serve(pool: PgPool, settings: AppSettings) -> Result<()> {
    // --- Server Startup ---
    info!("🚀 Initializing server...");
    let api_state = ApiContext {
        pool: pool.clone(),
        settings: settings.clone(),
    };
    let app = build_app(api_state)?;

    let addr: SocketAddr = format!("{}:{}", settings.api.host, settings.api.port)
        .parse()
        .map_err(|e| eyre!("Invalid address: {}", e))?;
    let listener = TcpListener::bind(addr).await?;

    info!("🐸 Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    pool.close().await;
    info!("👋 Server stopped, database connections closed");
    Ok(())
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Cannot listen for Ctrl+C: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("🛑 Shutdown signal received, draining connections...");
}
