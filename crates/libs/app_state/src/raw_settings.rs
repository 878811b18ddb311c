use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings as they appear in `config/settings.yaml` and the environment.
#[derive(Debug, Deserialize, Clone)]
pub struct RawSettings {
    pub environment: Environment,
    pub logging: LoggingSettings,
    pub api: ApiSettings,
    /// Where uploads are staged and stored, and what may be uploaded.
    pub uploads: RawUploadSettings,
    pub queue: QueueSettings,
    pub notes: NoteSettings,
    pub auth: AuthSettings,
    pub database: DatabaseSettings,
    pub integrations: IntegrationSettings,
    pub secrets: SecretSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
    Test,
}

/// Logging configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub level: String,
}

/// Configuration for the API server.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub host: String,
    pub port: u32,
    pub allowed_origins: Vec<String>,
    /// Base URL under which `/uploads/*` is reachable from outside.
    pub public_url: String,
    pub rate_limiting: RateLimitingSettings,
}

/// Rate limiting applied to the public auth routes.
#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitingSettings {
    /// Seconds after which one request is replenished.
    pub req_per_second: u64,
    pub burst_size: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawUploadSettings {
    pub upload_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub max_file_size_mb: u64,
    pub allowed_mime_types: Vec<String>,
    /// Lowercase, including the leading dot.
    pub allowed_extensions: Vec<String>,
}

/// Job queue behaviour shared by the API (enqueueing) and the worker.
#[derive(Debug, Deserialize, Clone)]
pub struct QueueSettings {
    pub poll_interval_ms: u64,
    /// Active jobs without a heartbeat for this long are considered stalled.
    pub stall_timeout_secs: u64,
    pub heartbeat_interval_secs: u64,
    /// Duration of each of the two simulated processing phases.
    pub simulated_step_ms: u64,
    pub notification_delay_ms: u64,
    /// Finished jobs kept per queue; older ones are discarded.
    pub keep_completed: i64,
    pub keep_failed: i64,
    pub file_processing: QueuePolicy,
    pub note_generation: QueuePolicy,
    pub file_forwarding: QueuePolicy,
}

/// Default retry policy of a queue.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct QueuePolicy {
    pub attempts: i32,
    /// Base delay for exponential backoff.
    pub backoff_ms: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NoteSettings {
    /// Days a generated note is kept before retention cleanup removes it.
    pub retention_days: i32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    pub token_expiry_hours: i64,
}

/// Database connection pool configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub max_connections: u32,
    pub min_connection: u32,
    pub max_lifetime: u64,
    pub idle_timeout: u64,
    pub acquire_timeout: u64,
}

/// Outbound integrations.
#[derive(Debug, Deserialize, Clone)]
pub struct IntegrationSettings {
    /// Receives the public URL of every upload. Empty or absent disables forwarding.
    #[serde(default)]
    pub external_webhook_url: Option<String>,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecretSettings {
    pub jwt: String,
    pub database_url: String,
    pub admin_email: String,
    pub admin_password: String,
}
