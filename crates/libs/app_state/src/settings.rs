use crate::{
    ApiSettings, AuthSettings, DatabaseSettings, Environment, IntegrationSettings,
    LoggingSettings, NoteSettings, QueuePolicy, QueueSettings, RawSettings, SecretSettings,
};
use color_eyre::Result;
use common_types::queue::QueueName;
use std::path::{Path, PathBuf, absolute};

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub environment: Environment,
    pub logging: LoggingSettings,
    pub api: ApiSettings,
    pub uploads: UploadSettings,
    pub queue: QueueSettings,
    pub notes: NoteSettings,
    pub auth: AuthSettings,
    pub database: DatabaseSettings,
    pub integrations: IntegrationSettings,
    pub secrets: SecretSettings,
}

/// Upload configuration with directories resolved to absolute paths.
#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub upload_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub max_file_size_mb: u64,
    pub allowed_mime_types: Vec<String>,
    pub allowed_extensions: Vec<String>,
}

impl TryFrom<RawSettings> for AppSettings {
    type Error = color_eyre::Report;

    fn try_from(raw: RawSettings) -> Result<Self> {
        let uploads = UploadSettings {
            upload_dir: absolute(&raw.uploads.upload_dir)?,
            temp_dir: absolute(&raw.uploads.temp_dir)?,
            max_file_size_mb: raw.uploads.max_file_size_mb,
            allowed_mime_types: raw.uploads.allowed_mime_types,
            allowed_extensions: raw
                .uploads
                .allowed_extensions
                .into_iter()
                .map(|e| e.to_lowercase())
                .collect(),
        };

        Ok(Self {
            environment: raw.environment,
            logging: raw.logging,
            api: raw.api,
            uploads,
            queue: raw.queue,
            notes: raw.notes,
            auth: raw.auth,
            database: raw.database,
            integrations: raw.integrations,
            secrets: raw.secrets,
        })
    }
}

impl AppSettings {
    #[must_use]
    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

impl UploadSettings {
    #[must_use]
    pub const fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }

    /// Checks a bare `type/subtype` against the allow-list, ignoring case.
    #[must_use]
    pub fn is_allowed_mime_type(&self, essence: &str) -> bool {
        self.allowed_mime_types
            .iter()
            .any(|m| m.eq_ignore_ascii_case(essence))
    }

    /// Checks the lowercased extension of `file_name` against the allow-list.
    #[must_use]
    pub fn is_allowed_extension(&self, file_name: &str) -> bool {
        let Some(extension) = extension_with_dot(file_name) else {
            return false;
        };
        self.allowed_extensions.contains(&extension.to_lowercase())
    }
}

impl QueueSettings {
    #[must_use]
    pub const fn policy(&self, queue: QueueName) -> QueuePolicy {
        match queue {
            QueueName::FileProcessing => self.file_processing,
            QueueName::NoteGeneration => self.note_generation,
            QueueName::FileForwarding => self.file_forwarding,
        }
    }
}

impl IntegrationSettings {
    /// The configured webhook target, ignoring blank values.
    #[must_use]
    pub fn webhook_url(&self) -> Option<&str> {
        self.external_webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Extension of a file name including the leading dot, as given (`"a.MP3"` -> `".MP3"`).
#[must_use]
pub fn extension_with_dot(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
}
