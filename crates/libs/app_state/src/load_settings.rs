use crate::{AppSettings, RawSettings};
use color_eyre::eyre::{Result, WrapErr};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Loads `config/settings.yaml` relative to the working directory, overlaid with
/// `APP__*` environment variables, and makes sure the upload directories exist.
pub fn load_app_settings() -> Result<AppSettings> {
    load_settings_from_path(Path::new("config/settings.yaml"), true)
}

pub fn load_settings_from_path(path: &Path, create_dirs: bool) -> Result<AppSettings> {
    // Need to load from dotenv to get it to overwrite the db url from env.
    dotenv::from_path(".env").ok();
    let config_path = path
        .canonicalize()
        .wrap_err_with(|| format!("Settings file not found: {}", path.display()))?;

    let builder = config::Config::builder()
        .add_source(config::File::from(config_path))
        .add_source(
            config::Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("api.allowed_origins"),
        );

    let raw_settings = builder.build()?.try_deserialize::<RawSettings>()?;
    let settings = AppSettings::try_from(raw_settings)?;

    if create_dirs {
        fs::create_dir_all(&settings.uploads.upload_dir)
            .wrap_err("Cannot create upload folder")?;
        fs::create_dir_all(&settings.uploads.temp_dir).wrap_err("Cannot create temp folder")?;
    }
    debug!(
        "Loaded settings, uploads in {}",
        settings.uploads.upload_dir.display()
    );

    Ok(settings)
}
