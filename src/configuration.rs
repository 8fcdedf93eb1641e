use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::routing::RouteTable;
use crate::session::FileSessionStore;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub routes: RouteTable,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            routes: RouteTable::default(),
            session: SessionSettings::default(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionSettings {
    /// Session file; the platform config directory when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl SessionSettings {
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(FileSessionStore::default_path)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Load settings from `configuration.{yaml,toml,json}` in the working
/// directory (optional) and `ROLEGATE__*` environment variables.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    get_configuration_from(None)
}

/// Same as [`get_configuration`], but reads `file` instead of the default
/// `configuration` file. An explicit file must exist.
pub fn get_configuration_from(file: Option<&Path>) -> Result<Settings, config::ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let source = match file {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name("configuration").required(false),
    };

    // e.g. ROLEGATE__ROUTES__ADMIN=/dashboard
    let settings = config::Config::builder()
        .add_source(source)
        .add_source(config::Environment::with_prefix("ROLEGATE").separator("__"))
        .build()?;

    settings.try_deserialize()
}
