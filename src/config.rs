//! Configuration for the Gantt filter client.
//!
//! Stored as TOML at `~/.config/gantt-filter/config.toml` (or the XDG
//! equivalent). Environment variables override file values; a `.env` file is
//! honored through `dotenvy`.
//!
//! # Example Configuration
//!
//! ```toml
//! result_mode = "HIGHLIGHT"
//!
//! [api]
//! base_url = "https://pm.example.org/api"
//! timeout_secs = 15
//! ```
//!
//! # Environment
//!
//! - `GANTT_FILTER_API_URL`
//! - `GANTT_FILTER_TIMEOUT_SECS`
//! - `GANTT_FILTER_RESULT_MODE`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::behavior::ResultMode;

pub const ENV_API_URL: &str = "GANTT_FILTER_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "GANTT_FILTER_TIMEOUT_SECS";
pub const ENV_RESULT_MODE: &str = "GANTT_FILTER_RESULT_MODE";

const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Errors that can occur when loading or saving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Remote API connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL the `gantt/{uid}/...` endpoints hang off.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub api: ApiConfig,

    /// Result mode a new controller starts in.
    #[serde(default)]
    pub result_mode: ResultMode,
}

impl FilterConfig {
    /// Load from the default location, then apply env overrides.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::resolve(None, None)
    }

    /// Load from an explicit path, then apply env overrides.
    ///
    /// Unlike [`FilterConfig::load`], the file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::resolve(Some(path), None)
    }

    /// Layer file, environment and an explicit base URL override, in that
    /// order, and validate only the result.
    pub fn resolve(path: Option<&Path>, api_url: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::read_file(path, true)?,
            None => Self::read_file(&Self::config_path()?, false)?,
        };
        config.apply_env();
        if let Some(url) = api_url {
            config.api.base_url = url.trim().to_string();
        }
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path, required: bool) -> Result<Self, ConfigError> {
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default configuration file path.
    ///
    /// `$XDG_CONFIG_HOME/gantt-filter/config.toml` when set, otherwise the
    /// platform config dir.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return Ok(PathBuf::from(xdg_config)
                .join("gantt-filter")
                .join("config.toml"));
        }

        dirs::config_dir()
            .map(|p| p.join("gantt-filter").join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Overlay environment variables. Unparseable values are logged and skipped.
    pub fn apply_env(&mut self) {
        if let Ok(val) = dotenvy::var(ENV_API_URL)
            && !val.trim().is_empty()
        {
            self.api.base_url = val.trim().to_string();
        }
        if let Ok(val) = dotenvy::var(ENV_TIMEOUT_SECS) {
            match val.trim().parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(e) => warn!(value = %val, "ignoring {ENV_TIMEOUT_SECS}: {e}"),
            }
        }
        if let Ok(val) = dotenvy::var(ENV_RESULT_MODE) {
            match val.parse::<ResultMode>() {
                Ok(mode) => self.result_mode = mode,
                Err(e) => warn!("ignoring {ENV_RESULT_MODE}: {e}"),
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.api.base_url).map_err(|e| {
            ConfigError::Validation(format!("invalid api.base_url '{}': {e}", self.api.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "api.base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "api.timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
