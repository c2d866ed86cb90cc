//! Configuration file utilities
//!
//! Service settings (where to upload, how long to wait) live in
//! `config.json` under the platform config directory, in a
//! "hockey-upload/" subfolder. Environment and command line override it.

use crate::error::UploadError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "hockey-upload";
const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_BASE_URL: &str = "https://rink.hockeyapp.net";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment variable overriding the service host.
pub const API_HOST_ENV: &str = "HOCKEY_API_HOST";

/// Settings for talking to the distribution service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ServiceConfig {
    /// Load from the config dir, then apply `HOCKEY_API_HOST`.
    ///
    /// A missing config file is not an error; defaults are used.
    pub fn load() -> Result<Self, UploadError> {
        let config = load_config_file::<ServiceConfig>(&config_file_path(CONFIG_FILE_NAME)?)?
            .unwrap_or_default();
        Ok(config.with_env_override(|var| env::var(var).ok()))
    }

    pub fn with_env_override<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(API_HOST_ENV).filter(|h| !h.trim().is_empty()) {
            self.base_url = host;
        }
        self
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// Get the app's config directory path.
///
/// Returns: `~/.config/hockey-upload` (Linux)
///          `~/Library/Application Support/hockey-upload` (macOS)
pub fn get_config_dir() -> Result<PathBuf, UploadError> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| UploadError::Config("Could not find config directory".to_string()))?;
    Ok(config_dir.join(APP_DIR_NAME))
}

/// Get the directory where log files and debug reports are written.
///
/// Returns: `~/.hockey-upload/logs`
pub fn get_logs_dir() -> Result<PathBuf, UploadError> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| UploadError::Config("Could not find home directory".to_string()))?;
    Ok(home_dir.join(format!(".{}", APP_DIR_NAME)).join("logs"))
}

/// Get the full path to a config file.
pub fn config_file_path(filename: &str) -> Result<PathBuf, UploadError> {
    Ok(get_config_dir()?.join(filename))
}

/// Load JSON data from `path`.
///
/// # Returns
/// * `Ok(Some(data))` if file exists and was parsed successfully
/// * `Ok(None)` if file doesn't exist
/// * `Err(...)` if file exists but couldn't be read/parsed
pub fn load_config_file<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, UploadError> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| UploadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let data = serde_json::from_str(&contents)
        .map_err(|e| UploadError::Config(format!("Failed to parse config file: {}", e)))?;

    Ok(Some(data))
}
