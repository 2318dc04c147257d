//! Client settings: prediction service origin and request timeout.
//!
//! Resolution order is defaults, then `client.toml`, then environment, then
//! whatever override the front end applies (e.g. a `--api-url` flag).

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use shared::protocol::{DEFAULT_API_URL, HEALTH_PATH, PREDICT_PATH};
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "client.toml";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 600;

const API_URL_ENV_VARS: [&str; 2] = ["PREDICT_API_URL", "APP__API_URL"];
const TIMEOUT_ENV_VAR: &str = "APP__REQUEST_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_url: String,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    request_timeout_secs: Option<u64>,
}

impl ClientSettings {
    /// Replaces the origin when `api_url` is present and non-blank.
    pub fn with_api_url_override(mut self, api_url: Option<String>) -> Self {
        if let Some(value) = api_url.and_then(non_blank) {
            self.api_url = value;
        }
        self
    }

    pub fn predict_url(&self) -> Result<Url, ConfigError> {
        endpoint_url(&self.api_url, PREDICT_PATH)
    }

    pub fn health_url(&self) -> Result<Url, ConfigError> {
        endpoint_url(&self.api_url, HEALTH_PATH)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.predict_url().map(|_| ())
    }
}

/// Loads settings from the optional config file and the process environment.
///
/// An explicitly passed `config_path` must exist; the default `client.toml`
/// is optional.
pub fn load_settings(config_path: Option<&Path>) -> Result<ClientSettings, ConfigError> {
    let file = match config_path {
        Some(path) => Some(read_file_settings(path)?),
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                Some(read_file_settings(&default_path)?)
            } else {
                None
            }
        }
    };

    let settings = settings_from_sources(file, |name| std::env::var(name).ok())?;
    settings.validate()?;
    Ok(settings)
}

fn read_file_settings(path: &Path) -> Result<FileSettings, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str::<FileSettings>(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn settings_from_sources(
    file: Option<FileSettings>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings, ConfigError> {
    let mut settings = ClientSettings::default();

    if let Some(file) = file {
        if let Some(v) = file.api_url.and_then(non_blank) {
            settings.api_url = v;
        }
        if let Some(secs) = file.request_timeout_secs {
            settings.request_timeout = timeout_from_secs(secs)?;
        }
    }

    for name in API_URL_ENV_VARS {
        if let Some(v) = env(name).and_then(non_blank) {
            settings.api_url = v;
        }
    }

    if let Some(v) = env(TIMEOUT_ENV_VAR).and_then(non_blank) {
        let secs = v
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidTimeout(v.clone()))?;
        settings.request_timeout = timeout_from_secs(secs)?;
    }

    Ok(settings)
}

fn timeout_from_secs(secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidTimeout(secs.to_string()));
    }
    Ok(Duration::from_secs(secs))
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Appends `path` to the origin the same way a plain string join would, so an
/// origin carrying a path prefix (`http://host/api`) keeps it.
fn endpoint_url(api_url: &str, path: &str) -> Result<Url, ConfigError> {
    let base = api_url.trim().trim_end_matches('/');
    let joined = format!("{base}{path}");
    let url = Url::parse(&joined).map_err(|source| ConfigError::InvalidUrl {
        value: api_url.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme(api_url.to_string()));
    }
    Ok(url)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
