//! Error taxonomy for staging, submission, transport and configuration.

use std::path::PathBuf;

use reqwest::StatusCode;
use shared::{
    domain::{NO_FILE_SELECTED_MESSAGE, PROCESSING_FAILED_MESSAGE},
    error::ProtocolError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("invalid prediction endpoint: {0}")]
    InvalidEndpoint(#[from] ConfigError),
    #[error("prediction request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("prediction service returned {0}")]
    Status(StatusCode),
    #[error("invalid prediction response payload: {0}")]
    MalformedResponse(#[from] ProtocolError),
    #[error("prediction worker unavailable: {0}")]
    Unavailable(String),
}

impl PredictError {
    /// Every failure collapses to one generic message; the detailed `Display`
    /// is only for logs.
    pub fn user_message(&self) -> &'static str {
        PROCESSING_FAILED_MESSAGE
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no file selected")]
    NoFileSelected,
    #[error("a prediction request is already in flight")]
    InFlight,
    #[error("no prediction request is in flight")]
    NotInFlight,
    #[error("could not read '{}': {source}", path.display())]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SessionError {
    pub fn user_message(&self) -> String {
        match self {
            Self::NoFileSelected => NO_FILE_SELECTED_MESSAGE.to_string(),
            Self::InFlight => "A prediction is already in progress; please wait".to_string(),
            Self::NotInFlight => "No prediction is in progress".to_string(),
            Self::UnreadableFile { path, .. } => {
                format!("Could not read {}", path.display())
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid api url '{value}': {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("api url '{0}' must use http or https")]
    UnsupportedScheme(String),
    #[error("invalid request timeout '{0}'")]
    InvalidTimeout(String),
}
