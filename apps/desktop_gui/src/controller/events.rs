//! UI/backend events and error modeling for desktop GUI controller.

use client_core::{PredictError, Preview, SelectionId, StagedFile};
use shared::domain::Prediction;

pub enum UiEvent {
    Error(UiError),
    FileLoaded(StagedFile),
    PreviewReady {
        selection: SelectionId,
        preview: Option<Preview>,
        image: Option<PreviewImage>,
    },
    PredictionFinished {
        selection: SelectionId,
        outcome: Result<Prediction, PredictError>,
    },
    ServiceChecked(Result<(), String>),
}

/// Decoded, bounded RGBA thumbnail ready for texture upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    LoadFile,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("could not read")
            || message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("no such file")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("unreachable")
            || message_lower.contains("disconnected")
            || message_lower.contains("unavailable")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Transport => "Connection",
        UiErrorCategory::Validation => "File",
        UiErrorCategory::Unknown => "Error",
    }
}
