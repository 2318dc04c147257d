//! Upload lifecycle state machine.
//!
//! `Idle -> Staged -> InFlight -> Resolved | Failed`, with reset back to
//! `Idle` from anywhere except `InFlight`. Each state carries only the data
//! valid in it, so a prediction and an error can never coexist.

use shared::domain::{Prediction, NO_FILE_SELECTED_MESSAGE};
use tracing::{debug, info, warn};

use crate::{
    error::{PredictError, SessionError},
    preview::{Preview, StagedFile},
};

/// Tags each staging so a late preview for a replaced file can be dropped.
pub type SelectionId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedUpload {
    selection: SelectionId,
    file: StagedFile,
    preview: Option<Preview>,
}

impl StagedUpload {
    pub fn selection(&self) -> SelectionId {
        self.selection
    }

    pub fn file(&self) -> &StagedFile {
        &self.file
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Staged(StagedUpload),
    InFlight(StagedUpload),
    Resolved {
        upload: StagedUpload,
        prediction: Prediction,
    },
    Failed {
        upload: StagedUpload,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    Staged,
    InFlight,
    Resolved,
    Failed,
}

impl SubmissionState {
    pub fn phase(&self) -> SubmissionPhase {
        match self {
            Self::Idle => SubmissionPhase::Idle,
            Self::Staged(_) => SubmissionPhase::Staged,
            Self::InFlight(_) => SubmissionPhase::InFlight,
            Self::Resolved { .. } => SubmissionPhase::Resolved,
            Self::Failed { .. } => SubmissionPhase::Failed,
        }
    }

    fn upload(&self) -> Option<&StagedUpload> {
        match self {
            Self::Idle => None,
            Self::Staged(upload) | Self::InFlight(upload) => Some(upload),
            Self::Resolved { upload, .. } | Self::Failed { upload, .. } => Some(upload),
        }
    }

    fn upload_mut(&mut self) -> Option<&mut StagedUpload> {
        match self {
            Self::Idle => None,
            Self::Staged(upload) | Self::InFlight(upload) => Some(upload),
            Self::Resolved { upload, .. } | Self::Failed { upload, .. } => Some(upload),
        }
    }
}

/// What the single status area shows. Exactly one of these at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusView<'a> {
    Empty,
    Validation(&'a str),
    Prediction {
        headline: &'static str,
        message: &'a str,
        positive: bool,
    },
    Failure(&'a str),
}

/// Handed out by [`SubmissionSession::begin_submit`]; owns a copy of the
/// staged payload for the one request it authorizes.
#[derive(Debug, Clone)]
pub struct SubmitTicket {
    pub selection: SelectionId,
    pub file: StagedFile,
}

#[derive(Debug)]
pub struct SubmissionSession {
    state: SubmissionState,
    notice: Option<&'static str>,
    last_selection: SelectionId,
}

impl Default for SubmissionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionSession {
    pub fn new() -> Self {
        Self {
            state: SubmissionState::Idle,
            notice: None,
            last_selection: 0,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.state.phase()
    }

    pub fn is_in_flight(&self) -> bool {
        self.phase() == SubmissionPhase::InFlight
    }

    pub fn staged_upload(&self) -> Option<&StagedUpload> {
        self.state.upload()
    }

    pub fn staged_file(&self) -> Option<&StagedFile> {
        self.state.upload().map(StagedUpload::file)
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.state.upload().and_then(StagedUpload::preview)
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        match &self.state {
            SubmissionState::Resolved { prediction, .. } => Some(prediction),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            SubmissionState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn can_select(&self) -> bool {
        !self.is_in_flight()
    }

    pub fn can_submit(&self) -> bool {
        !self.is_in_flight() && self.staged_file().is_some()
    }

    /// True when there is something to clear and nothing in flight.
    pub fn can_reset(&self) -> bool {
        !matches!(self.phase(), SubmissionPhase::Idle | SubmissionPhase::InFlight)
    }

    /// Stages `file`, replacing any earlier file and discarding any prior
    /// prediction or error. Rejected while a request is in flight.
    pub fn stage(&mut self, file: StagedFile) -> Result<SelectionId, SessionError> {
        if self.is_in_flight() {
            warn!(file = %file.name(), "file selection rejected while request is in flight");
            return Err(SessionError::InFlight);
        }

        if !file.is_image() {
            warn!(file = %file.name(), mime = %file.mime_type(), "staged file is not an image");
        }

        self.last_selection += 1;
        let selection = self.last_selection;
        info!(
            selection,
            file = %file.name(),
            bytes = file.size(),
            mime = %file.mime_type(),
            "file staged"
        );
        self.notice = None;
        self.state = SubmissionState::Staged(StagedUpload {
            selection,
            file,
            preview: None,
        });
        Ok(selection)
    }

    /// Attaches a finished preview if `selection` is still the staged file.
    /// Returns whether it was applied.
    pub fn attach_preview(&mut self, selection: SelectionId, preview: Option<Preview>) -> bool {
        match self.state.upload_mut() {
            Some(upload) if upload.selection == selection => {
                if preview.is_none() {
                    debug!(selection, "no preview available for staged file");
                }
                upload.preview = preview;
                true
            }
            _ => {
                debug!(selection, "discarding preview for a file that is no longer staged");
                false
            }
        }
    }

    /// Moves to `InFlight` and hands out the payload for exactly one request.
    ///
    /// With nothing staged this records the "no file" notice and leaves the
    /// state untouched; no request may be issued in that case.
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, SessionError> {
        let upload = match std::mem::replace(&mut self.state, SubmissionState::Idle) {
            SubmissionState::Idle => {
                self.notice = Some(NO_FILE_SELECTED_MESSAGE);
                debug!("submit rejected: no file staged");
                return Err(SessionError::NoFileSelected);
            }
            in_flight @ SubmissionState::InFlight(_) => {
                self.state = in_flight;
                return Err(SessionError::InFlight);
            }
            SubmissionState::Staged(upload)
            | SubmissionState::Resolved { upload, .. }
            | SubmissionState::Failed { upload, .. } => upload,
        };

        let ticket = SubmitTicket {
            selection: upload.selection,
            file: upload.file.clone(),
        };
        info!(selection = upload.selection, file = %upload.file.name(), "submission in flight");
        self.notice = None;
        self.state = SubmissionState::InFlight(upload);
        Ok(ticket)
    }

    /// Resolves the in-flight request. Failures of any kind become the
    /// generic `Failed` message; the detail is only logged.
    pub fn complete(
        &mut self,
        outcome: Result<Prediction, PredictError>,
    ) -> Result<SubmissionPhase, SessionError> {
        let upload = match std::mem::replace(&mut self.state, SubmissionState::Idle) {
            SubmissionState::InFlight(upload) => upload,
            other => {
                warn!(phase = ?other.phase(), "ignoring completion with no request in flight");
                self.state = other;
                return Err(SessionError::NotInFlight);
            }
        };

        self.state = match outcome {
            Ok(prediction) => {
                info!(
                    selection = upload.selection,
                    classification = ?prediction.classification(),
                    "submission resolved"
                );
                SubmissionState::Resolved { upload, prediction }
            }
            Err(err) => {
                warn!(selection = upload.selection, error = %err, "submission failed");
                SubmissionState::Failed {
                    upload,
                    message: err.user_message().to_string(),
                }
            }
        };
        Ok(self.phase())
    }

    /// Clears file, preview, prediction and error. Rejected while in flight.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        if self.is_in_flight() {
            warn!("reset rejected while request is in flight");
            return Err(SessionError::InFlight);
        }
        debug!(from = ?self.phase(), "session reset");
        self.state = SubmissionState::Idle;
        self.notice = None;
        Ok(())
    }

    pub fn view(&self) -> StatusView<'_> {
        match &self.state {
            SubmissionState::Idle => match self.notice {
                Some(notice) => StatusView::Validation(notice),
                None => StatusView::Empty,
            },
            SubmissionState::Staged(_) | SubmissionState::InFlight(_) => StatusView::Empty,
            SubmissionState::Resolved { prediction, .. } => StatusView::Prediction {
                headline: prediction.headline(),
                message: prediction.message(),
                positive: prediction.classification().is_positive(),
            },
            SubmissionState::Failed { message, .. } => StatusView::Failure(message),
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
