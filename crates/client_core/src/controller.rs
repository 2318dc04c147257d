//! Submission controller: drives a [`SubmissionSession`] against a
//! [`PredictionService`], awaiting both suspension points inline.

use std::path::Path;

use tracing::info;

use crate::{
    error::{PredictError, SessionError},
    preview::{await_preview, load_staged_file, spawn_preview, StagedFile},
    session::{SelectionId, StatusView, SubmissionPhase, SubmissionSession},
    transport::PredictionService,
};

pub struct SubmissionController<S: PredictionService> {
    session: SubmissionSession,
    service: S,
}

impl<S: PredictionService> SubmissionController<S> {
    pub fn new(service: S) -> Self {
        Self {
            session: SubmissionSession::new(),
            service,
        }
    }

    pub fn session(&self) -> &SubmissionSession {
        &self.session
    }

    pub fn view(&self) -> StatusView<'_> {
        self.session.view()
    }

    /// Reads `path`, stages it and generates its preview.
    pub async fn select_path(&mut self, path: &Path) -> Result<SelectionId, SessionError> {
        if self.session.is_in_flight() {
            return Err(SessionError::InFlight);
        }
        let file = load_staged_file(path).await?;
        self.select_file(file).await
    }

    pub async fn select_file(&mut self, file: StagedFile) -> Result<SelectionId, SessionError> {
        let selection = self.session.stage(file.clone())?;
        let preview = await_preview(spawn_preview(file)).await;
        self.session.attach_preview(selection, preview);
        Ok(selection)
    }

    /// Submits the staged file once and always lands in a terminal phase.
    /// Only a local rejection (nothing staged, already in flight) returns `Err`.
    pub async fn submit(&mut self) -> Result<SubmissionPhase, SessionError> {
        let ticket = self.session.begin_submit()?;
        let outcome = self.service.predict(ticket.file).await;
        self.session.complete(outcome)
    }

    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.session.reset()
    }

    pub async fn check_service(&self) -> Result<(), PredictError> {
        self.service.health().await?;
        info!("prediction service is reachable");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
