//! Client core for the X-ray prediction service: local preview generation,
//! the upload lifecycle state machine and the HTTP prediction contract.

pub mod config;
pub mod controller;
pub mod error;
pub mod preview;
pub mod session;
pub mod transport;

pub use config::{load_settings, ClientSettings};
pub use controller::SubmissionController;
pub use error::{ConfigError, PredictError, SessionError};
pub use preview::{
    generate_preview, human_readable_bytes, load_staged_file, spawn_preview, Preview, StagedFile,
};
pub use session::{
    SelectionId, StagedUpload, StatusView, SubmissionPhase, SubmissionSession, SubmissionState,
    SubmitTicket,
};
pub use transport::{HttpPredictionClient, PredictionService};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
