//! Backend commands queued from UI to backend worker.

use client_core::{SelectionId, StagedFile};
use std::path::PathBuf;

pub enum BackendCommand {
    LoadFile {
        path: PathBuf,
    },
    LoadPreview {
        selection: SelectionId,
        file: StagedFile,
    },
    Predict {
        selection: SelectionId,
        file: StagedFile,
    },
    CheckService,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::LoadFile { .. } => "load_file",
            BackendCommand::LoadPreview { .. } => "load_preview",
            BackendCommand::Predict { .. } => "predict",
            BackendCommand::CheckService => "check_service",
        }
    }
}
