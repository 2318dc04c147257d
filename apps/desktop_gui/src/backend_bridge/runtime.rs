//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{
    generate_preview, load_staged_file, ClientSettings, HttpPredictionClient, PredictionService,
    Preview, StagedFile,
};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{PreviewImage, UiError, UiErrorContext, UiEvent};

const PREVIEW_MAX_DIMENSION: u32 = 1024;

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, settings: ClientSettings) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let client = match HttpPredictionClient::new(&settings) {
            Ok(client) => Arc::new(client),
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: {err}"),
                )));
                tracing::error!("failed to build prediction client: {err}");
                return;
            }
        };
        tracing::info!(url = %client.predict_url(), "backend worker ready");

        while let Ok(cmd) = cmd_rx.recv() {
            let client = client.clone();
            let ui_tx = ui_tx.clone();
            runtime.spawn(async move {
                handle_command(client.as_ref(), cmd, &ui_tx).await;
            });
        }
        tracing::debug!("ui command queue closed; backend worker exiting");
    });
}

async fn handle_command<S: PredictionService>(
    service: &S,
    cmd: BackendCommand,
    ui_tx: &Sender<UiEvent>,
) {
    match cmd {
        BackendCommand::LoadFile { path } => match load_staged_file(&path).await {
            Ok(file) => {
                let _ = ui_tx.try_send(UiEvent::FileLoaded(file));
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load selected file");
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::LoadFile,
                    err.user_message(),
                )));
            }
        },
        BackendCommand::LoadPreview { selection, file } => {
            let (preview, image) = match tokio::task::spawn_blocking(move || build_preview(&file))
                .await
            {
                Ok(result) => result,
                Err(err) => {
                    tracing::warn!(selection, "preview task failed: {err}");
                    (None, None)
                }
            };
            let _ = ui_tx.try_send(UiEvent::PreviewReady {
                selection,
                preview,
                image,
            });
        }
        BackendCommand::Predict { selection, file } => {
            let outcome = service.predict(file).await;
            // The UI is stuck in-flight until this arrives, so it must not be dropped.
            let _ = ui_tx.send(UiEvent::PredictionFinished { selection, outcome });
        }
        BackendCommand::CheckService => {
            let result = service.health().await.map_err(|err| err.to_string());
            let _ = ui_tx.try_send(UiEvent::ServiceChecked(result));
        }
    }
}

fn build_preview(file: &StagedFile) -> (Option<Preview>, Option<PreviewImage>) {
    let preview = Some(generate_preview(file));
    let image = match decode_preview_image(file.bytes()) {
        Ok(image) => Some(image),
        Err(err) => {
            tracing::debug!(file = %file.name(), "preview decode failed: {err}");
            None
        }
    };
    (preview, image)
}

pub fn decode_preview_image(bytes: &[u8]) -> Result<PreviewImage, String> {
    let dynamic = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let resized = dynamic
        .thumbnail(PREVIEW_MAX_DIMENSION, PREVIEW_MAX_DIMENSION)
        .to_rgba8();
    let width = resized.width() as usize;
    let height = resized.height() as usize;
    Ok(PreviewImage {
        width,
        height,
        rgba: resized.into_raw(),
    })
}
