use super::*;

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::http::StatusCode;
use shared::domain::{Prediction, PROCESSING_FAILED_MESSAGE};

use crate::{
    config::ClientSettings, test_support::spawn_predict_server, transport::HttpPredictionClient,
};

/// Counts requests and replays a canned answer.
struct ScriptedService {
    calls: Arc<AtomicUsize>,
    reply: fn() -> Result<Prediction, PredictError>,
}

impl ScriptedService {
    fn new(reply: fn() -> Result<Prediction, PredictError>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: calls.clone(),
                reply,
            },
            calls,
        )
    }
}

#[async_trait]
impl PredictionService for ScriptedService {
    async fn predict(&self, _file: StagedFile) -> Result<Prediction, PredictError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.reply)()
    }

    async fn health(&self) -> Result<(), PredictError> {
        Ok(())
    }
}

fn http_controller(server_url: &str) -> SubmissionController<HttpPredictionClient> {
    let settings = ClientSettings {
        api_url: server_url.to_string(),
        request_timeout: Duration::from_secs(5),
    };
    SubmissionController::new(HttpPredictionClient::new(&settings).expect("client"))
}

fn xray() -> StagedFile {
    StagedFile::from_bytes("xray.jpg", b"fake-jpeg-bytes".to_vec())
}

#[tokio::test]
async fn scenario_positive_prediction() {
    let (server_url, uploads) =
        spawn_predict_server(StatusCode::OK, r#"{ "msg": "Positive", "code": 1 }"#)
            .await
            .expect("spawn server");
    let mut controller = http_controller(&server_url);

    controller.select_file(xray()).await.expect("stage");
    assert!(controller.session().preview().is_some());

    let phase = controller.submit().await.expect("submit");
    assert_eq!(phase, SubmissionPhase::Resolved);
    assert_eq!(
        controller.view(),
        StatusView::Prediction {
            headline: "COVID-19 Detected",
            message: "Positive",
            positive: true,
        }
    );
    assert_eq!(uploads.lock().await.len(), 1);
}

#[tokio::test]
async fn scenario_negative_prediction() {
    let (server_url, _uploads) =
        spawn_predict_server(StatusCode::OK, r#"{ "msg": "Negative", "code": 0 }"#)
            .await
            .expect("spawn server");
    let mut controller = http_controller(&server_url);

    controller.select_file(xray()).await.expect("stage");
    controller.submit().await.expect("submit");
    assert_eq!(
        controller.view(),
        StatusView::Prediction {
            headline: "No COVID-19 Detected",
            message: "Negative",
            positive: false,
        }
    );
}

#[tokio::test]
async fn scenario_server_error_fails_with_generic_message() {
    let (server_url, _uploads) = spawn_predict_server(StatusCode::INTERNAL_SERVER_ERROR, "boom")
        .await
        .expect("spawn server");
    let mut controller = http_controller(&server_url);

    controller.select_file(xray()).await.expect("stage");
    let phase = controller.submit().await.expect("submit");
    assert_eq!(phase, SubmissionPhase::Failed);
    assert_eq!(
        controller.view(),
        StatusView::Failure(PROCESSING_FAILED_MESSAGE)
    );
    assert!(controller.session().prediction().is_none());
}

#[tokio::test]
async fn malformed_body_fails_without_panicking() {
    let (server_url, _uploads) = spawn_predict_server(StatusCode::OK, r#"{ "message": 1 }"#)
        .await
        .expect("spawn server");
    let mut controller = http_controller(&server_url);

    controller.select_file(xray()).await.expect("stage");
    let phase = controller.submit().await.expect("submit");
    assert_eq!(phase, SubmissionPhase::Failed);
}

#[tokio::test]
async fn scenario_submit_without_file_issues_no_request() {
    let (service, calls) = ScriptedService::new(|| Ok(Prediction::new("Positive", 1)));
    let mut controller = SubmissionController::new(service);

    let err = controller.submit().await.expect_err("no file");
    assert!(matches!(err, SessionError::NoFileSelected));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(controller.session().phase(), SubmissionPhase::Idle);
    assert_eq!(
        controller.view(),
        StatusView::Validation("Please select a file first")
    );
}

#[tokio::test]
async fn every_submission_ends_in_exactly_one_terminal_state() {
    let replies: [fn() -> Result<Prediction, PredictError>; 3] = [
        || Ok(Prediction::new("Positive", 1)),
        || Ok(Prediction::new("Negative", 0)),
        || Err(PredictError::Status(StatusCode::SERVICE_UNAVAILABLE)),
    ];

    for reply in replies {
        let (service, calls) = ScriptedService::new(reply);
        let mut controller = SubmissionController::new(service);
        controller.select_file(xray()).await.expect("stage");

        let phase = controller.submit().await.expect("submit");
        assert!(matches!(
            phase,
            SubmissionPhase::Resolved | SubmissionPhase::Failed
        ));
        assert!(!controller.session().is_in_flight());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(
            controller.session().prediction().is_some()
                != controller.session().error_message().is_some()
        );
    }
}

#[tokio::test]
async fn select_path_stages_file_with_preview() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("xray.png");
    tokio::fs::write(&path, b"png-bytes").await.expect("write");

    let (service, _calls) = ScriptedService::new(|| Ok(Prediction::new("Negative", 0)));
    let mut controller = SubmissionController::new(service);
    controller.select_path(&path).await.expect("select");

    let session = controller.session();
    assert_eq!(session.staged_file().map(StagedFile::name), Some("xray.png"));
    let preview = session.preview().expect("preview");
    assert!(preview.data_uri().starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn unreadable_path_leaves_session_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (service, _calls) = ScriptedService::new(|| Ok(Prediction::new("Negative", 0)));
    let mut controller = SubmissionController::new(service);
    controller.select_file(xray()).await.expect("stage");

    let err = controller
        .select_path(&dir.path().join("gone.jpg"))
        .await
        .expect_err("unreadable");
    assert!(matches!(err, SessionError::UnreadableFile { .. }));
    assert_eq!(
        controller.session().staged_file().map(StagedFile::name),
        Some("xray.jpg")
    );
}

#[tokio::test]
async fn reset_after_resolution_clears_everything() {
    let (service, _calls) = ScriptedService::new(|| Ok(Prediction::new("Positive", 1)));
    let mut controller = SubmissionController::new(service);
    controller.select_file(xray()).await.expect("stage");
    controller.submit().await.expect("submit");

    controller.reset().expect("reset");
    let session = controller.session();
    assert_eq!(session.phase(), SubmissionPhase::Idle);
    assert!(session.staged_file().is_none());
    assert!(session.preview().is_none());
    assert!(session.prediction().is_none());
    assert_eq!(controller.view(), StatusView::Empty);
}

#[tokio::test]
async fn check_service_uses_health_probe() {
    let (server_url, uploads) = spawn_predict_server(StatusCode::OK, "{}")
        .await
        .expect("spawn server");
    let controller = http_controller(&server_url);

    controller.check_service().await.expect("healthy");
    assert!(uploads.lock().await.is_empty());
}
