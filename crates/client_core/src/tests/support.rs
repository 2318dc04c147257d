//! In-process prediction service used by transport and controller tests.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone)]
pub(crate) struct ReceivedUpload {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
struct ServerState {
    status: StatusCode,
    body: String,
    uploads: Arc<Mutex<Vec<ReceivedUpload>>>,
}

async fn handle_predict(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> (StatusCode, String) {
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        state.uploads.lock().await.push(ReceivedUpload {
            field: name,
            file_name,
            content_type,
            bytes,
        });
    }
    (state.status, state.body.clone())
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(json!(["It is working."]))
}

pub(crate) async fn spawn_predict_server(
    status: StatusCode,
    body: impl Into<String>,
) -> Result<(String, Arc<Mutex<Vec<ReceivedUpload>>>)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let uploads = Arc::new(Mutex::new(Vec::new()));
    let state = ServerState {
        status,
        body: body.into(),
        uploads: uploads.clone(),
    };
    let app = Router::new()
        .route("/", get(handle_health))
        .route("/predict", post(handle_predict))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), uploads))
}
