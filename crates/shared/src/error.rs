use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed prediction body: {0}")]
    MalformedBody(#[from] serde_json::Error),
}
