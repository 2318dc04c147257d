use serde::Deserialize;
use serde_json::Number;

use crate::{domain::Prediction, error::ProtocolError};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const PREDICT_PATH: &str = "/predict";
pub const HEALTH_PATH: &str = "/";
/// Multipart part name the prediction service reads the image from.
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Body returned by `POST /predict` on success. `code` is any JSON number;
/// a non-numeric code is a malformed body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PredictResponse {
    pub msg: String,
    pub code: Number,
}

impl PredictResponse {
    pub fn from_slice(body: &[u8]) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_slice(body)?)
    }
}

impl From<PredictResponse> for Prediction {
    fn from(value: PredictResponse) -> Self {
        Prediction::new(value.msg, value.code)
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
