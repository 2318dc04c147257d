//! HTTP contract with the remote prediction service.

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::{
    domain::Prediction,
    protocol::{PredictResponse, UPLOAD_FIELD_NAME},
};
use tracing::{debug, info, warn};
use url::Url;

use crate::{config::ClientSettings, error::PredictError, preview::StagedFile};

#[async_trait]
pub trait PredictionService: Send + Sync {
    /// Issues exactly one prediction request for `file`.
    async fn predict(&self, file: StagedFile) -> Result<Prediction, PredictError>;
    async fn health(&self) -> Result<(), PredictError>;
}

pub struct HttpPredictionClient {
    http: Client,
    predict_url: Url,
    health_url: Url,
}

impl HttpPredictionClient {
    pub fn new(settings: &ClientSettings) -> Result<Self, PredictError> {
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self {
            http,
            predict_url: settings.predict_url()?,
            health_url: settings.health_url()?,
        })
    }

    pub fn predict_url(&self) -> &Url {
        &self.predict_url
    }
}

#[async_trait]
impl PredictionService for HttpPredictionClient {
    async fn predict(&self, file: StagedFile) -> Result<Prediction, PredictError> {
        let (name, mime_type, bytes) = file.into_parts();
        let size = bytes.len();
        let part = Part::bytes(bytes).file_name(name.clone()).mime_str(&mime_type)?;
        let form = Form::new().part(UPLOAD_FIELD_NAME, part);

        debug!(url = %self.predict_url, file = %name, bytes = size, "sending prediction request");
        let response = self
            .http
            .post(self.predict_url.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, file = %name, "prediction service rejected request");
            return Err(PredictError::Status(status));
        }

        let body = response.bytes().await?;
        let prediction: Prediction = PredictResponse::from_slice(&body)?.into();
        info!(
            file = %name,
            code = %prediction.code(),
            classification = ?prediction.classification(),
            "prediction received"
        );
        Ok(prediction)
    }

    async fn health(&self) -> Result<(), PredictError> {
        let status = self
            .http
            .get(self.health_url.clone())
            .send()
            .await?
            .status();
        if status.is_success() {
            Ok(())
        } else {
            Err(PredictError::Status(status))
        }
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
