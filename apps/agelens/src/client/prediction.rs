//! Prediction backend client.

use super::{AgePredictor, send, success_body};
use agelens_core::{
    ImageAsset, ModelId, ServiceError,
    formats::parse_prediction,
    primitives::{IMAGE_FIELD, MODEL_FIELD},
};
use reqwest::multipart::{Form, Part};

/// File name used when the asset does not carry one.
const FALLBACK_FILE_NAME: &str = "upload";

/// Posts a photo and model choice as a multipart form, reads back
/// `predicted_age`.
#[derive(Clone)]
pub struct PredictionClient {
    http: reqwest::Client,
    url: String,
}

impl PredictionClient {
    /// Create a client for the given prediction endpoint URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn form(image: &ImageAsset, model: &ModelId) -> Result<Form, ServiceError> {
        let part = Part::bytes(image.bytes().to_vec())
            .file_name(image.file_name().unwrap_or(FALLBACK_FILE_NAME).to_string())
            .mime_str(image.mime_type())
            .map_err(|e| ServiceError::Network(format!("cannot build image part: {e}")))?;

        Ok(Form::new()
            .part(IMAGE_FIELD, part)
            .text(MODEL_FIELD, model.as_str().to_string()))
    }
}

impl AgePredictor for PredictionClient {
    async fn predict(&self, image: &ImageAsset, model: &ModelId) -> Result<f64, ServiceError> {
        let form = Self::form(image, model)?;

        tracing::debug!(
            url = %self.url,
            model = %model,
            bytes = image.len(),
            "Sending prediction request"
        );

        let request = self.http.post(&self.url).multipart(form);
        let response = send(request, &self.url).await?;
        let body = success_body(response).await?;
        parse_prediction(&body)
    }
}
