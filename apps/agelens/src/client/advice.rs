//! Advice clients.
//!
//! [`GeminiClient`] holds the generative credential and is only constructed
//! by the proxy server. [`ProxyAdviceClient`] is what the workflow side uses:
//! it ships the two ages to the proxy and never sees the credential.

use super::{AdviceSource, send, success_body};
use agelens_core::{
    AdviceBundle, AdviceRequest, AdviceResponse, AdviceTone, GenerateContentRequest,
    GenerateContentResponse, ServiceError, build_prompt,
};

/// Header carrying the generative API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

// =============================================================================
// GENERATIVE BACKEND
// =============================================================================

/// Direct client for the generative text endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    /// Build the prompt for the comparison, call the backend, and parse the
    /// advice. Returns the prompt branch alongside the bundle.
    pub async fn generate(
        &self,
        predicted_age: f64,
        actual_age: u32,
    ) -> Result<(AdviceTone, AdviceBundle), ServiceError> {
        let prompt = build_prompt(predicted_age, actual_age);
        tracing::debug!(
            tone = ?prompt.tone,
            predicted_age,
            actual_age,
            "Requesting advice from generative backend"
        );

        let body = GenerateContentRequest::json_prompt(prompt.text);
        let request = self
            .http
            .post(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body);

        let response = send(request, &self.url).await?;
        let bytes = success_body(response).await?;
        let advice = GenerateContentResponse::advice_from_body(&bytes)?;
        Ok((prompt.tone, advice))
    }
}

impl AdviceSource for GeminiClient {
    async fn fetch_advice(
        &self,
        predicted_age: f64,
        actual_age: u32,
    ) -> Result<AdviceBundle, ServiceError> {
        self.generate(predicted_age, actual_age)
            .await
            .map(|(_, advice)| advice)
    }
}

// =============================================================================
// ADVICE PROXY
// =============================================================================

/// Client for the advice proxy's `POST /advice`.
#[derive(Clone)]
pub struct ProxyAdviceClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl ProxyAdviceClient {
    /// Create a client pointing at the proxy base URL, with optional Bearer auth.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/advice", self.base_url)
    }
}

impl AdviceSource for ProxyAdviceClient {
    async fn fetch_advice(
        &self,
        predicted_age: f64,
        actual_age: u32,
    ) -> Result<AdviceBundle, ServiceError> {
        let url = self.endpoint();
        let body = AdviceRequest {
            predicted_age,
            actual_age,
        };

        let mut request = self.http.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        tracing::debug!(url = %url, "Requesting advice from proxy");
        let response = send(request, &url).await?;
        let bytes = success_body(response).await?;
        let parsed: AdviceResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ServiceError::MalformedResponse(format!("invalid proxy response: {e}")))?;
        parsed.into_advice()
    }
}
