//! # Service Clients
//!
//! HTTP clients for the two remote services of the workflow, behind the
//! traits the [`WorkflowController`](crate::workflow::WorkflowController)
//! is generic over.
//!
//! Every call is a single attempt: no retries, no backoff, no timeout beyond
//! what the transport itself enforces.

mod advice;
mod prediction;

pub use advice::{GeminiClient, ProxyAdviceClient};
pub use prediction::PredictionClient;

use agelens_core::{AdviceBundle, ImageAsset, ModelId, ServiceError, formats};
use std::future::Future;

// =============================================================================
// SEAMS
// =============================================================================

/// Something that turns a photo into a predicted age.
pub trait AgePredictor: Send + Sync {
    /// Send exactly one prediction request.
    fn predict(
        &self,
        image: &ImageAsset,
        model: &ModelId,
    ) -> impl Future<Output = Result<f64, ServiceError>> + Send;
}

/// Something that turns an age comparison into advice.
pub trait AdviceSource: Send + Sync {
    /// Send exactly one advice request.
    fn fetch_advice(
        &self,
        predicted_age: f64,
        actual_age: u32,
    ) -> impl Future<Output = Result<AdviceBundle, ServiceError>> + Send;
}

// =============================================================================
// SHARED TRANSPORT HELPERS
// =============================================================================

/// Send a request, mapping transport failures to `Network`.
async fn send(
    request: reqwest::RequestBuilder,
    target: &str,
) -> Result<reqwest::Response, ServiceError> {
    request
        .send()
        .await
        .map_err(|e| ServiceError::Network(format!("{target}: {e}")))
}

/// Read the body of a successful response, or turn a failure status into
/// `Server` with the best message the body offers.
async fn success_body(response: reqwest::Response) -> Result<Vec<u8>, ServiceError> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| ServiceError::Network(format!("reading response body: {e}")))?;

    if status.is_success() {
        return Ok(body.to_vec());
    }

    let message = formats::error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string()
    });
    Err(ServiceError::Server {
        status: status.as_u16(),
        message,
    })
}
