//! Advice proxy request and response shapes.
//!
//! The workflow side sends only the two ages; the proxy owns the prompt
//! policy and the generative backend credential.

use crate::prompt::AdviceTone;
use crate::{AdviceBundle, ServiceError, WorkflowError};
use serde::{Deserialize, Serialize};

/// Body of `POST /advice`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdviceRequest {
    pub predicted_age: f64,
    pub actual_age: u32,
}

impl AdviceRequest {
    /// Check the parameters before any prompt is built.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if !self.predicted_age.is_finite() || self.predicted_age < 0.0 {
            return Err(WorkflowError::InvalidAge(self.predicted_age.to_string()));
        }
        if self.actual_age == 0 {
            return Err(WorkflowError::InvalidAge(self.actual_age.to_string()));
        }
        Ok(())
    }
}

/// Body returned by `POST /advice`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceResponse {
    pub success: bool,
    #[serde(default)]
    pub tone: Option<AdviceTone>,
    #[serde(default)]
    pub advice: Option<AdviceBundle>,
    #[serde(default)]
    pub error: Option<String>,
}

impl AdviceResponse {
    pub fn success(tone: AdviceTone, advice: AdviceBundle) -> Self {
        Self {
            success: true,
            tone: Some(tone),
            advice: Some(advice),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            tone: None,
            advice: None,
            error: Some(msg.into()),
        }
    }

    /// Unwrap a success body into its bundle.
    pub fn into_advice(self) -> Result<AdviceBundle, ServiceError> {
        match (self.success, self.advice) {
            (true, Some(advice)) => Ok(advice),
            (true, None) => Err(ServiceError::MalformedResponse(
                "success response without advice".to_string(),
            )),
            (false, _) => Err(ServiceError::MalformedResponse(
                self.error
                    .unwrap_or_else(|| "proxy reported failure".to_string()),
            )),
        }
    }
}
