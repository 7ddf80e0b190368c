//! # Core Type Definitions
//!
//! This module contains the shared vocabulary of the AgeLens workflow:
//! - Workflow position (`Stage`, `RequestKind`)
//! - User-supplied input (`ImageAsset`, `ModelId`)
//! - Service output (`AdviceBundle`, `AgeStatus`)
//! - Error types (`WorkflowError`, `ServiceError`)

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// STAGE
// =============================================================================

/// The four ordered workflow phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// No photo chosen yet.
    Upload,
    /// A photo is held and can be sent for prediction.
    ReadyToPredict,
    /// A predicted age is available for comparison.
    Compared,
    /// Advice has been fetched for the comparison.
    Tipped,
}

impl Stage {
    /// Human-readable stage name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Upload => "Upload Photo",
            Stage::ReadyToPredict => "Predict Age",
            Stage::Compared => "Compare Ages",
            Stage::Tipped => "Get Tips",
        }
    }

    /// One-based step number as shown in a progress indicator.
    #[must_use]
    pub fn step(&self) -> u8 {
        match self {
            Stage::Upload => 1,
            Stage::ReadyToPredict => 2,
            Stage::Compared => 3,
            Stage::Tipped => 4,
        }
    }

    /// Whether a predicted age must be present in this stage.
    #[must_use]
    pub fn has_prediction(&self) -> bool {
        matches!(self, Stage::Compared | Stage::Tipped)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}/4)", self.name(), self.step())
    }
}

// =============================================================================
// REQUEST KIND
// =============================================================================

/// The two suspension points of the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Prediction,
    Advice,
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestKind::Prediction => f.write_str("prediction"),
            RequestKind::Advice => f.write_str("advice"),
        }
    }
}

// =============================================================================
// MODEL IDENTIFIER
// =============================================================================

/// Catalog key selecting which prediction model variant to invoke.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(pub String);

impl ModelId {
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// IMAGE ASSET
// =============================================================================

/// Opaque handle to a user-chosen photo.
///
/// The core never decodes the payload. The declared MIME type is the only
/// thing inspected, and only to decide whether the asset claims to be an image.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAsset {
    bytes: Vec<u8>,
    mime_type: String,
    file_name: Option<String>,
}

impl ImageAsset {
    /// Create an asset from raw bytes and the declared MIME type.
    #[must_use]
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            file_name: None,
        }
    }

    /// Attach the original file name.
    #[must_use]
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Size of the payload in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True when the declared MIME type is in the `image/` family.
    #[must_use]
    pub fn is_image(&self) -> bool {
        let mime = self.mime_type.trim();
        mime.len() > "image/".len()
            && mime
                .get(.."image/".len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
    }
}

// Payloads can be megabytes; print the shape only.
impl std::fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAsset")
            .field("len", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .field("file_name", &self.file_name)
            .finish()
    }
}

// =============================================================================
// ADVICE BUNDLE
// =============================================================================

/// Structured tips payload returned by the generative text service.
///
/// Every field is required; a payload missing any of them is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdviceBundle {
    pub summary: String,
    pub health_tips: Vec<String>,
    pub skincare_tips: Vec<String>,
    pub lifestyle_tips: Vec<String>,
}

impl AdviceBundle {
    /// Total number of individual tips across all sections.
    #[must_use]
    pub fn tip_count(&self) -> usize {
        self.health_tips.len() + self.skincare_tips.len() + self.lifestyle_tips.len()
    }
}

// =============================================================================
// AGE STATUS
// =============================================================================

/// Three-tier classification of predicted versus actual age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeStatus {
    /// Predicted age is at or below the actual age.
    Favorable,
    /// Predicted above actual, within the attention threshold.
    Moderate,
    /// Predicted above actual by more than the attention threshold.
    Attention,
}

impl AgeStatus {
    /// Label shown next to the comparison.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            AgeStatus::Favorable => "Excellent!",
            AgeStatus::Moderate => "Good",
            AgeStatus::Attention => "Needs Attention",
        }
    }
}

impl std::fmt::Display for AgeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Failures of a single remote call. Always terminal for that attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The service could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ServiceError {
    /// Status code for `Server` failures.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors that can occur while driving the workflow.
///
/// Validation variants are rejected synchronously and never reach a client.
/// `PredictionFailed` and `AdviceFailed` wrap the remote failure of a single
/// attempt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkflowError {
    /// The chosen file does not declare an image MIME type.
    #[error("not an image: declared type is '{0}'")]
    InvalidAsset(String),

    /// The model identifier is not in the catalog.
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// Prediction was requested before a photo was chosen.
    #[error("no image selected")]
    MissingAsset,

    /// The typed age is not a positive integer.
    #[error("invalid age: '{0}'")]
    InvalidAge(String),

    /// Advice was requested without both ages.
    #[error("predicted and actual age are both required")]
    IncompleteComparison,

    /// The operation is not valid in the current stage.
    #[error("{operation} is not allowed during {stage}")]
    InvalidTransition {
        operation: &'static str,
        stage: Stage,
    },

    /// Another request is still outstanding.
    #[error("a {0} request is already in flight")]
    RequestPending(RequestKind),

    /// The catalog definition is unusable.
    #[error("invalid model catalog: {0}")]
    InvalidCatalog(String),

    /// The prediction attempt failed remotely.
    #[error("prediction failed: {0}")]
    PredictionFailed(#[source] ServiceError),

    /// The advice attempt failed remotely.
    #[error("advice failed: {0}")]
    AdviceFailed(#[source] ServiceError),
}

impl WorkflowError {
    /// True for local validation failures tied to an input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            WorkflowError::PredictionFailed(_)
                | WorkflowError::AdviceFailed(_)
                | WorkflowError::InvalidCatalog(_)
        )
    }

    /// The remote failure, if this is one.
    #[must_use]
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            WorkflowError::PredictionFailed(e) | WorkflowError::AdviceFailed(e) => Some(e),
            _ => None,
        }
    }

    /// Message suitable for showing next to the offending input, or as a
    /// failure notice for remote errors.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WorkflowError::InvalidAsset(_) => "Please choose an image file.".to_string(),
            WorkflowError::UnknownModel(id) => format!("Model '{id}' is not available."),
            WorkflowError::MissingAsset => "Please upload a photo first.".to_string(),
            WorkflowError::InvalidAge(_) => "Please enter your age as a whole number.".to_string(),
            WorkflowError::IncompleteComparison => "Please enter your actual age first.".to_string(),
            WorkflowError::InvalidTransition { operation, stage } => {
                format!("Cannot {operation} while at step {}.", stage.step())
            }
            WorkflowError::RequestPending(kind) => {
                format!("Please wait for the current {kind} request to finish.")
            }
            WorkflowError::InvalidCatalog(msg) => format!("Model catalog error: {msg}"),
            WorkflowError::PredictionFailed(_) => {
                "Prediction failed. Please ensure the prediction service is running and accessible."
                    .to_string()
            }
            WorkflowError::AdviceFailed(_) => {
                "Failed to get tips from the advice service. Please try again.".to_string()
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
