//! # API Request/Response Types
//!
//! JSON structures served by the advice proxy. The `/advice` body shapes are
//! shared with the workflow-side client and live in `agelens_core::formats`.

use agelens_core::{ModelCatalog, ModelEntry, ModelId};
use serde::{Deserialize, Serialize};

pub use agelens_core::formats::{AdviceRequest, AdviceResponse};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// MODELS RESPONSE
// =============================================================================

/// Model catalog as offered to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelEntry>,
    pub default_model: ModelId,
}

impl ModelsResponse {
    pub fn from_catalog(catalog: &ModelCatalog, default_model: &ModelId) -> Self {
        Self {
            models: catalog.list().to_vec(),
            default_model: default_model.clone(),
        }
    }
}
