//! # Model Catalog
//!
//! Static registry of the prediction model variants a user may choose from.
//!
//! The catalog is built once at process start and never mutated afterwards.
//! Its identifiers are the only valid values for the session's selected model.

use crate::{ModelId, WorkflowError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A selectable prediction model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Key sent to the prediction service as `model_choice`.
    pub id: ModelId,
    /// Name shown in the model picker.
    pub name: String,
    /// One-line description shown under the name.
    pub description: String,
}

impl ModelEntry {
    #[must_use]
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: ModelId::new(id),
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

/// Ordered, non-empty set of models with unique identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelCatalog {
    entries: Vec<ModelEntry>,
}

impl ModelCatalog {
    /// The models served by the stock prediction backend.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                ModelEntry::new(
                    "transfer",
                    "Transfer Learning",
                    "A fine-tuned ResNet50 model.",
                ),
                ModelEntry::new(
                    "ensemble",
                    "Ensemble Learning",
                    "A \"committee\" of 3 custom CNNs.",
                ),
                ModelEntry::new("hybrid", "Hybrid Ensemble", "The average of all 4 models."),
            ],
        }
    }

    /// Build a catalog from explicit entries.
    ///
    /// Rejects an empty list, blank identifiers and duplicate identifiers.
    pub fn from_entries(entries: Vec<ModelEntry>) -> Result<Self, WorkflowError> {
        if entries.is_empty() {
            return Err(WorkflowError::InvalidCatalog(
                "at least one model is required".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        for entry in &entries {
            if entry.id.as_str().trim().is_empty() {
                return Err(WorkflowError::InvalidCatalog(
                    "model identifiers must not be blank".to_string(),
                ));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(WorkflowError::InvalidCatalog(format!(
                    "duplicate model identifier '{}'",
                    entry.id
                )));
            }
        }

        Ok(Self { entries })
    }

    /// All entries in display order.
    #[must_use]
    pub fn list(&self) -> &[ModelEntry] {
        &self.entries
    }

    /// Look up an entry by identifier.
    pub fn get(&self, id: &str) -> Result<&ModelEntry, WorkflowError> {
        self.entries
            .iter()
            .find(|entry| entry.id.as_str() == id)
            .ok_or_else(|| WorkflowError::UnknownModel(id.to_string()))
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_ok()
    }

    /// The first entry, used when no preference has been expressed.
    #[must_use]
    pub fn default_entry(&self) -> &ModelEntry {
        // Construction guarantees at least one entry.
        &self.entries[0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
