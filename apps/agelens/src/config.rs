//! # Configuration
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables.
//!
//! ## File (`agelens.toml`)
//!
//! ```toml
//! default_model = "hybrid"
//!
//! [prediction]
//! url = "http://127.0.0.1:8000/predict/"
//!
//! [advice]
//! url = "http://127.0.0.1:8080"
//!
//! [gemini]
//! url = "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
//!
//! [[models]]
//! id = "transfer"
//! name = "Transfer Learning"
//! description = "A fine-tuned ResNet50 model."
//! ```
//!
//! ## Environment
//!
//! - `AGELENS_CONFIG`: config file path when `--config` is not given
//! - `AGELENS_PREDICT_URL`: prediction endpoint
//! - `AGELENS_ADVICE_URL`: advice proxy base URL
//! - `AGELENS_PROXY_API_KEY`: bearer token shared by proxy and workflow side
//! - `AGELENS_GEMINI_URL`: generative endpoint (proxy only)
//! - `AGELENS_GEMINI_API_KEY`: generative credential (proxy only, never in the file)

use crate::error::AppError;
use agelens_core::{ModelCatalog, ModelEntry, ModelId};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_PREDICT_URL: &str = "http://127.0.0.1:8000/predict/";
pub const DEFAULT_ADVICE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

/// File looked up in the working directory when nothing else is configured.
const DEFAULT_CONFIG_FILE: &str = "agelens.toml";

// =============================================================================
// FILE LAYOUT
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    default_model: Option<String>,
    prediction: EndpointSection,
    advice: EndpointSection,
    gemini: EndpointSection,
    models: Option<Vec<ModelEntry>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct EndpointSection {
    url: Option<String>,
}

// =============================================================================
// RESOLVED CONFIG
// =============================================================================

/// Fully resolved application settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub prediction_url: String,
    pub advice_url: String,
    pub proxy_api_key: Option<String>,
    pub gemini_url: String,
    pub gemini_api_key: Option<String>,
    pub catalog: ModelCatalog,
    pub default_model: ModelId,
}

impl Default for AppConfig {
    fn default() -> Self {
        let catalog = ModelCatalog::builtin();
        Self {
            prediction_url: DEFAULT_PREDICT_URL.to_string(),
            advice_url: DEFAULT_ADVICE_URL.to_string(),
            proxy_api_key: None,
            gemini_url: DEFAULT_GEMINI_URL.to_string(),
            gemini_api_key: None,
            default_model: catalog.default_entry().id.clone(),
            catalog,
        }
    }
}

impl AppConfig {
    /// Load from the given file (or the default locations) and the process
    /// environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self, AppError> {
        let path = resolve_path(explicit)?;
        let text = match &path {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                Some(std::fs::read_to_string(path).map_err(|e| {
                    AppError::Config(format!("cannot read {}: {e}", path.display()))
                })?)
            }
            None => None,
        };
        Self::from_sources(text.as_deref(), |key| std::env::var(key).ok())
    }

    /// Build from optional TOML text and an environment lookup.
    pub fn from_sources(
        toml_text: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let file: FileConfig = match toml_text {
            Some(text) => {
                toml::from_str(text).map_err(|e| AppError::Config(format!("invalid TOML: {e}")))?
            }
            None => FileConfig::default(),
        };

        let mut config = Self::default();

        if let Some(models) = file.models {
            config.catalog = ModelCatalog::from_entries(models)?;
            config.default_model = config.catalog.default_entry().id.clone();
        }
        if let Some(id) = file.default_model {
            config.default_model = config.catalog.get(&id)?.id.clone();
        }
        if let Some(url) = file.prediction.url {
            config.prediction_url = url;
        }
        if let Some(url) = file.advice.url {
            config.advice_url = url;
        }
        if let Some(url) = file.gemini.url {
            config.gemini_url = url;
        }

        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_empty("AGELENS_PREDICT_URL") {
            config.prediction_url = url;
        }
        if let Some(url) = non_empty("AGELENS_ADVICE_URL") {
            config.advice_url = url;
        }
        if let Some(url) = non_empty("AGELENS_GEMINI_URL") {
            config.gemini_url = url;
        }
        config.proxy_api_key = non_empty("AGELENS_PROXY_API_KEY");
        config.gemini_api_key = non_empty("AGELENS_GEMINI_API_KEY");

        Ok(config)
    }
}

/// Pick the config file: explicit flag, then `AGELENS_CONFIG`, then
/// `agelens.toml` if it exists. The first two must exist.
fn resolve_path(explicit: Option<&Path>) -> Result<Option<PathBuf>, AppError> {
    let requested = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("AGELENS_CONFIG").map(PathBuf::from));

    match requested {
        Some(path) if path.is_file() => Ok(Some(path)),
        Some(path) => Err(AppError::Config(format!(
            "config file '{}' not found",
            path.display()
        ))),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            Ok(fallback.is_file().then_some(fallback))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agelens_core::WorkflowError;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_sources() {
        let config = AppConfig::from_sources(None, env_from(&[])).expect("defaults");
        assert_eq!(config.prediction_url, DEFAULT_PREDICT_URL);
        assert_eq!(config.default_model.as_str(), "transfer");
        assert_eq!(config.catalog.len(), 3);
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn env_overrides_file() {
        let toml = r#"
            [prediction]
            url = "http://file:1/predict/"
        "#;
        let config = AppConfig::from_sources(
            Some(toml),
            env_from(&[
                ("AGELENS_PREDICT_URL", "http://env:2/predict/"),
                ("AGELENS_GEMINI_API_KEY", "secret"),
                ("AGELENS_PROXY_API_KEY", "   "),
            ]),
        )
        .expect("config");
        assert_eq!(config.prediction_url, "http://env:2/predict/");
        assert_eq!(config.gemini_api_key.as_deref(), Some("secret"));
        assert!(config.proxy_api_key.is_none());
    }

    #[test]
    fn custom_catalog_and_default() {
        let toml = r#"
            default_model = "b"

            [[models]]
            id = "a"
            name = "Model A"
            description = "first"

            [[models]]
            id = "b"
            name = "Model B"
            description = "second"
        "#;
        let config = AppConfig::from_sources(Some(toml), env_from(&[])).expect("config");
        assert_eq!(config.catalog.len(), 2);
        assert_eq!(config.default_model.as_str(), "b");
    }

    #[test]
    fn unknown_default_model_is_rejected() {
        let result = AppConfig::from_sources(Some("default_model = \"vit\""), env_from(&[]));
        assert!(matches!(
            result,
            Err(AppError::Workflow(WorkflowError::UnknownModel(id))) if id == "vit"
        ));
    }

    #[test]
    fn api_key_in_file_is_rejected() {
        let toml = r#"
            [gemini]
            api_key = "leaked"
        "#;
        assert!(matches!(
            AppConfig::from_sources(Some(toml), env_from(&[])),
            Err(AppError::Config(_))
        ));
    }
}
