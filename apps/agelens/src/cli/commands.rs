//! # CLI Command Implementations

use crate::api::{self, AppState, ModelsResponse};
use crate::client::{GeminiClient, PredictionClient, ProxyAdviceClient};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::workflow::WorkflowController;
use agelens_core::{
    AdviceBundle, ImageAsset, SessionState, WorkflowError, primitives::sniff_image_mime,
    rounded_age,
};
use std::path::{Path, PathBuf};

// =============================================================================
// IMAGE LOADING
// =============================================================================

/// Maximum photo size accepted from disk (20 MiB).
pub const MAX_IMAGE_FILE_SIZE: u64 = 20 * 1024 * 1024;

/// Resolve `path` to a regular file, rejecting directories and dangling links.
fn validate_file_path(path: &Path) -> Result<PathBuf, AppError> {
    let canonical = path.canonicalize().map_err(|e| {
        AppError::Io(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(AppError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Read a photo from disk into an [`ImageAsset`].
///
/// The MIME type comes from the file's magic bytes when recognisable and
/// from its extension otherwise. Whether the result is actually an image is
/// left to the workflow's `select_image`.
pub fn load_image(path: &Path) -> Result<ImageAsset, AppError> {
    let canonical = validate_file_path(path)?;

    let metadata = std::fs::metadata(&canonical)
        .map_err(|e| AppError::Io(format!("Cannot read file metadata: {}", e)))?;
    if metadata.len() > MAX_IMAGE_FILE_SIZE {
        return Err(AppError::Io(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_IMAGE_FILE_SIZE
        )));
    }

    let bytes = std::fs::read(&canonical)
        .map_err(|e| AppError::Io(format!("Cannot read '{}': {}", path.display(), e)))?;

    let mime = match sniff_image_mime(&bytes) {
        Some(sniffed) => sniffed.to_string(),
        None => mime_guess::from_path(&canonical)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    };

    let asset = ImageAsset::new(bytes, mime);
    Ok(match canonical.file_name().and_then(|n| n.to_str()) {
        Some(name) => asset.with_file_name(name),
        None => asset,
    })
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Start the advice proxy. Requires `AGELENS_GEMINI_API_KEY`.
pub async fn cmd_serve(config: &AppConfig, host: &str, port: u16) -> Result<(), AppError> {
    let api_key = config.gemini_api_key.as_deref().ok_or_else(|| {
        AppError::Config("AGELENS_GEMINI_API_KEY must be set to run the advice proxy".to_string())
    })?;

    println!("AgeLens Advice Proxy Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Models:   {}", config.catalog.len());
    println!(
        "  Auth:     {}",
        if config.proxy_api_key.is_some() {
            "bearer"
        } else {
            "none"
        }
    );
    println!();

    let state = AppState::new(
        GeminiClient::new(config.gemini_url.as_str(), api_key),
        config.catalog.clone(),
        config.default_model.clone(),
    )
    .with_proxy_key(config.proxy_api_key.as_deref());

    api::run_server(&format!("{}:{}", host, port), state).await
}

// =============================================================================
// MODELS COMMAND
// =============================================================================

/// Print the model catalog.
pub fn cmd_models(config: &AppConfig, json_mode: bool) -> Result<(), AppError> {
    if json_mode {
        let output = ModelsResponse::from_catalog(&config.catalog, &config.default_model);
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Available models:");
    for entry in config.catalog.list() {
        let marker = if entry.id == config.default_model {
            "*"
        } else {
            " "
        };
        println!("  {} {:<10} {}", marker, entry.id.as_str(), entry.name);
        println!("      {}", entry.description);
    }
    Ok(())
}

// =============================================================================
// RUN COMMAND
// =============================================================================

/// Arguments of `agelens run`.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub image: PathBuf,
    pub model: Option<String>,
    pub actual_age: Option<String>,
}

/// Drive one session through the workflow: upload, predict, and when an
/// actual age is given, compare and fetch advice.
pub async fn cmd_run(
    config: &AppConfig,
    options: &RunOptions,
    json_mode: bool,
) -> Result<(), AppError> {
    let predictor = PredictionClient::new(config.prediction_url.as_str());
    let advisor = ProxyAdviceClient::new(config.advice_url.as_str(), config.proxy_api_key.clone());
    tracing::debug!(prediction_url = predictor.url(), "Workflow clients ready");

    let controller = WorkflowController::new(config.catalog.clone(), predictor, advisor);
    let model = options
        .model
        .clone()
        .unwrap_or_else(|| config.default_model.to_string());

    let result = drive(&controller, &model, options).await;
    let session = controller.snapshot();
    let failure = match &result {
        Err(AppError::Workflow(e)) => Some(e),
        _ => None,
    };

    // A failed advice request still leaves a valid comparison to show.
    if json_mode {
        if result.is_ok() || failure.is_some() {
            println!(
                "{}",
                serde_json::to_string_pretty(&run_json(&session, failure)).unwrap_or_default()
            );
        }
    } else {
        print_run(&session);
        if let Some(e) = failure {
            eprintln!("{}", e.user_message());
        }
    }
    result
}

async fn drive<P, A>(
    controller: &WorkflowController<P, A>,
    model: &str,
    options: &RunOptions,
) -> Result<(), AppError>
where
    P: crate::client::AgePredictor,
    A: crate::client::AdviceSource,
{
    controller.select_model(model)?;
    controller.select_image(load_image(&options.image)?)?;
    controller.request_prediction().await?;

    if let Some(ref actual) = options.actual_age {
        controller.set_actual_age(actual)?;
        controller.request_advice().await?;
    }
    Ok(())
}

fn run_json(session: &SessionState, failure: Option<&WorkflowError>) -> serde_json::Value {
    serde_json::json!({
        "success": failure.is_none(),
        "stage": session.stage().name(),
        "model": session.selected_model(),
        "predicted_age": session.predicted_age(),
        "rounded_age": session.predicted_age().map(rounded_age),
        "actual_age": session.actual_age(),
        "difference": session.age_difference(),
        "status": session.age_status(),
        "advice": session.advice(),
        "error": failure.map(WorkflowError::user_message),
        "detail": failure.map(ToString::to_string),
    })
}

fn print_run(session: &SessionState) {
    let Some(predicted) = session.predicted_age() else {
        return;
    };

    println!("Model:          {}", session.selected_model());
    println!("Predicted age:  {}", rounded_age(predicted));

    if let (Some(actual), Some(difference), Some(status)) = (
        session.actual_age(),
        session.age_difference(),
        session.age_status(),
    ) {
        println!("Actual age:     {}", actual);
        println!("Difference:     {} years", difference);
        println!("Status:         {}", status);
    }

    if let Some(advice) = session.advice() {
        print_advice(advice);
    }
}

fn print_advice(advice: &AdviceBundle) {
    println!();
    println!("{}", advice.summary);
    for (title, tips) in [
        ("Health", &advice.health_tips),
        ("Skincare", &advice.skincare_tips),
        ("Lifestyle", &advice.lifestyle_tips),
    ] {
        println!();
        println!("{}:", title);
        for tip in tips {
            println!("  - {}", tip);
        }
    }
}
