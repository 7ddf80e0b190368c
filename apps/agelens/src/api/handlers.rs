//! # API Endpoint Handlers

use super::{
    AppState,
    types::{AdviceRequest, AdviceResponse, HealthResponse, ModelsResponse},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// MODELS HANDLER
// =============================================================================

/// List the selectable prediction models.
pub async fn models_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(ModelsResponse::from_catalog(
        &state.catalog,
        &state.default_model,
    ))
}

// =============================================================================
// ADVICE HANDLER
// =============================================================================

/// Generate advice for an age comparison.
///
/// The caller supplies only the two ages. Prompt selection and the
/// generative credential stay on this side of the boundary.
pub async fn advice_handler(
    State(state): State<AppState>,
    Json(request): Json<AdviceRequest>,
) -> impl IntoResponse {
    if let Err(e) = request.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(AdviceResponse::error(format!("Invalid request: {}", e))),
        );
    }

    match state
        .gemini
        .generate(request.predicted_age, request.actual_age)
        .await
    {
        Ok((tone, advice)) => {
            tracing::info!(
                tone = ?tone,
                tips = advice.tip_count(),
                "Advice generated"
            );
            (StatusCode::OK, Json(AdviceResponse::success(tone, advice)))
        }
        Err(e) => {
            tracing::warn!(
                event = "upstream_failure",
                status = e.status(),
                "Advice generation failed: {}",
                e
            );
            (
                StatusCode::BAD_GATEWAY,
                Json(AdviceResponse::error(format!(
                    "Advice generation failed: {}",
                    e
                ))),
            )
        }
    }
}
