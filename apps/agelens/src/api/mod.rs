//! # Advice Proxy
//!
//! The HTTP server that holds the generative credential. The workflow side
//! sends two ages; the proxy picks the prompt, calls the backend, and returns
//! structured advice.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check (never authenticated)
//! - `GET /models` - Selectable prediction models
//! - `POST /advice` - Advice for an age comparison
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `AGELENS_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `AGELENS_RATE_LIMIT`: Requests per second (default: 20, 0 to disable)
//! - `AGELENS_PROXY_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

pub use auth::ProxyKey;
pub use handlers::{advice_handler, health_handler, models_handler};
pub use middleware::{create_rate_limiter, get_rate_limit_from_env};
pub use types::{AdviceRequest, AdviceResponse, HealthResponse, ModelsResponse};

use crate::client::GeminiClient;
use crate::error::AppError;
use agelens_core::{ModelCatalog, ModelId};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Largest accepted request body. `/advice` bodies are two numbers.
const MAX_BODY_BYTES: usize = 64 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared proxy state.
#[derive(Clone)]
pub struct AppState {
    pub gemini: GeminiClient,
    pub catalog: Arc<ModelCatalog>,
    pub default_model: ModelId,
    /// Expected bearer token; `None` leaves the proxy open.
    pub proxy_key: Option<ProxyKey>,
}

impl AppState {
    pub fn new(gemini: GeminiClient, catalog: ModelCatalog, default_model: ModelId) -> Self {
        Self {
            gemini,
            catalog: Arc::new(catalog),
            default_model,
            proxy_key: None,
        }
    }

    /// Require `Authorization: Bearer <key>` on every route but `/health`.
    #[must_use]
    pub fn with_proxy_key(mut self, key: Option<&str>) -> Self {
        self.proxy_key = key.map(ProxyKey::new);
        self
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer from `AGELENS_CORS_ORIGINS`.
///
/// `*` allows any origin; unset or unparsable falls back to localhost.
fn build_cors_layer() -> CorsLayer {
    match std::env::var("AGELENS_CORS_ORIGINS").ok().as_deref() {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins (AGELENS_CORS_ORIGINS=*)");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .filter_map(|s| match s.parse::<HeaderValue>() {
                    Ok(hv) => Some(hv),
                    Err(e) => {
                        tracing::warn!("CORS: Invalid origin '{}': {}", s, e);
                        None
                    }
                })
                .collect();

            if allowed.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost");
                localhost_cors()
            } else {
                tracing::info!("CORS: Allowing {} configured origin(s)", allowed.len());
                restricted_cors(allowed)
            }
        }
        None => localhost_cors(),
    }
}

fn localhost_cors() -> CorsLayer {
    let origins = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();
    restricted_cors(origins)
}

fn restricted_cors(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the proxy router.
///
/// Middleware stack (outer to inner): tracing, CORS, body limit, rate
/// limiting (if enabled), bearer authentication (if a key is set).
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/models", get(handlers::models_handler))
        .route("/advice", post(handlers::advice_handler));

    match state.proxy_key.clone() {
        Some(key) => {
            tracing::info!("Proxy key authentication enabled");
            router = router.layer(axum_middleware::from_fn_with_state(
                key,
                auth::proxy_key_middleware,
            ));
        }
        None => {
            tracing::warn!(
                "Proxy key authentication DISABLED. Set AGELENS_PROXY_API_KEY to require a bearer token."
            );
        }
    }

    let rate_limit = get_rate_limit_from_env();
    match create_rate_limiter(rate_limit) {
        Some(limiter) => {
            tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
            router = router.layer(axum_middleware::from_fn_with_state(
                limiter,
                middleware::rate_limit_middleware,
            ));
        }
        None => tracing::info!("Rate limiting disabled"),
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer())
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Bind and serve until Ctrl-C.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), AppError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Server(format!("bind {addr} failed: {e}")))?;

    tracing::info!("Advice proxy listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Server(e.to_string()))?;

    tracing::info!("Advice proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
