//! # Authentication Module
//!
//! Shared-secret bearer authentication between the workflow side and the
//! advice proxy.
//!
//! ## Configuration
//!
//! - `AGELENS_PROXY_API_KEY`: if set, every request except `/health` must carry
//!   `Authorization: Bearer <key>`

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// The expected proxy key, shared with the middleware.
#[derive(Clone)]
pub struct ProxyKey(Arc<str>);

impl ProxyKey {
    pub fn new(key: &str) -> Self {
        Self(Arc::from(key))
    }

    /// Compare a presented key in constant time.
    ///
    /// Both sides are padded to the same length so the comparison always
    /// covers the same number of bytes; the length check happens afterwards.
    pub fn matches(&self, presented: &str) -> bool {
        let presented = presented.as_bytes();
        let expected = self.0.as_bytes();

        let width = presented.len().max(expected.len());
        let mut lhs = vec![0u8; width];
        let mut rhs = vec![0u8; width];
        lhs[..presented.len()].copy_from_slice(presented);
        rhs[..expected.len()].copy_from_slice(expected);

        let bytes_match: bool = lhs.ct_eq(&rhs).into();
        bytes_match && presented.len() == expected.len()
    }
}

/// Bearer key middleware. `/health` is always let through for liveness checks.
pub async fn proxy_key_middleware(
    State(key): State<ProxyKey>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    if request.uri().path() == "/health" {
        return Ok(next.run(request).await);
    }

    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(token) if key.matches(token) => Ok(next.run(request).await),
        Some(_) => {
            tracing::warn!(
                event = "auth_failure",
                reason = "invalid_proxy_key",
                "Authentication failed: invalid proxy key"
            );
            Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
        None => {
            tracing::warn!(
                event = "auth_failure",
                reason = "missing_bearer_token",
                "Missing bearer token"
            );
            Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
    }
}
