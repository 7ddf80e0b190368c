//! Prediction backend response parsing.
//!
//! A successful response is a JSON object carrying a numeric
//! `predicted_age`. Failed responses carry an `error` string instead.

use crate::ServiceError;
use crate::primitives::{ERROR_FIELD, PREDICTED_AGE_FIELD};
use serde_json::Value;

/// Extract the predicted age from a success body.
///
/// The value must be a finite, non-negative JSON number. Anything else is a
/// [`ServiceError::MalformedResponse`].
pub fn parse_prediction(body: &[u8]) -> Result<f64, ServiceError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ServiceError::MalformedResponse(format!("invalid JSON: {e}")))?;

    let object = value.as_object().ok_or_else(|| {
        ServiceError::MalformedResponse("expected a JSON object".to_string())
    })?;

    let age = object
        .get(PREDICTED_AGE_FIELD)
        .and_then(Value::as_f64)
        .ok_or_else(|| {
            ServiceError::MalformedResponse(format!("missing numeric '{PREDICTED_AGE_FIELD}'"))
        })?;

    if !age.is_finite() || age < 0.0 {
        return Err(ServiceError::MalformedResponse(format!(
            "'{PREDICTED_AGE_FIELD}' out of range: {age}"
        )));
    }

    Ok(age)
}

/// Best-effort extraction of a human-readable error from a failure body.
///
/// Returns the `error` field when the body is a JSON object with one, the
/// trimmed body text otherwise, or `None` for an empty body.
#[must_use]
pub fn error_message(body: &[u8]) -> Option<String> {
    if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body)
        && let Some(Value::String(msg)) = map.get(ERROR_FIELD)
    {
        return Some(msg.clone());
    }
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
