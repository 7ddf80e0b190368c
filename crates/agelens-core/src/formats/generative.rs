//! Generative text backend request and response shapes.
//!
//! Request:
//!
//! ```json
//! { "contents": [ { "parts": [ { "text": "<prompt>" } ] } ],
//!   "generationConfig": { "responseMimeType": "application/json" } }
//! ```
//!
//! The response nests the advice JSON as a string inside the first
//! candidate's first text part.

use crate::primitives::JSON_MIME_TYPE;
use crate::{AdviceBundle, ServiceError};
use serde::{Deserialize, Serialize};

/// One text fragment of a content block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A block of parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Output constraints for the generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
}

/// Request body for a single-prompt generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    /// Wrap a prompt and demand a strict JSON response.
    #[must_use]
    pub fn json_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.into()),
                }],
                role: None,
            }],
            generation_config: GenerationConfig {
                response_mime_type: JSON_MIME_TYPE.to_string(),
            },
        }
    }
}

/// One generated alternative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Response body of a generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Text of the first candidate's first text part.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|part| part.text.as_deref())
    }

    /// Parse a raw response body all the way down to an [`AdviceBundle`].
    pub fn advice_from_body(body: &[u8]) -> Result<AdviceBundle, ServiceError> {
        let response: Self = serde_json::from_slice(body)
            .map_err(|e| ServiceError::MalformedResponse(format!("invalid envelope: {e}")))?;
        let text = response.first_text().ok_or_else(|| {
            ServiceError::MalformedResponse("no candidate text in response".to_string())
        })?;
        parse_advice_text(text)
    }
}

/// Parse the advice JSON emitted by the model.
///
/// Every schema field is required; a missing or mistyped field is a
/// [`ServiceError::MalformedResponse`].
pub fn parse_advice_text(text: &str) -> Result<AdviceBundle, ServiceError> {
    serde_json::from_str(text.trim())
        .map_err(|e| ServiceError::MalformedResponse(format!("advice does not match schema: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(text: &str) -> Vec<u8> {
        json!({
            "candidates": [
                { "content": { "role": "model", "parts": [ { "text": text } ] }, "finishReason": "STOP" }
            ]
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn request_serializes_to_wire_shape() {
        let request = GenerateContentRequest::json_prompt("hello");
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            value,
            json!({
                "contents": [ { "parts": [ { "text": "hello" } ] } ],
                "generationConfig": { "responseMimeType": "application/json" }
            })
        );
    }

    #[test]
    fn extracts_advice_from_first_candidate() {
        let advice = json!({
            "summary": "Looking great",
            "healthTips": ["Sleep"],
            "skincareTips": ["Sunscreen", "Moisturize"],
            "lifestyleTips": []
        })
        .to_string();

        let bundle = GenerateContentResponse::advice_from_body(&envelope(&advice)).expect("parse");
        assert_eq!(bundle.summary, "Looking great");
        assert_eq!(bundle.skincare_tips.len(), 2);
        assert_eq!(bundle.tip_count(), 3);
    }

    #[test]
    fn missing_skincare_tips_is_malformed() {
        let advice = json!({
            "summary": "s",
            "healthTips": [],
            "lifestyleTips": []
        })
        .to_string();

        let err = GenerateContentResponse::advice_from_body(&envelope(&advice))
            .expect_err("missing field must fail");
        assert!(matches!(err, ServiceError::MalformedResponse(msg) if msg.contains("skincareTips")));
    }

    #[test]
    fn empty_candidates_is_malformed() {
        let body = br#"{"candidates": []}"#;
        assert!(matches!(
            GenerateContentResponse::advice_from_body(body),
            Err(ServiceError::MalformedResponse(_))
        ));
    }

    #[test]
    fn non_json_text_is_malformed() {
        assert!(matches!(
            GenerateContentResponse::advice_from_body(&envelope("Sure! Here are tips:")),
            Err(ServiceError::MalformedResponse(_))
        ));
    }
}
