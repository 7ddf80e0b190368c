//! # Primitives
//!
//! Fixed constants of the AgeLens workflow and its wire protocols.
//!
//! These values are compiled into the binary and are immutable at runtime.

/// Difference in whole years above which a higher predicted age needs attention.
pub const ATTENTION_THRESHOLD_YEARS: u32 = 10;

// =============================================================================
// PREDICTION PROTOCOL
// =============================================================================

/// Multipart field carrying the image payload.
pub const IMAGE_FIELD: &str = "image";

/// Multipart field carrying the model identifier.
pub const MODEL_FIELD: &str = "model_choice";

/// JSON field holding the predicted age in the prediction response.
pub const PREDICTED_AGE_FIELD: &str = "predicted_age";

/// JSON field the prediction backend uses for error descriptions.
pub const ERROR_FIELD: &str = "error";

// =============================================================================
// GENERATIVE PROTOCOL
// =============================================================================

/// Response format demanded from the generative backend.
pub const JSON_MIME_TYPE: &str = "application/json";

/// Fallback MIME type when nothing better is known.
pub const OCTET_STREAM_MIME_TYPE: &str = "application/octet-stream";

// =============================================================================
// MIME SNIFFING
// =============================================================================

/// Magic-byte signatures of the image formats recognized by [`sniff_image_mime`].
const SIGNATURES: &[(&[u8], &str)] = &[
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xFF\xD8\xFF", "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"BM", "image/bmp"),
];

/// Identify common image formats from their leading bytes.
///
/// Only the signature is checked; the payload is never decoded.
#[must_use]
pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    // RIFF....WEBP
    if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP".as_slice()) {
        return Some("image/webp");
    }
    SIGNATURES
        .iter()
        .find(|(magic, _)| bytes.starts_with(magic))
        .map(|(_, mime)| *mime)
}
