//! # Wire Formats
//!
//! Request and response shapes of the external protocols, with parsers that
//! turn raw response bodies into domain values or a [`ServiceError`].
//!
//! - `prediction`: age prediction backend (multipart in, JSON out)
//! - `generative`: generative text backend (JSON in, JSON-in-JSON out)
//! - `proxy`: the advice proxy placed in front of the generative backend
//!
//! Transports live in the binary crate; nothing here performs I/O.
//!
//! [`ServiceError`]: crate::ServiceError

pub mod generative;
pub mod prediction;
pub mod proxy;

pub use generative::{GenerateContentRequest, GenerateContentResponse, parse_advice_text};
pub use prediction::{error_message, parse_prediction};
pub use proxy::{AdviceRequest, AdviceResponse};
