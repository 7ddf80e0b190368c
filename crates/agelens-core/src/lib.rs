//! # agelens-core
//!
//! The workflow engine for AgeLens - THE LOGIC.
//!
//! A user moves through four stages: upload a photo, get an age prediction,
//! compare it with their actual age, and receive personalized advice. This
//! crate holds the state machine for that journey and the wire formats of the
//! two remote services it talks to.
//!
//! ## Architectural Constraints
//!
//! - Pure Rust: NO async, NO network dependencies
//! - Every transition is synchronous and either fully applies or fails
//! - Remote calls are modelled as ticketed begin/complete pairs; the binary
//!   crate performs the actual I/O between the two halves
//! - Derived display values are computed on demand, never cached

// =============================================================================
// MODULES
// =============================================================================

pub mod assessment;
pub mod catalog;
pub mod formats;
pub mod primitives;
pub mod prompt;
pub mod session;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{
    AdviceBundle, AgeStatus, ImageAsset, ModelId, RequestKind, ServiceError, Stage, WorkflowError,
};

// =============================================================================
// RE-EXPORTS: Workflow Engine
// =============================================================================

pub use assessment::{age_difference, age_status, rounded_age};
pub use catalog::{ModelCatalog, ModelEntry};
pub use prompt::{AdvicePrompt, AdviceTone, build_prompt};
pub use session::{
    AdviceJob, Completion, PredictionJob, RequestTicket, SessionState, parse_actual_age,
};

// =============================================================================
// RE-EXPORTS: Formats
// =============================================================================

pub use formats::{AdviceRequest, AdviceResponse, GenerateContentRequest, GenerateContentResponse};
