//! # Application Errors
//!
//! Binary-level failures. Workflow failures are carried through unchanged.

use agelens_core::WorkflowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// A workflow transition or remote call failed.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// File system access failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// The proxy server could not start or stopped unexpectedly.
    #[error("server error: {0}")]
    Server(String),
}
