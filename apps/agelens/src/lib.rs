//! # AgeLens Application Library
//!
//! Everything async or network-aware lives here, on top of the pure
//! `agelens-core` engine:
//!
//! - [`client`] - prediction and advice HTTP clients
//! - [`workflow`] - session controller driving the core against the clients
//! - [`api`] - the advice proxy (axum)
//! - [`cli`] - command line entry points (clap)
//! - [`config`] - layered settings (defaults, TOML, environment)

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod workflow;

pub use error::AppError;
