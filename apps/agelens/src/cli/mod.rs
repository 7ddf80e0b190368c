//! # AgeLens CLI Module
//!
//! ## Available Commands
//!
//! - `serve` - Start the advice proxy
//! - `models` - List selectable prediction models
//! - `run` - Predict the age in a photo, optionally compare and fetch advice

mod commands;

use crate::error::AppError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// AgeLens - facial age prediction and personalised advice
#[derive(Parser, Debug)]
#[command(name = "agelens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML config file (default: $AGELENS_CONFIG, then ./agelens.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the advice proxy
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// List selectable prediction models
    Models,

    /// Run the workflow for one photo
    Run {
        /// Photo to analyse
        #[arg(short, long)]
        image: PathBuf,

        /// Prediction model id (default: configured default model)
        #[arg(short, long)]
        model: Option<String>,

        /// Actual age; when given, the comparison and advice steps run too
        #[arg(short, long)]
        actual_age: Option<String>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), AppError> {
    let config = crate::config::AppConfig::load(cli.config.as_deref())?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Serve { host, port }) => cmd_serve(&config, &host, port).await,
        Some(Commands::Models) => cmd_models(&config, json_mode),
        Some(Commands::Run {
            image,
            model,
            actual_age,
        }) => {
            let options = RunOptions {
                image,
                model,
                actual_age,
            };
            cmd_run(&config, &options, json_mode).await
        }
        None => cmd_models(&config, json_mode),
    }
}
