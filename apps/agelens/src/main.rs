//! # AgeLens
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                     apps/agelens (THE BINARY)                 │
//! │                                                               │
//! │  ┌─────────────┐   ┌──────────────────┐   ┌───────────────┐   │
//! │  │    CLI      │   │ Advice proxy     │   │ HTTP clients  │   │
//! │  │   (clap)    │   │ (axum)           │   │ (reqwest)     │   │
//! │  └──────┬──────┘   └────────┬─────────┘   └───────┬───────┘   │
//! │         └───────────────────┼─────────────────────┘           │
//! │                             ▼                                 │
//! │                     ┌───────────────┐                         │
//! │                     │ agelens-core  │                         │
//! │                     └───────────────┘                         │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Advice proxy (holds the generative credential)
//! AGELENS_GEMINI_API_KEY=... agelens serve --port 8080
//!
//! # One workflow run
//! agelens run --image face.jpg --model hybrid --actual-age 40
//! ```

use agelens::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // AGELENS_LOG_FORMAT=json switches to machine-parseable output.
    let log_format = std::env::var("AGELENS_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let default_filter = if cli.verbose {
        "agelens=debug,agelens_core=debug,tower_http=debug"
    } else {
        "agelens=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_banner() {
    println!(
        r#"
   _               _
  /_\  __ _ ___   | |   ___ _ _  ___
 / _ \/ _` / -_)  | |__/ -_) ' \(_-<
/_/ \_\__, \___|  |____\___|_||_/__/
      |___/

  AgeLens v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
