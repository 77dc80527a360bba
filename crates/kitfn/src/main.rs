// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! kitfn - run a function session against a captured platform request.
//!
//! This is the binary entry point for the kitfn adapter.

mod inspect;
mod respond;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use kitfn_core::KitError;
use kitfn_session::InboundRequest;

/// kitfn - run a function session against a captured platform request.
#[derive(Parser, Debug)]
#[command(name = "kitfn", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a session from a request file and print its response body.
    Respond {
        /// JSON file holding `{"headers": .., "body": ..}`.
        #[arg(long)]
        request: PathBuf,
        /// JSON file passed through as the response of webhook events.
        #[arg(long)]
        data: Option<PathBuf>,
        /// Fetch the scoped store before responding.
        #[arg(long)]
        load: bool,
    },
    /// Print how a request file is interpreted.
    Inspect {
        /// JSON file holding `{"headers": .., "body": ..}`.
        #[arg(long)]
        request: PathBuf,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => kitfn_config::load_and_validate_path(path),
        None => kitfn_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            kitfn_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);

    let result = match cli.command {
        Commands::Respond {
            request,
            data,
            load,
        } => respond::run_respond(&config, &request, data.as_deref(), load).await,
        Commands::Inspect { request } => inspect::run_inspect(&config, &request),
        Commands::Config => match kitfn_config::render_toml(&config) {
            Ok(text) => {
                print!("{text}");
                Ok(())
            }
            Err(e) => {
                kitfn_config::render_errors(&[e]);
                std::process::exit(1);
            }
        },
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Initialize the tracing subscriber. Logs go to stderr so stdout carries
/// only the JSON output.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("kitfn={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Reads a JSON file.
fn read_json(path: &Path) -> Result<serde_json::Value, KitError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| KitError::Config(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| KitError::decode(format!("{} is not valid JSON", path.display()), e))
}

/// Reads a request file. Missing `headers` or `body` are treated as empty.
fn read_request(path: &Path) -> Result<InboundRequest, KitError> {
    read_json(path).map(|value| InboundRequest::from_value(&value))
}
