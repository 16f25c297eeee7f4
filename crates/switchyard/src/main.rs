// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Switchyard - a tiered request router with retry, fallback, and a daily
//! budget governor.
//!
//! This is the binary entry point.

mod report;
mod simulate;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use switchyard_config::{ConfigError, SwitchyardConfig};

/// Switchyard - route requests across five service tiers within a daily budget.
#[derive(Parser, Debug)]
#[command(name = "switchyard", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate the configuration and print the effective settings.
    Check,
    /// Show how a request would be classified and routed right now.
    Classify {
        text: String,
        #[arg(long)]
        json: bool,
    },
    /// Show today's spend from the configured usage log.
    Usage {
        #[arg(long)]
        json: bool,
    },
    /// Dispatch a request against simulated tier providers.
    Simulate(simulate::SimulateArgs),
}

fn load(path: Option<&std::path::Path>) -> Result<SwitchyardConfig, Vec<ConfigError>> {
    match path {
        Some(path) => switchyard_config::load_and_validate_path(path),
        None => switchyard_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            switchyard_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.service.log_level);

    let use_color = !cli.plain && std::io::stdout().is_terminal();

    let result = match cli.command {
        Commands::Check => {
            report::print_check(&config, use_color);
            Ok(())
        }
        Commands::Classify { text, json } => report::run_classify(&config, &text, json).await,
        Commands::Usage { json } => report::run_usage(&config, json, use_color).await,
        Commands::Simulate(args) => simulate::run_simulate(&config, args, use_color).await,
    };

    if let Err(e) = result {
        eprintln!("switchyard: {e}");
        std::process::exit(1);
    }
}

/// Install the fmt subscriber. `RUST_LOG` overrides the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("switchyard={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
