// SPDX-FileCopyrightText: 2026 Docrev Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Docrev - a documentation review assistant.
//!
//! This is the binary entry point for the Docrev CLI.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod config;
mod shell;

use clap::{Parser, Subcommand};

/// Docrev - a documentation review assistant.
#[derive(Parser, Debug)]
#[command(name = "docrev", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch the interactive review shell.
    Shell,
    /// Show the resolved configuration.
    Config {
        /// Output as JSON instead of TOML.
        #[arg(long)]
        json: bool,
    },
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("docrev={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match docrev_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            docrev_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log.level);

    let result = match cli.command {
        Some(Commands::Shell) | None => shell::run_shell(config).await,
        Some(Commands::Config { json }) => config::run_config(&config, json),
    };

    if let Err(e) = result {
        eprintln!("docrev: {e}");
        std::process::exit(1);
    }
}
