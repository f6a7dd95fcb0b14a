mod backend;
mod cli;
mod commands;
mod config;
mod errors;
mod jobs;
mod models;
mod orchestrator;
mod profile;
mod state;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Cli;
use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;

    // Logs go to stderr so command output on stdout stays clean.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!(
        search = %config.search_api_url,
        analysis = %config.analysis_api_url,
        profile = %config.profile_path.display(),
        "client v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let state = AppState::build(config).inspect_err(|e| error!("Startup failed: {e}"))?;
    commands::run(&state, cli.command).await
}
