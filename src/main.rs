use std::process::ExitCode;

use clap::Parser;
use philosophers::{Supervisor, cli::Args};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_logging();

    let args = Args::parse();
    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = Supervisor::new(config).and_then(|mut sup| sup.run());
    match outcome {
        Ok(outcome) => {
            tracing::debug!(?outcome, "Finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Diagnostics go to stderr; stdout carries only the status lines.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("philosophers=warn,philo=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
