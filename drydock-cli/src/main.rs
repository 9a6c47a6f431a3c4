//! Drydock CLI
//!
//! Command-line interface for building projects locally.

mod commands;

use clap::Parser;
use colored::*;
use commands::{Commands, handle_command};
use drydock_runner::BuildError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "drydock")]
#[command(about = "Drydock local build runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() {
    // Logs go to stderr; stdout carries the build transcript.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drydock_runner=warn,drydock_cli=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let code = match handle_command(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            exit_code(&err)
        }
    };

    std::process::exit(code);
}

/// Exit code for an error that stopped a build from completing
fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<BuildError>())
        .map(BuildError::exit_code)
        .unwrap_or(1)
}
