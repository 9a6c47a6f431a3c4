//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod build;

pub use build::BuildArgs;

use anyhow::Result;
use clap::Subcommand;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Build a project directory
    Build(BuildArgs),
}

/// Handle a CLI command
///
/// # Returns
/// The process exit code
pub fn handle_command(command: Commands) -> Result<i32> {
    match command {
        Commands::Build(args) => build::handle_build_command(args),
    }
}
