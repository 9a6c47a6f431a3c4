//! Error types for the runner
//!
//! Only setup problems are errors. A command exiting non-zero is an ordinary
//! [`RunResult`](drydock_core::RunResult) and never shows up here.

use drydock_core::{ConfigError, MatrixEntry};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for runner operations
pub type Result<T> = std::result::Result<T, BuildError>;

/// Errors that abort a build before or between steps
#[derive(Debug, Error)]
pub enum BuildError {
    /// Project configuration is missing or malformed
    #[error("Invalid project configuration: {0}")]
    Config(#[from] ConfigError),

    /// The configured language has no registered platform
    #[error("Unsupported language: {0}")]
    UnknownPlatform(String),

    /// Copying the project into the staging directory failed
    #[error("Failed to copy {source_path} to {destination}: {message}")]
    Copy {
        source_path: PathBuf,
        destination: PathBuf,
        message: String,
    },

    /// A runtime could not be provisioned for a matrix entry
    #[error("Failed to provision runtime for {entry} (exit code {return_code})")]
    Provisioning {
        entry: MatrixEntry,
        return_code: i32,
    },

    /// Filesystem error outside of command execution
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// Process exit code to report for this error
    ///
    /// Provisioning failures carry the failing command's code; everything
    /// else maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Provisioning { return_code, .. } if *return_code != 0 => *return_code,
            _ => 1,
        }
    }
}
