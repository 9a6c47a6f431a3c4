//! Drydock Runner
//!
//! The build pipeline engine: stages a project, expands its build matrix,
//! provisions a runtime per matrix entry and walks the lifecycle steps
//! against it, folding every command's exit code into one build result.
//!
//! Architecture:
//! - Console: runs shell commands and writes the build transcript
//! - Steps: the lifecycle state machine
//! - Platform: matrix expansion and per-entry runtimes
//! - Builder: top-level orchestration
//!
//! Everything runs sequentially on the calling thread.

pub mod builder;
pub mod config;
pub mod console;
pub mod error;
pub mod files;
pub mod output;
pub mod platform;
pub mod shell;
pub mod steps;
pub mod temp;

pub use builder::{Builder, create_builder};
pub use config::RunnerConfig;
pub use console::{Console, RunOptions};
pub use error::{BuildError, Result};
pub use output::SharedOutput;
pub use platform::{Platform, PlatformRegistry, Runtime};
pub use shell::{LocalShell, Shell};
pub use steps::{CommandsRunner, RuntimeCommandsRunner, StepRunner};
pub use temp::TempRoot;
