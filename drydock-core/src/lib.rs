//! Drydock Core
//!
//! Core types and abstractions for the drydock build orchestrator.
//!
//! This crate contains:
//! - Domain types: commands, lifecycle steps, matrix entries and run results
//! - Project configuration: read-only lookups over a project's `.travis.yml`

pub mod config;
pub mod domain;

pub use config::{ConfigError, ProjectConfig};
pub use domain::command::Command;
pub use domain::matrix::MatrixEntry;
pub use domain::result::RunResult;
pub use domain::step::{Step, StepName};
