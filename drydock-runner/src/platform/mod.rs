//! Platforms
//!
//! A platform knows how to expand a project configuration into build matrix
//! entries and how to provision an isolated runtime for one entry. The
//! configuration's `language` key picks the platform through a
//! [`PlatformRegistry`].

mod default;
mod python;
mod registry;

pub use default::{DefaultPlatform, DefaultRuntime};
pub use python::{DEFAULT_PYTHON_VERSION, PythonPlatform, PythonRuntime};
pub use registry::{DEFAULT_PLATFORM, PlatformConstructor, PlatformRegistry};

use drydock_core::{MatrixEntry, ProjectConfig, Step};
use std::path::Path;

use crate::error::Result;

/// An execution environment bound to one matrix entry
///
/// Owns whatever backs the environment (temporary directories, virtualenvs)
/// and releases it when dropped. Never shared between entries.
pub trait Runtime {
    /// Shell snippet to run before each of the step's commands
    ///
    /// The snippet is hidden from the transcript. `None` runs commands as-is.
    fn before_step(&self, step: &Step) -> Option<String>;
}

/// Capability set of a build platform
pub trait Platform {
    /// Registry name of this platform
    fn name(&self) -> &'static str;

    /// Expands the configuration into matrix entries, in build order
    fn matrix(&self, config: &ProjectConfig) -> Result<Vec<MatrixEntry>>;

    /// Provisions a runtime for one matrix entry
    ///
    /// # Arguments
    /// * `project_dir` - The staged project the runtime will build
    /// * `entry` - One of the entries returned by [`Platform::matrix`]
    fn create_runtime(&self, project_dir: &Path, entry: &MatrixEntry) -> Result<Box<dyn Runtime>>;
}
