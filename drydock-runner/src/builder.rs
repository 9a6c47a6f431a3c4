//! Builder
//!
//! Top-level orchestration of one build:
//! 1. Stage the project in a temporary directory
//! 2. Read its configuration and pick the platform for its language
//! 3. For each matrix entry: provision a runtime, run the lifecycle steps,
//!    release the runtime
//! 4. Stop at the first failing entry
//!
//! The staging directory and every runtime are released on all exit paths.

use drydock_core::{MatrixEntry, ProjectConfig, RunResult};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::RunnerConfig;
use crate::console::{Console, RunOptions};
use crate::error::Result;
use crate::files;
use crate::platform::{Platform, PlatformRegistry};
use crate::shell::LocalShell;
use crate::steps::{BuildSteps, RuntimeCommandsRunner, StepRunner};
use crate::temp::TempRoot;

/// Creates a builder running commands on this machine
///
/// # Arguments
/// * `config` - Runner settings (temp root, config file name)
/// * `sink` - Receives the build transcript
pub fn create_builder(config: &RunnerConfig, sink: impl Write + Send + 'static) -> Builder {
    let console = Arc::new(Console::new(LocalShell::new(), sink));
    Builder::new(console, PlatformRegistry::standard(), config)
}

/// Runs builds of whole projects
pub struct Builder {
    console: Arc<Console>,
    registry: PlatformRegistry,
    temp_root: TempRoot,
    config_file: String,
}

impl Builder {
    pub fn new(console: Arc<Console>, registry: PlatformRegistry, config: &RunnerConfig) -> Self {
        Self {
            console,
            registry,
            temp_root: TempRoot::from_config(config),
            config_file: config.config_file.clone(),
        }
    }

    /// Builds the project at `path`
    ///
    /// # Returns
    /// Code 0 when every matrix entry succeeded, otherwise the result of the
    /// first failing entry
    ///
    /// # Errors
    /// Configuration and setup problems that prevent the build from running
    pub fn build(&self, path: &Path) -> Result<RunResult> {
        let staging = self.temp_root.create_temp_dir()?;
        let project_dir = staging.path();

        info!(
            "Building {} in {}",
            path.display(),
            project_dir.display()
        );

        self.console
            .run_all("Copying project", &[], &RunOptions::quiet());
        files::copy(path, project_dir)?;

        let config = ProjectConfig::read_file(&project_dir.join(&self.config_file))?;
        let steps = BuildSteps::from_config(&config)?;
        let language = config.language()?;
        let platform = self.registry.create(
            language.as_deref(),
            Arc::clone(&self.console),
            self.temp_root.clone(),
        )?;

        let matrix = platform.matrix(&config)?;
        debug!(
            "Platform {} expanded to {} matrix entries",
            platform.name(),
            matrix.len()
        );

        for (idx, entry) in matrix.iter().enumerate() {
            info!("Building matrix entry {}/{}: {}", idx + 1, matrix.len(), entry);

            let result = self.build_entry(platform.as_ref(), project_dir, &steps, entry)?;
            if !result.is_success() {
                info!(
                    "Matrix entry {} failed with exit code {}",
                    entry, result.return_code
                );
                return Ok(result);
            }
        }

        info!("Build of {} succeeded", path.display());
        Ok(RunResult::success())
    }

    fn build_entry(
        &self,
        platform: &dyn Platform,
        project_dir: &Path,
        steps: &BuildSteps,
        entry: &MatrixEntry,
    ) -> Result<RunResult> {
        // Dropped at the end of this call, whatever the steps returned.
        let runtime = platform.create_runtime(project_dir, entry)?;

        let commands_runner = RuntimeCommandsRunner::new(&self.console, runtime.as_ref(), project_dir);
        Ok(StepRunner::new(commands_runner).run_steps(steps))
    }
}
