//! Step runner
//!
//! Walks the build lifecycle for one matrix entry:
//!
//! ```text
//! before_install -> install -> before_script -> script -> {after_success | after_failure} -> after_script
//! ```
//!
//! A failing setup step (`before_install`, `install`, `before_script`) ends
//! the sequence immediately. Otherwise `script` decides the verdict; the
//! success/failure hook and `after_script` always run afterwards but their
//! results never replace it.

use drydock_core::{Command, ProjectConfig, RunResult, Step, StepName};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::console::{Console, RunOptions};
use crate::error::Result;
use crate::platform::Runtime;

/// Every lifecycle step of a build, read from configuration up front
///
/// Steps are stored in lifecycle order, so a step's index is its position
/// in [`StepName::ALL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSteps {
    steps: Vec<Step>,
}

impl BuildSteps {
    /// Reads the command list of every step; absent steps are empty
    pub fn from_config(config: &ProjectConfig) -> Result<Self> {
        let steps = StepName::ALL
            .into_iter()
            .map(|name| -> Result<Step> {
                let commands = config.get_list(name.as_str())?.unwrap_or_default();
                Ok(Step::new(name, commands))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { steps })
    }

    pub fn get(&self, name: StepName) -> &Step {
        &self.steps[name as usize]
    }
}

/// Executes the commands of one step
pub trait CommandsRunner {
    fn run_commands(&mut self, step: &Step) -> RunResult;
}

/// Drives the lifecycle state machine over a [`CommandsRunner`]
pub struct StepRunner<R: CommandsRunner> {
    commands_runner: R,
}

impl<R: CommandsRunner> StepRunner<R> {
    pub fn new(commands_runner: R) -> Self {
        Self { commands_runner }
    }

    /// Runs the full step sequence
    ///
    /// # Returns
    /// The result of the first failing setup step, or else the result of
    /// `script`
    pub fn run_steps(&mut self, steps: &BuildSteps) -> RunResult {
        for name in StepName::SETUP {
            let result = self.run_step(steps.get(name));
            if !result.is_success() {
                info!("Step {} failed, skipping remaining steps", name);
                return result;
            }
        }

        let verdict = self.run_step(steps.get(StepName::Script));
        let after = if verdict.is_success() {
            StepName::AfterSuccess
        } else {
            StepName::AfterFailure
        };

        for name in [after, StepName::AfterScript] {
            let result = self.run_step(steps.get(name));
            if !result.is_success() {
                warn!(
                    "Step {} failed with exit code {} (ignored)",
                    name, result.return_code
                );
            }
        }

        verdict
    }

    fn run_step(&mut self, step: &Step) -> RunResult {
        debug!("Running step {} ({} commands)", step.name, step.commands.len());
        self.commands_runner.run_commands(step)
    }

    pub fn into_inner(self) -> R {
        self.commands_runner
    }
}

/// Runs step commands through the console inside a runtime
pub struct RuntimeCommandsRunner<'a> {
    console: &'a Console,
    runtime: &'a dyn Runtime,
    project_dir: &'a Path,
}

impl<'a> RuntimeCommandsRunner<'a> {
    pub fn new(console: &'a Console, runtime: &'a dyn Runtime, project_dir: &'a Path) -> Self {
        Self {
            console,
            runtime,
            project_dir,
        }
    }
}

impl CommandsRunner for RuntimeCommandsRunner<'_> {
    fn run_commands(&mut self, step: &Step) -> RunResult {
        if step.is_empty() {
            return RunResult::success();
        }

        let prefix = self.runtime.before_step(step);
        let commands: Vec<Command> = step
            .commands
            .iter()
            .map(|command| match &prefix {
                Some(prefix) => Command::hidden_prefix(command.as_str(), prefix),
                None => Command::shell(command.as_str()),
            })
            .collect();

        self.console.run_all(
            &format!("Running {} commands", step.name),
            &commands,
            &RunOptions::in_dir(self.project_dir),
        )
    }
}
