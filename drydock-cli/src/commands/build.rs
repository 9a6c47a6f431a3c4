//! Build command handler
//!
//! Stages the project, runs every matrix entry and reports the verdict.

use anyhow::{Context, Result, anyhow};
use clap::Args;
use colored::*;
use drydock_core::RunResult;
use drydock_runner::{RunnerConfig, create_builder};
use std::path::PathBuf;
use tracing::info;

/// Arguments of `drydock build`
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Project directory to build
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Name of the configuration file inside the project
    #[arg(long, env = "DRYDOCK_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Directory for staging copies and runtimes
    #[arg(long, env = "DRYDOCK_TMP_DIR")]
    pub temp_dir: Option<PathBuf>,
}

impl BuildArgs {
    /// Runner configuration from the environment, overridden by flags
    fn runner_config(&self) -> Result<RunnerConfig> {
        let mut config = RunnerConfig::from_env();
        if let Some(config_file) = &self.config_file {
            config = config.with_config_file(config_file.clone());
        }
        if let Some(temp_dir) = &self.temp_dir {
            config = config.with_temp_root(temp_dir.clone());
        }
        config
            .validate()
            .map_err(|e| anyhow!("Invalid configuration: {}", e))?;
        Ok(config)
    }
}

/// Handle `drydock build`
///
/// # Returns
/// The build's return code
pub fn handle_build_command(args: BuildArgs) -> Result<i32> {
    let config = args.runner_config()?;
    let path = args
        .path
        .canonicalize()
        .with_context(|| format!("Project directory {} not found", args.path.display()))?;

    info!(
        "Building {} with config file {} (temp root {})",
        path.display(),
        config.config_file,
        config.temp_root.display()
    );

    let builder = create_builder(&config, std::io::stdout());
    let result = builder
        .build(&path)
        .with_context(|| format!("Failed to build {}", path.display()))?;

    print_summary(&result);
    Ok(result.return_code)
}

fn print_summary(result: &RunResult) {
    if result.is_success() {
        eprintln!("{}", "Build succeeded".green().bold());
    } else {
        eprintln!(
            "{}",
            format!("Build failed (exit code {})", result.return_code)
                .red()
                .bold()
        );
    }
}
