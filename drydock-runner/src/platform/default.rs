//! Default platform: one build, no environment setup

use drydock_core::{MatrixEntry, ProjectConfig, Step};
use std::path::Path;
use tracing::debug;

use super::{Platform, Runtime};
use crate::error::Result;

/// Platform for projects that need no provisioning
#[derive(Debug, Default)]
pub struct DefaultPlatform;

impl DefaultPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl Platform for DefaultPlatform {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn matrix(&self, _config: &ProjectConfig) -> Result<Vec<MatrixEntry>> {
        Ok(vec![MatrixEntry::baseline()])
    }

    fn create_runtime(&self, project_dir: &Path, entry: &MatrixEntry) -> Result<Box<dyn Runtime>> {
        debug!(
            "Using host environment for {} in {}",
            entry,
            project_dir.display()
        );
        Ok(Box::new(DefaultRuntime))
    }
}

/// Runtime that runs commands directly on the host
#[derive(Debug, Default)]
pub struct DefaultRuntime;

impl Runtime for DefaultRuntime {
    fn before_step(&self, _step: &Step) -> Option<String> {
        None
    }
}
