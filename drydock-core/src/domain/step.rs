//! Lifecycle step types

use std::fmt;

/// Name of a build lifecycle step
///
/// Variants are declared in lifecycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepName {
    BeforeInstall,
    Install,
    BeforeScript,
    Script,
    AfterSuccess,
    AfterFailure,
    AfterScript,
}

impl StepName {
    /// Every step, in lifecycle order
    pub const ALL: [StepName; 7] = [
        StepName::BeforeInstall,
        StepName::Install,
        StepName::BeforeScript,
        StepName::Script,
        StepName::AfterSuccess,
        StepName::AfterFailure,
        StepName::AfterScript,
    ];

    /// Steps that must all succeed before `script` runs
    pub const SETUP: [StepName; 3] = [
        StepName::BeforeInstall,
        StepName::Install,
        StepName::BeforeScript,
    ];

    /// The configuration key for this step
    pub fn as_str(&self) -> &'static str {
        match self {
            StepName::BeforeInstall => "before_install",
            StepName::Install => "install",
            StepName::BeforeScript => "before_script",
            StepName::Script => "script",
            StepName::AfterSuccess => "after_success",
            StepName::AfterFailure => "after_failure",
            StepName::AfterScript => "after_script",
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One phase of the build lifecycle with its shell commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub name: StepName,
    pub commands: Vec<String>,
}

impl Step {
    pub fn new(name: StepName, commands: Vec<String>) -> Self {
        Self { name, commands }
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
