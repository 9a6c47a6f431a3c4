//! Python platform
//!
//! Builds the project once per Python version listed under the `python` key.
//! Each version gets its own virtualenv in a temporary directory; every step
//! command runs with that virtualenv activated.

use drydock_core::domain::command::quote;
use drydock_core::{Command, MatrixEntry, ProjectConfig, Step};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, error, info};

use super::{Platform, Runtime};
use crate::console::{Console, RunOptions};
use crate::error::{BuildError, Result};
use crate::temp::TempRoot;

/// Version built when the configuration lists none
pub const DEFAULT_PYTHON_VERSION: &str = "3";

/// Configuration key holding the version list
const MATRIX_KEY: &str = "python";

/// Platform provisioning one virtualenv per Python version
pub struct PythonPlatform {
    console: Arc<Console>,
    temp_root: TempRoot,
}

impl PythonPlatform {
    pub fn new(console: Arc<Console>, temp_root: TempRoot) -> Self {
        Self { console, temp_root }
    }

    /// Interpreter executable for a configured version
    ///
    /// `pypy` and `pypy3` name their own binaries; anything else is a CPython
    /// version suffix such as `3.12`.
    pub fn python_binary(version: &str) -> String {
        match version {
            "pypy" | "pypy3" => version.to_string(),
            _ => format!("python{}", version),
        }
    }

    /// Commands that create and refresh a virtualenv at `path`
    pub fn provisioning_commands(path: &Path, version: &str) -> Vec<Command> {
        let path_str = path.to_string_lossy();
        let pip = path.join("bin").join("pip").to_string_lossy().into_owned();
        let pip_upgrade =
            |package: &str| Command::from_args([pip.as_str(), "install", "--upgrade", package]);

        vec![
            Command::from_args([
                "virtualenv".to_string(),
                path_str.into_owned(),
                format!("--python={}", Self::python_binary(version)),
            ]),
            pip_upgrade("pip"),
            pip_upgrade("setuptools"),
            pip_upgrade("virtualenv"),
        ]
    }
}

impl Platform for PythonPlatform {
    fn name(&self) -> &'static str {
        "python"
    }

    fn matrix(&self, config: &ProjectConfig) -> Result<Vec<MatrixEntry>> {
        let versions = config.get_list_or(MATRIX_KEY, &[DEFAULT_PYTHON_VERSION])?;
        Ok(versions.into_iter().map(MatrixEntry::value).collect())
    }

    fn create_runtime(&self, project_dir: &Path, entry: &MatrixEntry) -> Result<Box<dyn Runtime>> {
        let version = entry.as_value().unwrap_or(DEFAULT_PYTHON_VERSION);

        // Dropped (and removed) on every early return below.
        let temp_dir = self.temp_root.create_temp_dir()?;
        let virtualenv_dir = temp_dir.path().join("virtualenv");

        info!(
            "Creating virtualenv for Python {} at {} (project {})",
            version,
            virtualenv_dir.display(),
            project_dir.display()
        );

        let result = self.console.run_all(
            &format!("Creating virtualenv for {}", version),
            &Self::provisioning_commands(&virtualenv_dir, version),
            &RunOptions::quiet(),
        );

        if !result.is_success() {
            error!(
                "Provisioning Python {} failed with exit code {}",
                version, result.return_code
            );
            return Err(BuildError::Provisioning {
                entry: entry.clone(),
                return_code: result.return_code,
            });
        }

        Ok(Box::new(PythonRuntime {
            temp_dir,
            virtualenv_dir,
        }))
    }
}

/// A provisioned virtualenv, removed on drop
pub struct PythonRuntime {
    temp_dir: TempDir,
    virtualenv_dir: PathBuf,
}

impl Runtime for PythonRuntime {
    fn before_step(&self, _step: &Step) -> Option<String> {
        let activate = self.virtualenv_dir.join("bin").join("activate");
        Some(format!(". {}", quote(&activate.to_string_lossy())))
    }
}

impl Drop for PythonRuntime {
    fn drop(&mut self) {
        debug!("Releasing virtualenv {}", self.temp_dir.path().display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::SharedOutput;
    use crate::shell::Shell;
    use drydock_core::StepName;
    use std::io::Write;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Shell that records scripts instead of running them
    #[derive(Clone, Default)]
    struct RecordingShell {
        scripts: Arc<Mutex<Vec<String>>>,
        exit_code: i32,
    }

    impl Shell for RecordingShell {
        fn run(
            &self,
            script: &str,
            _cwd: Option<&Path>,
            _output: Option<&mut dyn Write>,
        ) -> std::io::Result<i32> {
            self.scripts.lock().unwrap().push(script.to_string());
            Ok(self.exit_code)
        }
    }

    fn platform(shell: RecordingShell, root: &Path) -> (PythonPlatform, SharedOutput) {
        let output = SharedOutput::new();
        let console = Arc::new(Console::new(shell, output.clone()));
        let temp_root = TempRoot::new(root, Duration::from_secs(60));
        (PythonPlatform::new(console, temp_root), output)
    }

    #[test]
    fn test_matrix_defaults_to_single_version() {
        let base = tempfile::tempdir().unwrap();
        let (platform, _) = platform(RecordingShell::default(), base.path());

        let matrix = platform.matrix(&ProjectConfig::empty()).unwrap();

        assert_eq!(matrix, vec![MatrixEntry::value(DEFAULT_PYTHON_VERSION)]);
    }

    #[test]
    fn test_matrix_has_one_entry_per_version() {
        let base = tempfile::tempdir().unwrap();
        let (platform, _) = platform(RecordingShell::default(), base.path());
        let config = ProjectConfig::from_yaml("python:\n  - 2.7\n  - pypy\n  - \"3.12\"\n").unwrap();

        let matrix = platform.matrix(&config).unwrap();

        assert_eq!(
            matrix,
            vec![
                MatrixEntry::value("2.7"),
                MatrixEntry::value("pypy"),
                MatrixEntry::value("3.12"),
            ]
        );
    }

    #[test]
    fn test_single_version_is_a_one_entry_matrix() {
        let base = tempfile::tempdir().unwrap();
        let (platform, _) = platform(RecordingShell::default(), base.path());
        let config = ProjectConfig::from_yaml("python: \"3.11\"").unwrap();

        assert_eq!(
            platform.matrix(&config).unwrap(),
            vec![MatrixEntry::value("3.11")]
        );
    }

    #[test]
    fn test_python_binary() {
        assert_eq!(PythonPlatform::python_binary("2.7"), "python2.7");
        assert_eq!(PythonPlatform::python_binary("3"), "python3");
        assert_eq!(PythonPlatform::python_binary("pypy"), "pypy");
        assert_eq!(PythonPlatform::python_binary("pypy3"), "pypy3");
    }

    #[test]
    fn test_provisioning_commands() {
        let commands = PythonPlatform::provisioning_commands(Path::new("/tmp/venv"), "3.12");

        let actual: Vec<&str> = commands.iter().map(|c| c.actual.as_str()).collect();
        assert_eq!(
            actual,
            vec![
                "'virtualenv' '/tmp/venv' '--python=python3.12'",
                "'/tmp/venv/bin/pip' 'install' '--upgrade' 'pip'",
                "'/tmp/venv/bin/pip' 'install' '--upgrade' 'setuptools'",
                "'/tmp/venv/bin/pip' 'install' '--upgrade' 'virtualenv'",
            ]
        );
    }

    #[test]
    fn test_runtime_activates_virtualenv_and_is_released_on_drop() {
        let base = tempfile::tempdir().unwrap();
        let shell = RecordingShell::default();
        let (platform, output) = platform(shell.clone(), base.path());

        let runtime = platform
            .create_runtime(Path::new("/project"), &MatrixEntry::value("3.12"))
            .unwrap();

        assert_eq!(shell.scripts.lock().unwrap().len(), 4);
        // Provisioning is quiet: only the description reaches the transcript.
        assert_eq!(
            output.to_string_lossy(),
            "\x1b[1mCreating virtualenv for 3.12\n\x1b[0m"
        );

        let step = Step::new(StepName::Install, vec![]);
        let prefix = runtime.before_step(&step).unwrap();
        assert!(prefix.starts_with(". '"));
        assert!(prefix.ends_with("/virtualenv/bin/activate'"));
        assert!(prefix.contains(&base.path().to_string_lossy().into_owned()));

        assert_eq!(std::fs::read_dir(base.path()).unwrap().count(), 1);
        drop(runtime);
        assert_eq!(std::fs::read_dir(base.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_provisioning_releases_directory() {
        let base = tempfile::tempdir().unwrap();
        let shell = RecordingShell {
            exit_code: 2,
            ..Default::default()
        };
        let (platform, _) = platform(shell.clone(), base.path());

        let err = platform
            .create_runtime(Path::new("/project"), &MatrixEntry::value("2.6"))
            .err()
            .unwrap();

        assert!(matches!(
            err,
            BuildError::Provisioning { return_code: 2, .. }
        ));
        assert_eq!(err.exit_code(), 2);
        // Stops at the first failing provisioning command.
        assert_eq!(shell.scripts.lock().unwrap().len(), 1);
        assert_eq!(std::fs::read_dir(base.path()).unwrap().count(), 0);
    }
}
