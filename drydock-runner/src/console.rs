//! Console
//!
//! Runs commands through a [`Shell`] and writes the build transcript: a bold
//! progress description, then `$ <command>` and the command's output for
//! each command. Failures are returned as [`RunResult`] values so callers
//! decide whether a failing command is fatal or merely advisory.

use drydock_core::{Command, RunResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, warn};

use crate::shell::Shell;

const BOLD: &[u8] = b"\x1b[1m";
const RESET: &[u8] = b"\x1b[0m";

/// Exit code reported when a command could not be started at all
pub const SPAWN_FAILURE_CODE: i32 = 127;

/// Options for [`Console::run_all`]
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Suppress command echo and output; the description is still written
    pub quiet: bool,
    /// Working directory for every command
    pub cwd: Option<PathBuf>,
}

impl RunOptions {
    pub fn quiet() -> Self {
        Self {
            quiet: true,
            cwd: None,
        }
    }

    pub fn in_dir(cwd: impl Into<PathBuf>) -> Self {
        Self {
            quiet: false,
            cwd: Some(cwd.into()),
        }
    }
}

/// Command runner writing to a single shared transcript
pub struct Console {
    shell: Box<dyn Shell>,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl Console {
    /// Creates a console
    ///
    /// # Arguments
    /// * `shell` - Executes the commands
    /// * `sink` - Receives the whole transcript of the build
    pub fn new(shell: impl Shell + 'static, sink: impl Write + Send + 'static) -> Self {
        Self {
            shell: Box::new(shell),
            sink: Mutex::new(Box::new(sink)),
        }
    }

    /// Runs a single command
    pub fn run(
        &self,
        description: &str,
        command: impl Into<Command>,
        options: &RunOptions,
    ) -> RunResult {
        self.run_all(description, &[command.into()], options)
    }

    /// Runs commands in order, stopping at the first failure
    ///
    /// # Returns
    /// Code 0 if every command succeeded, otherwise the exit code of the
    /// first command that failed
    pub fn run_all(&self, description: &str, commands: &[Command], options: &RunOptions) -> RunResult {
        // Held for the whole call: one command writes to the transcript at a time.
        let mut sink = self.lock_sink();

        if !description.is_empty() {
            write_or_warn(&mut sink, &[BOLD, description.as_bytes(), b"\n", RESET]);
            if let Err(e) = sink.flush() {
                warn!("Failed to flush console output: {}", e);
            }
        }

        let cwd = options.cwd.as_deref();

        for command in commands {
            let code = self.run_one(&mut sink, command, options.quiet, cwd);
            if code != 0 {
                debug!("Command '{}' failed with exit code {}", command.display, code);
                return RunResult::new(code);
            }
        }

        RunResult::success()
    }

    fn run_one(
        &self,
        sink: &mut MutexGuard<'_, Box<dyn Write + Send>>,
        command: &Command,
        quiet: bool,
        cwd: Option<&Path>,
    ) -> i32 {
        if !quiet {
            write_or_warn(sink, &[b"$ ", command.display.as_bytes(), b"\n"]);
        }

        let output: Option<&mut dyn Write> = if quiet { None } else { Some(&mut ***sink) };

        match self.shell.run(&command.actual, cwd, output) {
            Ok(code) => code,
            Err(e) => {
                error!("Failed to run '{}': {}", command.display, e);
                if !quiet {
                    let message = format!("drydock: failed to run command: {}\n", e);
                    write_or_warn(sink, &[message.as_bytes()]);
                }
                SPAWN_FAILURE_CODE
            }
        }
    }

    fn lock_sink(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        match self.sink.lock() {
            Ok(sink) => sink,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn write_or_warn(sink: &mut MutexGuard<'_, Box<dyn Write + Send>>, parts: &[&[u8]]) {
    for part in parts {
        if let Err(e) = sink.write_all(part) {
            warn!("Failed to write console output: {}", e);
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::SharedOutput;
    use crate::shell::LocalShell;

    fn local_console() -> (Console, SharedOutput) {
        let output = SharedOutput::new();
        (Console::new(LocalShell::new(), output.clone()), output)
    }

    #[test]
    fn test_console_writes_description_command_and_output() {
        let (console, output) = local_console();

        let result = console.run("Action", "echo 'hi'", &RunOptions::default());

        assert!(result.is_success());
        assert_eq!(
            output.to_string_lossy(),
            "\x1b[1mAction\n\x1b[0m$ echo 'hi'\nhi\n"
        );
    }

    #[test]
    fn test_quiet_mode_only_writes_description() {
        let (console, output) = local_console();

        let result = console.run("Action", "echo 'hi'", &RunOptions::quiet());

        assert!(result.is_success());
        assert_eq!(output.to_string_lossy(), "\x1b[1mAction\n\x1b[0m");
    }

    #[test]
    fn test_empty_description_is_not_written() {
        let (console, output) = local_console();

        console.run("", "echo 'hi'", &RunOptions::default());

        assert_eq!(output.to_string_lossy(), "$ echo 'hi'\nhi\n");
    }

    #[test]
    fn test_argument_vectors_are_quoted() {
        let (console, output) = local_console();

        console.run(
            "Action",
            Command::from_args(["echo", "Go go go!", "it's"]),
            &RunOptions::default(),
        );

        assert!(output.to_string_lossy().ends_with("Go go go! it's\n"));
    }

    #[test]
    fn test_first_failure_stops_execution() {
        let (console, output) = local_console();
        let commands = vec![
            Command::shell("echo one"),
            Command::shell("exit 3"),
            Command::shell("echo three"),
        ];

        let result = console.run_all("", &commands, &RunOptions::default());

        assert_eq!(result.return_code, 3);
        let transcript = output.to_string_lossy();
        assert!(transcript.contains("one\n"));
        assert!(!transcript.contains("echo three"));
    }

    #[test]
    fn test_no_commands_is_success() {
        let (console, output) = local_console();

        let result = console.run_all("Copying project", &[], &RunOptions::quiet());

        assert!(result.is_success());
        assert_eq!(output.to_string_lossy(), "\x1b[1mCopying project\n\x1b[0m");
    }

    #[test]
    fn test_hidden_prefix_runs_but_is_not_echoed() {
        let (console, output) = local_console();

        let command = Command::hidden_prefix("echo $GREETING", "export GREETING=hello");
        console.run("", command, &RunOptions::default());

        assert_eq!(output.to_string_lossy(), "$ echo $GREETING\nhello\n");
    }

    #[test]
    fn test_commands_run_in_working_directory() {
        let (console, output) = local_console();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("present"), "").unwrap();

        let result = console.run("", "test -f present", &RunOptions::in_dir(dir.path()));

        assert!(result.is_success());
        assert_eq!(output.to_string_lossy(), "$ test -f present\n");
    }

    struct BrokenShell;

    impl Shell for BrokenShell {
        fn run(
            &self,
            _script: &str,
            _cwd: Option<&Path>,
            _output: Option<&mut dyn Write>,
        ) -> std::io::Result<i32> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no sh"))
        }
    }

    #[test]
    fn test_spawn_failure_is_a_result_not_an_error() {
        let output = SharedOutput::new();
        let console = Console::new(BrokenShell, output.clone());

        let result = console.run("", "true", &RunOptions::default());

        assert_eq!(result.return_code, SPAWN_FAILURE_CODE);
        assert!(output.to_string_lossy().contains("failed to run command: no sh"));
    }
}
