//! Shell execution
//!
//! The console hands every command to a [`Shell`]. [`LocalShell`] runs it as
//! `sh -c <command>` on this machine, with stdout and stderr merged into a
//! single stream so the transcript keeps the order the program wrote in.

use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use tracing::debug;

/// Capability to run a shell command and report its exit code
pub trait Shell: Send + Sync {
    /// Runs `script` under `sh -c`
    ///
    /// # Arguments
    /// * `script` - Shell source to execute
    /// * `cwd` - Working directory (None = inherit)
    /// * `output` - Receives merged stdout and stderr; None discards them
    ///
    /// # Returns
    /// The exit code. Errors only when the process could not be run at all.
    fn run(&self, script: &str, cwd: Option<&Path>, output: Option<&mut dyn Write>)
    -> io::Result<i32>;
}

/// Runs commands as child processes of the current one
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalShell;

impl LocalShell {
    pub fn new() -> Self {
        Self
    }
}

impl Shell for LocalShell {
    fn run(
        &self,
        script: &str,
        cwd: Option<&Path>,
        output: Option<&mut dyn Write>,
    ) -> io::Result<i32> {
        let mut command = Command::new("sh");
        command.arg("-c").arg(script).stdin(Stdio::null());
        if let Some(cwd) = cwd {
            command.current_dir(cwd);
        }

        debug!("Executing: sh -c {:?} (cwd: {:?})", script, cwd);

        let status = match output {
            None => command.stdout(Stdio::null()).stderr(Stdio::null()).status()?,
            Some(output) => {
                let (mut reader, writer) = io::pipe()?;
                command.stdout(writer.try_clone()?).stderr(writer);
                let mut child = command.spawn()?;

                // The command still holds our copies of the write end; the
                // reader only sees EOF once they are closed.
                drop(command);

                let copied = io::copy(&mut reader, output);
                if copied.is_err() {
                    // Keep draining so the child cannot block on a full pipe.
                    let _ = io::copy(&mut reader, &mut io::sink());
                }
                let status = child.wait()?;
                copied?;
                status
            }
        };

        let code = exit_code(status);
        debug!("Command exited with code {}", code);
        Ok(code)
    }
}

/// Exit code of a finished process; `128 + signal` when killed by a signal
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
