//! Command domain types

/// A unit of shell work
///
/// `display` is what gets echoed to the build transcript, `actual` is what the
/// shell executes. Runtimes use the gap between the two to inject setup (such
/// as activating a virtualenv) without it showing up in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub display: String,
    pub actual: String,
}

impl Command {
    /// A command that is echoed exactly as it runs
    pub fn shell(command: impl Into<String>) -> Self {
        let command = command.into();
        Self {
            display: command.clone(),
            actual: command,
        }
    }

    /// A command whose `actual` form runs `prefix` first
    ///
    /// The command only runs if the prefix succeeds. The prefix never
    /// appears in the displayed form.
    pub fn hidden_prefix(command: impl Into<String>, prefix: &str) -> Self {
        let display = command.into();
        let actual = format!("{} && {}", prefix, display);
        Self { display, actual }
    }

    /// Builds a command from an argument vector
    ///
    /// Every argument is single-quoted so spaces and shell metacharacters
    /// reach the program untouched.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = args
            .into_iter()
            .map(|arg| quote(arg.as_ref()))
            .collect::<Vec<_>>()
            .join(" ");
        Self::shell(joined)
    }
}

impl From<&str> for Command {
    fn from(command: &str) -> Self {
        Self::shell(command)
    }
}

impl From<String> for Command {
    fn from(command: String) -> Self {
        Self::shell(command)
    }
}

/// Single-quotes an argument for `sh`
pub fn quote(arg: &str) -> String {
    // A quote cannot appear inside single quotes: close, emit \', reopen.
    format!("'{}'", arg.replace('\'', r"'\''"))
}
