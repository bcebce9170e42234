use crate::shell::{run_captured, CommandOutput, ShellError};
use std::time::Duration;

/// Something that can execute a command tag.
///
/// The renderer only ever talks to this trait, so tests can substitute a
/// closure and never spawn a process:
///
/// ```rust
/// use tagfetch_exec::{CommandOutput, CommandRunner, ShellError};
///
/// let fake = |cmd: &str| -> Result<CommandOutput, ShellError> {
///     Ok(CommandOutput::from_stdout(format!("ran {}\n", cmd)))
/// };
/// assert_eq!(fake.run("uptime").unwrap().into_text(), "ran uptime");
/// ```
pub trait CommandRunner {
    /// Run `command` to completion and return what it printed.
    ///
    /// A non-zero exit status is reported in the output, not as an error.
    fn run(&self, command: &str) -> Result<CommandOutput, ShellError>;
}

impl<F> CommandRunner for F
where
    F: Fn(&str) -> Result<CommandOutput, ShellError>,
{
    fn run(&self, command: &str) -> Result<CommandOutput, ShellError> {
        self(command)
    }
}

/// Runs commands through the platform shell (`sh -c`, `cmd /C` on Windows).
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    timeout: Option<Duration>,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill commands that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> Result<CommandOutput, ShellError> {
        log::debug!("running command tag `{}`", command);
        run_captured(command, self.timeout)
    }
}
