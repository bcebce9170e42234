use std::io::Read;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use wait_timeout::ChildExt;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Command `{0}` timed out after {1:?}")]
    Timeout(String, Duration),
}

/// What a finished command left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Everything the command wrote to stdout, lossily decoded.
    pub stdout: String,
    /// Exit status, if the process could be waited on.
    pub status: Option<ExitStatus>,
}

impl CommandOutput {
    /// Output for a command that produced `stdout` and exited cleanly.
    ///
    /// Used by test runners that never spawn a process.
    pub fn from_stdout(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            status: None,
        }
    }

    pub fn success(&self) -> bool {
        self.status.map_or(true, |s| s.success())
    }

    /// The captured stdout with one trailing newline removed.
    pub fn into_text(self) -> String {
        strip_trailing_newline(self.stdout)
    }
}

/// Removes a single trailing `\n` (and a `\r` before it, if present).
pub fn strip_trailing_newline(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    text
}

/// Builds the platform shell invocation for `command_str`.
pub fn shell_command(command_str: &str) -> Command {
    if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command_str);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command_str);
        c
    }
}

/// Execute a shell command and capture its stdout.
///
/// A non-zero exit is not an error: the output captured so far is returned
/// together with the status. Spawn failures and an exceeded `timeout` are
/// errors.
///
/// # Arguments
///
/// * `command_str` - The shell command to execute
/// * `timeout` - Optional timeout; if exceeded, the process is killed
///
/// # Notes
///
/// Stdout is drained on a helper thread while the child is waited on.
pub fn run_captured(
    command_str: &str,
    timeout: Option<Duration>,
) -> Result<CommandOutput, ShellError> {
    let mut cmd = shell_command(command_str);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit());

    let mut child = cmd.spawn()?;

    let reader = child.stdout.take().map(|mut stdout| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let read = stdout.read_to_end(&mut buf);
            (buf, read)
        })
    });

    let status = match timeout {
        Some(duration) => match child.wait_timeout(duration)? {
            Some(status) => status,
            None => {
                child.kill()?;
                child.wait()?;
                return Err(ShellError::Timeout(command_str.to_string(), duration));
            }
        },
        None => child.wait()?,
    };

    let mut stdout = String::new();
    if let Some(handle) = reader {
        match handle.join() {
            Ok((buf, read)) => {
                stdout = String::from_utf8_lossy(&buf).into_owned();
                if let Err(err) = read {
                    log::warn!("partial output from `{}`: {}", command_str, err);
                }
            }
            Err(_) => log::warn!("stdout reader for `{}` panicked", command_str),
        }
    }

    if !status.success() {
        log::debug!("command `{}` exited with {}", command_str, status);
    }

    Ok(CommandOutput {
        stdout,
        status: Some(status),
    })
}
