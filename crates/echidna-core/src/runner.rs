//! Child-process execution with captured output.
//!
//! The runner never treats a nonzero exit as an error: whatever the external
//! tool printed is handed back verbatim. Only a failure to launch the process
//! at all is folded into an [`InvocationResult`] carrying
//! [`LAUNCH_FAILURE_CODE`]. A child killed by signal `N` reports `-N` and
//! records the signal in [`InvocationResult::signal`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Exit status reported when the process could not be started.
pub const LAUNCH_FAILURE_CODE: i32 = -1;

/// An argument vector (program first) plus an optional working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            args: vec![program.into()],
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append `flag value` only when `value` is present.
    pub fn flag_opt(self, flag: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.arg(flag).arg(value),
            None => self,
        }
    }

    pub fn current_dir(mut self, dir: Option<impl Into<PathBuf>>) -> Self {
        self.cwd = dir.map(Into::into);
        self
    }

    pub fn argv(&self) -> &[String] {
        &self.args
    }

    pub fn cwd(&self) -> Option<&PathBuf> {
        self.cwd.as_ref()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.args.join(" "))
    }
}

/// Captured output of one child process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResult {
    pub stdout: String,
    pub stderr: String,
    pub returncode: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<i32>,
}

impl InvocationResult {
    pub fn launch_failure(message: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: message.into(),
            returncode: LAUNCH_FAILURE_CODE,
            signal: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.returncode == 0
    }

    /// True when the process never started (SIGHUP also maps to `-1`).
    pub fn is_launch_failure(&self) -> bool {
        self.returncode == LAUNCH_FAILURE_CODE && self.signal.is_none()
    }
}

#[cfg(unix)]
fn terminating_signal(status: &std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn terminating_signal(_status: &std::process::ExitStatus) -> Option<i32> {
    None
}

/// Run `spec` to completion and capture stdout, stderr and the exit code.
pub async fn run_command(spec: &CommandSpec) -> InvocationResult {
    let Some((program, rest)) = spec.args.split_first() else {
        return InvocationResult::launch_failure("empty command");
    };
    debug!(command = %spec, cwd = ?spec.cwd, "spawning process");

    let mut cmd = tokio::process::Command::new(program);
    cmd.args(rest);
    if let Some(dir) = &spec.cwd {
        cmd.current_dir(dir);
    }

    let output = match cmd.output().await {
        Ok(output) => output,
        Err(e) => {
            warn!(%program, error = %e, "failed to launch process");
            return InvocationResult::launch_failure(format!("Failed to run {}: {}", program, e));
        }
    };

    let signal = match output.status.code() {
        Some(_) => None,
        None => terminating_signal(&output.status),
    };
    let returncode = output
        .status
        .code()
        .or(signal.map(|sig| -sig))
        .unwrap_or(LAUNCH_FAILURE_CODE);
    debug!(%program, returncode, ?signal, "process finished");

    InvocationResult {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        returncode,
        signal,
    }
}
