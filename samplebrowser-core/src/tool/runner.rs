//! Process execution for tool invocations.
//!
//! Every call into the tool goes through the `ProcessRunner` trait so the
//! locator and gateway can be driven by an in-memory fake in tests. The
//! system implementation runs the program directly (no shell), so paths and
//! arguments containing spaces are passed through untouched.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::error::GatewayError;

/// Default bound on a single tool invocation (2 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, or `None` if the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// Returns true if the process exited with code 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Stdout if it has content, otherwise stderr.
    pub fn text(&self) -> &str {
        if self.stdout.trim().is_empty() {
            &self.stderr
        } else {
            &self.stdout
        }
    }
}

/// Runs a program with arguments and captures its output.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs `program` with `args` to completion.
    ///
    /// A non-zero exit is not an error at this layer; it is reported
    /// through `ProcessOutput::code`.
    async fn run(&self, program: &Path, args: &[String]) -> Result<ProcessOutput, GatewayError>;
}

/// `ProcessRunner` backed by `tokio::process`.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout_secs: u64,
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_SECS)
    }
}

impl SystemRunner {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, program: &Path, args: &[String]) -> Result<ProcessOutput, GatewayError> {
        debug!(program = %program.display(), ?args, "Running tool");

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Headless output
        cmd.env("TERM", "dumb");
        cmd.env("NO_COLOR", "1");
        cmd.env("CLICOLOR", "0");

        let child = cmd.spawn().map_err(|source| GatewayError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;

        let output = match timeout(Duration::from_secs(self.timeout_secs), child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| GatewayError::Spawn {
                program: program.to_path_buf(),
                source,
            })?,
            // The child is killed when its future is dropped.
            Err(_) => {
                return Err(GatewayError::Timeout {
                    program: program.to_path_buf(),
                    secs: self.timeout_secs,
                })
            }
        };

        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
