use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::{Duration, timeout};
use tracing::debug;

use crate::error::FamiliarError;

/// A program plus an explicit argument vector. Never passed through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
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

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Human-readable form for logs
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Turn a non-zero exit into a [`FamiliarError::Process`]
    pub fn ensure_success(self, program: &str) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(FamiliarError::Process {
                program: program.to_string(),
                code: self.code,
                stderr: self.stderr.trim().to_string(),
            }
            .into())
        }
    }
}

/// Runs external programs on behalf of tool adapters and the installer
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<ProcessOutput>;
}

/// Runner backed by real child processes
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ProcessOutput> {
        debug!(command = %invocation.display(), "running external command");

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        if let Some(dir) = &invocation.cwd {
            cmd.current_dir(dir);
        }

        // kill_on_drop reaps the child if the timeout drops the future
        let child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn {}", invocation.program))?;

        let output = match self.timeout {
            Some(limit) => timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| {
                    anyhow::anyhow!(
                        "{} timed out after {} seconds",
                        invocation.program,
                        limit.as_secs()
                    )
                })?,
            None => child.wait_with_output().await,
        }
        .with_context(|| format!("failed to wait for {}", invocation.program))?;

        let result = ProcessOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        debug!(
            program = %invocation.program,
            code = ?result.code,
            stdout_bytes = result.stdout.len(),
            "external command finished"
        );

        Ok(result)
    }
}
