//! # Command execution.
//!
//! [`ProcessRunner`] spawns each [`CleanupCommand`] with captured output and
//! waits for it without a timeout. Whatever happens (non-zero exit, missing
//! executable) is folded into a [`CommandOutcome`]; running a cleanup
//! command never fails the loop.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::CleanupCommand;

/// Result of one cleanup command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Exited with status 0.
    Success,
    /// Exited non-zero or was killed by a signal (`code = None`).
    Failed {
        /// Exit code, if the process exited normally.
        code: Option<i32>,
        /// Captured stderr, lossily decoded.
        stderr: String,
    },
    /// The process could not be started.
    SpawnFailed {
        /// The spawn error message.
        error: String,
    },
}

impl CommandOutcome {
    /// True for [`CommandOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, CommandOutcome::Success)
    }

    /// Short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            CommandOutcome::Success => "success",
            CommandOutcome::Failed { .. } => "failed",
            CommandOutcome::SpawnFailed { .. } => "spawn_failed",
        }
    }

    /// Human-readable detail, `None` on success.
    pub fn detail(&self) -> Option<String> {
        match self {
            CommandOutcome::Success => None,
            CommandOutcome::Failed { code: Some(c), stderr } => {
                Some(format!("exit code {c}: {}", stderr.trim()))
            }
            CommandOutcome::Failed { code: None, stderr } => {
                Some(format!("terminated by signal: {}", stderr.trim()))
            }
            CommandOutcome::SpawnFailed { error } => Some(format!("spawn failed: {error}")),
        }
    }
}

/// Execution seam for cleanup commands.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `cmd` to completion and reports what happened.
    async fn run(&self, cmd: &CleanupCommand) -> CommandOutcome;
}

/// Runs commands as child processes with stdin closed and output captured.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Construct a new [`ProcessRunner`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, cmd: &CleanupCommand) -> CommandOutcome {
        let output = Command::new(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .output()
            .await;

        match output {
            Ok(out) if out.status.success() => CommandOutcome::Success,
            Ok(out) => CommandOutcome::Failed {
                code: out.status.code(),
                stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
            },
            Err(e) => CommandOutcome::SpawnFailed {
                error: e.to_string(),
            },
        }
    }
}
