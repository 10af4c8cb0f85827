//! # Cleanup command lines.
//!
//! ```text
//! tmpreaper --all --showdeleted --force <tmp_max_age> <tmp_dir>
//! find <log_dir> -mindepth 1 ! -regex <preserve_pattern> -delete
//! ```
//!
//! Arguments are passed as an argv vector, never through a shell, so the
//! preserve pattern reaches `find` exactly as configured (quotes included).

use std::ffi::OsString;
use std::fmt;

use crate::config::Config;

/// Identifies a cleanup step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CleanupStep {
    /// Purge stale files from the temp directory.
    ReapTemp,
    /// Empty the log directory, minus the preserved path.
    PurgeLogs,
}

impl CleanupStep {
    /// Informational line printed right before the step runs.
    pub fn announcement(self) -> &'static str {
        match self {
            CleanupStep::ReapTemp => "Clearing out temp space",
            CleanupStep::PurgeLogs => "Emptying log directories",
        }
    }

    /// Short stable label (snake_case) for use in logs.
    pub fn as_label(self) -> &'static str {
        match self {
            CleanupStep::ReapTemp => "reap_temp",
            CleanupStep::PurgeLogs => "purge_logs",
        }
    }
}

impl fmt::Display for CleanupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// One external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupCommand {
    /// Step this command implements.
    pub step: CleanupStep,
    /// Executable, resolved through `PATH`.
    pub program: OsString,
    /// Arguments, passed verbatim.
    pub args: Vec<OsString>,
}

impl CleanupCommand {
    /// Creates a command for `step`.
    pub fn new<P, I, A>(step: CleanupStep, program: P, args: I) -> Self
    where
        P: Into<OsString>,
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        Self {
            step,
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Temp reaper invocation: all users, report deletions, no confirmation.
    pub fn reap_temp(cfg: &Config) -> Self {
        let args: [OsString; 5] = [
            "--all".into(),
            "--showdeleted".into(),
            "--force".into(),
            cfg.tmp_max_age.clone().into(),
            cfg.tmp_dir.clone().into(),
        ];
        Self::new(CleanupStep::ReapTemp, cfg.reaper_program.clone(), args)
    }

    /// Tree deletion below `log_dir` (depth >= 1) excluding the preserve pattern.
    pub fn purge_logs(cfg: &Config) -> Self {
        let args: [OsString; 7] = [
            cfg.log_dir.clone().into(),
            "-mindepth".into(),
            "1".into(),
            "!".into(),
            "-regex".into(),
            cfg.preserve_pattern.clone().into(),
            "-delete".into(),
        ];
        Self::new(CleanupStep::PurgeLogs, cfg.find_program.clone(), args)
    }

    /// Renders the command line for diagnostics.
    pub fn display(&self) -> String {
        let mut out = self.program.to_string_lossy().into_owned();
        for arg in &self.args {
            out.push(' ');
            out.push_str(&arg.to_string_lossy());
        }
        out
    }
}

/// The ordered cleanup steps of the fatal path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupPlan {
    steps: Vec<CleanupCommand>,
}

impl CleanupPlan {
    /// Temp reaper first, then the log directory purge.
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            steps: vec![CleanupCommand::reap_temp(cfg), CleanupCommand::purge_logs(cfg)],
        }
    }

    /// Commands in execution order.
    pub fn steps(&self) -> &[CleanupCommand] {
        &self.steps
    }
}
