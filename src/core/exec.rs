//! Running external commands and shaping their output.

use std::process::{Command, Stdio};

use anyhow::{Context, Result};

use super::entry::CommandEntry;
use crate::utils::{filter_lines, sort_lines};

/// Captured result of one command.
#[derive(Debug)]
pub struct CommandOutput {
    /// Exit code, `None` if the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// First non-empty stderr line, for warnings.
    pub fn stderr_summary(&self) -> Option<&str> {
        self.stderr.lines().map(str::trim).find(|l| !l.is_empty())
    }
}

/// Runs the command to completion with stdin closed.
///
/// Returns an error only when the process cannot be started. A non-zero
/// exit is reported through [`CommandOutput::code`].
pub fn run_command(entry: &CommandEntry) -> Result<CommandOutput> {
    let output = Command::new(&entry.program)
        .args(&entry.args)
        .stdin(Stdio::null())
        .env("LC_ALL", "C")
        .output()
        .with_context(|| format!("Failed to run command: {}", entry.display()))?;

    Ok(CommandOutput {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Applies the entry's line filter, then sorting.
pub fn shape_output(entry: &CommandEntry, stdout: &str) -> String {
    let filtered = match &entry.line_filter {
        Some(filter) => filter_lines(stdout, filter),
        None => stdout.to_string(),
    };
    if entry.sort {
        sort_lines(&filtered)
    } else {
        filtered
    }
}
