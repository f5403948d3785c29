//! Runs probes and writes their artifacts for one phase.

use std::{collections::HashSet, fs};

use anyhow::{Context, Result, bail};

use super::{
    catalog::{Group, Probe},
    copy::{copy_directory, copy_file},
    entry::{CommandEntry, DirectoryEntry, Entry, FileEntry},
    exec::{run_command, shape_output},
    workdir::WorkDir,
};
use crate::ui::Console;

/// What happened during collection, for the final report.
#[derive(Debug, Default)]
pub struct CollectSummary {
    /// Artifacts written, directory copies counted per file.
    pub written: usize,
    /// Probes skipped because their binary is not installed.
    pub not_installed: Vec<String>,
    /// Fail-ok probes that failed.
    pub tolerated: Vec<String>,
    /// Non-fatal problems reported to the operator.
    pub warnings: Vec<String>,
}

pub struct Collector<'a> {
    workdir: &'a WorkDir,
    phase: &'a str,
    console: &'a Console,
    seen: HashSet<String>,
    summary: CollectSummary,
}

impl<'a> Collector<'a> {
    pub fn new(workdir: &'a WorkDir, phase: &'a str, console: &'a Console) -> Self {
        Self {
            workdir,
            phase,
            console,
            seen: HashSet::new(),
            summary: CollectSummary::default(),
        }
    }

    /// Runs every probe in order.
    ///
    /// Returns an error for fatal failures: a non-fail-ok command that
    /// cannot be started, or a non-fail-ok file or directory that cannot be
    /// copied.
    pub fn run(mut self, probes: &[Probe]) -> Result<CollectSummary> {
        self.workdir.create()?;

        let mut current_group: Option<Group> = None;
        for probe in probes {
            if current_group != Some(probe.group) {
                self.console.info(probe.group.banner());
                current_group = Some(probe.group);
            }

            let Some(entry) = probe.resolve() else {
                self.console
                    .note(format!("{}: not installed, skipping", probe.entry.name()));
                self.summary
                    .not_installed
                    .push(probe.entry.name().to_string());
                continue;
            };

            if !self.claim_name(entry.name()) {
                continue;
            }

            match &entry {
                Entry::Command(command) => self.collect_command(command)?,
                Entry::File(file) => self.collect_file(file)?,
                Entry::Directory(directory) => self.collect_directory(directory)?,
            }
        }

        Ok(self.summary)
    }

    fn claim_name(&mut self, name: &str) -> bool {
        if name.is_empty() {
            self.warn("entry with an empty artifact name skipped".to_string());
            return false;
        }
        if !self.seen.insert(name.to_string()) {
            self.warn(format!(
                "{}: artifact name already used in this run, skipping",
                name
            ));
            return false;
        }
        true
    }

    fn collect_command(&mut self, entry: &CommandEntry) -> Result<()> {
        self.console.note(format!("running {}", entry.display()));

        let output = match run_command(entry) {
            Ok(output) => output,
            Err(e) if entry.fail_ok => {
                self.tolerate(&entry.name, &e);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if !output.success() {
            if entry.fail_ok {
                self.tolerate(&entry.name, format!("exit status {:?}", output.code));
                return Ok(());
            }
            let detail = output.stderr_summary().unwrap_or("no error output");
            self.warn(format!(
                "{}: command exited with status {} ({})",
                entry.display(),
                output
                    .code
                    .map_or_else(|| "signal".to_string(), |c| c.to_string()),
                detail
            ));
        }

        let dest = self.workdir.artifact(&entry.name, self.phase);
        fs::write(&dest, shape_output(entry, &output.stdout))
            .with_context(|| format!("Failed to write file: {}", dest.display()))?;
        self.summary.written += 1;
        Ok(())
    }

    fn collect_file(&mut self, entry: &FileEntry) -> Result<()> {
        if entry.fail_ok && !entry.path.exists() {
            self.console
                .note(format!("{}: not present, skipping", entry.path.display()));
            return Ok(());
        }

        let dest = self.workdir.artifact(&entry.name, self.phase);
        match copy_file(entry, &dest) {
            Ok(()) => {
                self.summary.written += 1;
                Ok(())
            }
            Err(e) if entry.fail_ok => {
                self.tolerate(&entry.name, format!("{:#}", e));
                Ok(())
            }
            Err(e) => Err(e.context(format!(
                "Required file {} could not be copied",
                entry.path.display()
            ))),
        }
    }

    fn collect_directory(&mut self, entry: &DirectoryEntry) -> Result<()> {
        if !entry.path.is_dir() {
            if entry.fail_ok {
                self.console
                    .note(format!("{}: not present, skipping", entry.path.display()));
                return Ok(());
            }
            bail!("Required directory not found: {}", entry.path.display());
        }

        let copy = match copy_directory(entry, self.workdir.root(), self.phase) {
            Ok(copy) => copy,
            Err(e) if entry.fail_ok => {
                self.tolerate(&entry.name, format!("{:#}", e));
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        self.summary.written += copy.copied.len();
        for problem in copy.unreadable {
            if entry.fail_ok {
                self.tolerate(&entry.name, problem);
            } else {
                self.warn(format!("{}: {}", entry.path.display(), problem));
            }
        }
        Ok(())
    }

    fn tolerate(&mut self, name: &str, reason: impl std::fmt::Display) {
        self.console.note(format!("{}: failed ({}), ignoring", name, reason));
        self.summary.tolerated.push(name.to_string());
    }

    fn warn(&mut self, message: String) {
        self.console.warn(&message);
        self.summary.warnings.push(message);
    }
}
