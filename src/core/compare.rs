//! Phase comparison.
//!
//! Every directory below the working directory is listed for
//! `*.<pre>` and `*.<phase>` artifacts. Names present in both are diffed
//! with `diff -u -B -w`, so blank-line and whitespace-only changes do not
//! count. Names present on one side only are reported as added or removed.

use std::{
    collections::BTreeSet,
    path::Path,
    process::{Command, Stdio},
};

use anyhow::{Context, Result, bail};
use glob::{Pattern, glob};
use walkdir::WalkDir;

use super::workdir::artifact_file_name;

/// Artifacts that differ on every run and are never compared.
pub const VOLATILE_ARTIFACTS: &[&str] = &["df", "dmesg", "ps", "sysctl"];

/// Phases that are compared against the pre suffix without `--force-compare`.
pub const COMPARED_PHASES: &[&str] = &["post", "rollback"];

/// Unified diff of one artifact pair.
#[derive(Debug, Clone)]
pub struct FileDiff {
    /// Artifact name relative to the working directory, without suffix.
    pub name: String,
    pub diff: String,
}

#[derive(Debug, Default)]
pub struct CompareReport {
    pub pre_suffix: String,
    pub phase: String,
    pub diffs: Vec<FileDiff>,
    /// Present in the compared phase only.
    pub added: Vec<String>,
    /// Present in the pre phase only.
    pub removed: Vec<String>,
    pub unchanged: usize,
    /// Volatile names that were not compared.
    pub skipped: Vec<String>,
    /// Pairs that could not be compared.
    pub errors: Vec<String>,
}

impl CompareReport {
    pub fn has_differences(&self) -> bool {
        !self.diffs.is_empty() || !self.added.is_empty() || !self.removed.is_empty()
    }

    /// False when some pair could not be diffed, so a clean result cannot
    /// be trusted.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn compared(&self) -> usize {
        self.unchanged + self.diffs.len()
    }
}

pub struct Comparator<'a> {
    root: &'a Path,
    pre_suffix: &'a str,
    phase: &'a str,
}

impl<'a> Comparator<'a> {
    pub fn new(root: &'a Path, pre_suffix: &'a str, phase: &'a str) -> Self {
        Self {
            root,
            pre_suffix,
            phase,
        }
    }

    pub fn compare(&self) -> Result<CompareReport> {
        if !self.root.is_dir() {
            bail!("Nothing to compare, {} does not exist", self.root.display());
        }

        let mut report = CompareReport {
            pre_suffix: self.pre_suffix.to_string(),
            phase: self.phase.to_string(),
            ..Default::default()
        };

        for dir in WalkDir::new(self.root).sort_by_file_name() {
            let dir = dir.with_context(|| format!("Failed to list {}", self.root.display()))?;
            if dir.file_type().is_dir() {
                self.compare_directory(dir.path(), &mut report)?;
            }
        }

        Ok(report)
    }

    fn compare_directory(&self, dir: &Path, report: &mut CompareReport) -> Result<()> {
        let pre = list_stems(dir, self.pre_suffix)?;
        let post = list_stems(dir, self.phase)?;
        let relative_dir = dir.strip_prefix(self.root).unwrap_or(dir);

        for stem in pre.union(&post) {
            let name = relative_dir.join(stem).to_string_lossy().into_owned();
            if VOLATILE_ARTIFACTS.contains(&name.as_str()) {
                report.skipped.push(name);
                continue;
            }

            match (pre.contains(stem), post.contains(stem)) {
                (true, true) => {
                    let pre_path = dir.join(artifact_file_name(stem, self.pre_suffix));
                    let post_path = dir.join(artifact_file_name(stem, self.phase));
                    match diff_files(&pre_path, &post_path, &name, self.pre_suffix, self.phase) {
                        Ok(None) => report.unchanged += 1,
                        Ok(Some(diff)) => report.diffs.push(FileDiff { name, diff }),
                        Err(e) => report.errors.push(format!("{}: {:#}", name, e)),
                    }
                }
                (false, true) => report.added.push(name),
                (true, false) => report.removed.push(name),
                (false, false) => {}
            }
        }
        Ok(())
    }
}

/// Names of the regular files in `dir` ending in `.<suffix>`, suffix removed.
fn list_stems(dir: &Path, suffix: &str) -> Result<BTreeSet<String>> {
    let pattern = format!(
        "{}/*.{}",
        Pattern::escape(&dir.to_string_lossy()),
        Pattern::escape(suffix)
    );
    let entries = glob(&pattern).with_context(|| format!("Invalid listing pattern: {}", pattern))?;

    let tail = format!(".{}", suffix);
    let mut stems = BTreeSet::new();
    for path in entries.flatten() {
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        match file_name.strip_suffix(&tail) {
            Some(stem) if !stem.is_empty() => {
                stems.insert(stem.to_string());
            }
            _ => {}
        }
    }
    Ok(stems)
}

/// Runs `diff -u -B -w` on the pair.
///
/// Returns `None` when the files match, the unified diff when they differ.
pub fn diff_files(
    pre: &Path,
    post: &Path,
    name: &str,
    pre_suffix: &str,
    phase: &str,
) -> Result<Option<String>> {
    let output = Command::new("diff")
        .args(["-u", "-B", "-w"])
        .arg("--label")
        .arg(artifact_file_name(name, pre_suffix))
        .arg("--label")
        .arg(artifact_file_name(name, phase))
        .arg(pre)
        .arg(post)
        .stdin(Stdio::null())
        .env("LC_ALL", "C")
        .output()
        .context("Failed to run diff")?;

    match output.status.code() {
        Some(0) => Ok(None),
        Some(1) => Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned())),
        code => bail!(
            "diff failed ({}): {}",
            code.map_or_else(|| "signal".to_string(), |c| format!("exit status {}", c)),
            String::from_utf8_lossy(&output.stderr).trim()
        ),
    }
}

/// Whether a run in `phase` compares against `pre_suffix`.
pub fn should_compare(phase: &str, pre_suffix: &str, force: bool) -> bool {
    phase != pre_suffix && (force || COMPARED_PHASES.contains(&phase))
}
