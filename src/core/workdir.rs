use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use walkdir::WalkDir;

use crate::utils::invalid_component_reason;

/// Name of the directory holding artifacts below `<basedir>/<tag>/`.
pub const WORKDIR_NAME: &str = "configsnap";

/// Working directory of one tag: `<basedir>/<tag>/configsnap/`.
#[derive(Debug, Clone)]
pub struct WorkDir {
    tag: String,
    tag_dir: PathBuf,
    root: PathBuf,
}

impl WorkDir {
    pub fn new(basedir: &Path, tag: &str) -> Result<Self> {
        validate_label("tag", tag)?;
        let tag_dir = basedir.join(tag);
        let root = tag_dir.join(WORKDIR_NAME);
        Ok(Self {
            tag: tag.to_string(),
            tag_dir,
            root,
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// `<basedir>/<tag>/`, where archives are written.
    pub fn tag_dir(&self) -> &Path {
        &self.tag_dir
    }

    /// `<basedir>/<tag>/configsnap/`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    pub fn create(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create directory: {}", self.root.display()))
    }

    /// Path of the top-level artifact `<name>.<phase>`.
    pub fn artifact(&self, name: &str, phase: &str) -> PathBuf {
        self.root.join(artifact_file_name(name, phase))
    }

    /// Every file anywhere below the working directory that carries the
    /// `.<phase>` suffix.
    pub fn existing_artifacts(&self, phase: &str) -> Vec<PathBuf> {
        if !self.exists() {
            return Vec::new();
        }
        let suffix = format!(".{}", phase);
        let mut found: Vec<PathBuf> = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                let name = entry.file_name().to_string_lossy();
                name.len() > suffix.len() && name.ends_with(&suffix)
            })
            .map(|entry| entry.into_path())
            .collect();
        found.sort();
        found
    }

    /// Deletes every artifact of `phase`, returning how many were removed.
    pub fn clear_phase(&self, phase: &str) -> Result<usize> {
        let existing = self.existing_artifacts(phase);
        for path in &existing {
            fs::remove_file(path)
                .with_context(|| format!("Failed to remove file: {}", path.display()))?;
        }
        Ok(existing.len())
    }

    /// Fails if artifacts for `phase` already exist and `overwrite` is off.
    pub fn ensure_phase_free(&self, phase: &str, overwrite: bool) -> Result<()> {
        if overwrite {
            return Ok(());
        }
        let existing = self.existing_artifacts(phase);
        if let Some(first) = existing.first() {
            bail!(
                "{} file(s) for phase '{}' already exist in {} (e.g. {}), use --overwrite to replace them",
                existing.len(),
                phase,
                self.root.display(),
                first.display()
            );
        }
        Ok(())
    }
}

pub fn artifact_file_name(name: &str, phase: &str) -> String {
    format!("{}.{}", name, phase)
}

/// Validates a tag, phase or suffix used as a single path component.
pub fn validate_label(kind: &str, value: &str) -> Result<()> {
    if let Some(reason) = invalid_component_reason(value) {
        bail!("Invalid {} \"{}\": {}", kind, value, reason);
    }
    Ok(())
}

/// Validates a phase suffix. Dots are rejected so that no phase is the
/// tail of another (`x.a.b` would otherwise count as an artifact of `b`).
pub fn validate_suffix(kind: &str, value: &str) -> Result<()> {
    validate_label(kind, value)?;
    if value.contains('.') {
        bail!("Invalid {} \"{}\": must not contain '.'", kind, value);
    }
    Ok(())
}
