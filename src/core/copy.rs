//! Plain file and recursive directory copies into the working directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use walkdir::WalkDir;

use super::{
    entry::{DirectoryEntry, FileEntry},
    workdir::artifact_file_name,
};
use crate::utils::sort_lines;

/// Copies `entry.path` to `dest`, sorting lines if requested.
pub fn copy_file(entry: &FileEntry, dest: &Path) -> Result<()> {
    copy_contents(&entry.path, dest, entry.sort)
}

/// Summary of one directory copy.
#[derive(Debug, Default)]
pub struct DirectoryCopy {
    pub copied: Vec<PathBuf>,
    /// Entries that could not be read and were left out.
    pub unreadable: Vec<String>,
}

/// Copies every regular file below `entry.path`, or symlink to one, whose
/// name matches the entry's pattern to `<root>/<name>/<relative path>.<phase>`.
pub fn copy_directory(entry: &DirectoryEntry, root: &Path, phase: &str) -> Result<DirectoryCopy> {
    if !entry.path.is_dir() {
        bail!("Directory not found: {}", entry.path.display());
    }

    let target_root = root.join(&entry.name);
    let mut result = DirectoryCopy::default();

    for item in WalkDir::new(&entry.path).follow_links(false).sort_by_file_name() {
        let item = match item {
            Ok(item) => item,
            Err(e) => {
                result.unreadable.push(e.to_string());
                continue;
            }
        };
        if !entry.wants(&item.file_name().to_string_lossy()) {
            continue;
        }
        let file_type = item.file_type();
        if file_type.is_symlink() {
            // Symlinked files are copied as the file they point to.
            match fs::metadata(item.path()) {
                Ok(meta) if meta.is_file() => {}
                Ok(_) => continue,
                Err(e) => {
                    result
                        .unreadable
                        .push(format!("{}: {}", item.path().display(), e));
                    continue;
                }
            }
        } else if !file_type.is_file() {
            continue;
        }

        let relative = item
            .path()
            .strip_prefix(&entry.path)
            .with_context(|| format!("Unexpected path: {}", item.path().display()))?;
        let Some(file_name) = relative.file_name() else {
            continue;
        };
        let dest_name = artifact_file_name(&file_name.to_string_lossy(), phase);
        let dest = match relative.parent() {
            Some(parent) => target_root.join(parent).join(dest_name),
            None => target_root.join(dest_name),
        };

        match copy_contents(item.path(), &dest, entry.sort) {
            Ok(()) => result.copied.push(dest),
            Err(e) => result.unreadable.push(format!("{:#}", e)),
        }
    }

    Ok(result)
}

fn copy_contents(src: &Path, dest: &Path, sort: bool) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    // Read and write instead of fs::copy so a read-only source mode is not
    // carried over to the artifact.
    let bytes = fs::read(src).with_context(|| format!("Failed to read file: {}", src.display()))?;
    let contents = if sort {
        sort_lines(&String::from_utf8_lossy(&bytes)).into_bytes()
    } else {
        bytes
    };
    fs::write(dest, contents).with_context(|| format!("Failed to write file: {}", dest.display()))
}
