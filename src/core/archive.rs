use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use flate2::{Compression, write::GzEncoder};
use tempfile::NamedTempFile;

use super::workdir::{WORKDIR_NAME, WorkDir};

/// `<basedir>/<tag>/configsnap-<tag>-<phase>.tar.gz`
pub fn archive_path(workdir: &WorkDir, phase: &str) -> PathBuf {
    workdir
        .tag_dir()
        .join(format!("{}-{}-{}.tar.gz", WORKDIR_NAME, workdir.tag(), phase))
}

/// Packs the working directory into a gzip-compressed tarball rooted at
/// `configsnap/`. An existing archive is only replaced with `overwrite`.
pub fn create_archive(workdir: &WorkDir, phase: &str, overwrite: bool) -> Result<PathBuf> {
    if !workdir.exists() {
        bail!("Nothing to archive, {} does not exist", workdir.root().display());
    }

    let path = archive_path(workdir, phase);
    if !overwrite && path.exists() {
        bail!(
            "Archive {} already exists, use --overwrite to replace it",
            path.display()
        );
    }
    write_archive(workdir.root(), &path, overwrite)?;
    Ok(path)
}

/// Builds the tarball in a temporary file next to `dest` and moves it into
/// place only once it is complete.
fn write_archive(source: &Path, dest: &Path, overwrite: bool) -> Result<()> {
    let dir = dest.parent().unwrap_or(Path::new("."));
    let staged = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create archive in {}", dir.display()))?;

    let mut builder = tar::Builder::new(GzEncoder::new(staged, Compression::default()));
    builder.follow_symlinks(false);
    builder
        .append_dir_all(WORKDIR_NAME, source)
        .with_context(|| format!("Failed to add {} to archive", source.display()))?;
    let staged = builder
        .into_inner()
        .and_then(GzEncoder::finish)
        .with_context(|| format!("Failed to write archive: {}", dest.display()))?;

    let persisted = if overwrite {
        staged.persist(dest)
    } else {
        staged.persist_noclobber(dest)
    };
    match persisted {
        Ok(_) => Ok(()),
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => bail!(
            "Archive {} already exists, use --overwrite to replace it",
            dest.display()
        ),
        Err(e) => {
            Err(e.error).with_context(|| format!("Failed to create archive: {}", dest.display()))
        }
    }
}
