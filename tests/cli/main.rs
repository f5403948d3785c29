use std::{
    env, fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use anyhow::{Context, Result};
use insta_cmd::get_cargo_bin;
use tempfile::TempDir;

mod collect;
mod compare;
mod config;

const BIN_NAME: &str = "configsnap";
const TAG: &str = "CHG-42";

pub struct CliTest {
    _temp_dir: TempDir,
    root_dir: PathBuf,
}

impl CliTest {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let root_dir = temp_dir.path().canonicalize()?;
        Ok(Self {
            _temp_dir: temp_dir,
            root_dir,
        })
    }

    pub fn write_file(&self, path: &str, content: &str) -> Result<PathBuf> {
        let file_path = self.root_dir.join(path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory:{}", parent.display()))?;
        }

        fs::write(&file_path, content)
            .with_context(|| format!("Failed to write file: {}", file_path.display()))?;

        Ok(file_path)
    }

    /// Writes an extension file with safe permissions.
    pub fn write_config(&self, content: &str) -> Result<PathBuf> {
        let path = self.write_file("etc/additional.conf", content)?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644))?;
        Ok(path)
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    /// `<basedir>/<tag>/configsnap/`
    pub fn workdir(&self) -> PathBuf {
        self.root_dir.join("snapshots").join(TAG).join("configsnap")
    }

    /// Writes an artifact directly into the working directory.
    pub fn write_artifact(&self, path: &str, content: &str) -> Result<PathBuf> {
        self.write_file(&format!("snapshots/{}/configsnap/{}", TAG, path), content)
    }

    pub fn read_artifact(&self, path: &str) -> Result<String> {
        let file_path = self.workdir().join(path);
        fs::read_to_string(&file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(get_cargo_bin(BIN_NAME));
        cmd.current_dir(&self.root_dir);
        cmd.env_clear();
        cmd.env("NO_COLOR", "1"); // Disable colors for consistent test output
        if let Some(path) = env::var_os("PATH") {
            cmd.env("PATH", path);
        }
        cmd
    }

    /// Command for the test tag and basedir; the config file, if any, is
    /// the one written by `write_config`.
    pub fn snap_command(&self, phase: &str) -> Command {
        let mut cmd = self.command();
        cmd.arg("--tag")
            .arg(TAG)
            .arg("--phase")
            .arg(phase)
            .arg("--basedir")
            .arg(self.root_dir.join("snapshots"))
            .arg("--config")
            .arg(self.root_dir.join("etc/additional.conf"))
            .arg("--only-custom");
        cmd
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_help() -> Result<()> {
    let test = CliTest::new()?;
    let output = test.command().arg("--help").output()?;

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("--tag"));
    assert!(out.contains("--compare-only"));
    assert!(out.contains("--force-compare"));

    Ok(())
}

#[test]
fn test_missing_tag_exits_with_one() -> Result<()> {
    let test = CliTest::new()?;
    let output = test.command().args(["--phase", "pre"]).output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("No tag specified"));

    Ok(())
}

#[test]
fn test_invalid_tag_exits_with_one() -> Result<()> {
    let test = CliTest::new()?;
    let output = test
        .command()
        .args(["--tag", "../escape", "--phase", "pre"])
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid tag"));

    Ok(())
}
