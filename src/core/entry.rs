//! Collection steps.
//!
//! Both the built-in catalog and the operator's extension file describe
//! what to collect as a list of [`Entry`] values, validated up front so the
//! collector never has to look at raw configuration.

use std::path::{Path, PathBuf};

use regex::Regex;

/// Shell used for commands declared in the extension file.
pub const SHELL: &str = "/bin/sh";

#[derive(Debug, Clone)]
pub enum Entry {
    File(FileEntry),
    Directory(DirectoryEntry),
    Command(CommandEntry),
}

impl Entry {
    /// Logical artifact name (without the phase suffix).
    pub fn name(&self) -> &str {
        match self {
            Entry::File(e) => &e.name,
            Entry::Directory(e) => &e.name,
            Entry::Command(e) => &e.name,
        }
    }
}

/// Copy of a single file to `<name>.<phase>`.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub sort: bool,
    pub fail_ok: bool,
}

impl FileEntry {
    /// Entry named after the file's last path component.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: component_name(&path),
            path,
            sort: false,
            fail_ok: false,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn sorted(mut self) -> Self {
        self.sort = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.fail_ok = true;
        self
    }
}

/// Recursive copy of a directory into `<name>/`, every file suffixed with
/// the phase. Only files whose name matches `file_pattern` are copied.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: PathBuf,
    pub file_pattern: Option<Regex>,
    pub sort: bool,
    pub fail_ok: bool,
}

impl DirectoryEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: component_name(&path),
            path,
            file_pattern: None,
            sort: false,
            fail_ok: false,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn matching(mut self, pattern: Regex) -> Self {
        self.file_pattern = Some(pattern);
        self
    }

    pub fn optional(mut self) -> Self {
        self.fail_ok = true;
        self
    }

    /// True if a file called `file_name` should be copied.
    pub fn wants(&self, file_name: &str) -> bool {
        self.file_pattern
            .as_ref()
            .is_none_or(|pattern| pattern.is_match(file_name))
    }
}

/// External command whose stdout becomes `<name>.<phase>`.
#[derive(Debug, Clone)]
pub struct CommandEntry {
    pub name: String,
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Keep only output lines matching this expression.
    pub line_filter: Option<Regex>,
    pub sort: bool,
    pub fail_ok: bool,
}

impl CommandEntry {
    pub fn new(name: &str, program: impl Into<PathBuf>, args: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            line_filter: None,
            sort: false,
            fail_ok: false,
        }
    }

    /// Command line handed to `/bin/sh -c`.
    pub fn shell(name: &str, command_line: &str) -> Self {
        Self::new(name, SHELL, &["-c", command_line])
    }

    pub fn sorted(mut self) -> Self {
        self.sort = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.fail_ok = true;
        self
    }

    pub fn filtered(mut self, filter: Regex) -> Self {
        self.line_filter = Some(filter);
        self
    }

    /// Human readable command line for messages.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

fn component_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().trim_matches('/').replace('/', "_"))
}
