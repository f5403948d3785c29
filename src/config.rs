//! Operator extension file.
//!
//! The file adds entries to the built-in catalog:
//!
//! ```ini
//! [bonding]
//! type = command
//! command = cat /proc/net/bonding/bond0
//! failok = yes
//!
//! [chrony]
//! type = file
//! file = /etc/chrony.conf
//!
//! [haproxy]
//! type = directory
//! directory = /etc/haproxy
//! file_pattern = \.cfg$
//! ```
//!
//! Commands run through `/bin/sh -c` and are named after their section;
//! files and directories are named after their last path component.
//! Sections that fail validation are reported and skipped.

use std::{
    collections::HashSet,
    fmt,
    fs,
    os::unix::fs::MetadataExt,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use regex::Regex;

use crate::{
    core::entry::{CommandEntry, DirectoryEntry, Entry, FileEntry},
    parsers::ini::{IniSection, parse_bool, parse_ini_file},
    utils::{effective_uid, invalid_component_reason},
};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/configsnap/additional.conf";

const ENTRY_TYPES: &str = "file, directory, command";

/// A section rejected during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub section: String,
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] (line {}): {}, section skipped",
            self.section, self.line, self.message
        )
    }
}

#[derive(Debug, Default)]
pub struct ExtensionConfig {
    pub path: PathBuf,
    pub entries: Vec<Entry>,
    pub issues: Vec<ConfigIssue>,
}

/// Loads the extension file at `path` after checking it can be trusted.
pub fn load_config(path: &Path) -> Result<ExtensionConfig> {
    check_config_security(path)?;
    let sections = parse_ini_file(path)?;
    let mut config = entries_from_sections(&sections);
    config.path = path.to_path_buf();
    Ok(config)
}

/// Loads the extension file if there is one.
///
/// A missing file is only an error when the path was given explicitly.
pub fn load_optional_config(path: &Path, explicit: bool) -> Result<Option<ExtensionConfig>> {
    if !path.exists() {
        if explicit {
            bail!("Config file not found: {}", path.display());
        }
        return Ok(None);
    }
    load_config(path).map(Some)
}

/// The file must be a regular file owned by root (or by the user running
/// configsnap) and must not be writable by group or others.
pub fn check_config_security(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    if !metadata.is_file() {
        bail!("Config file {} is not a regular file", path.display());
    }
    if let Err(reason) = check_permissions(metadata.uid(), metadata.mode(), effective_uid()) {
        bail!("Refusing to use config file {}: {}", path.display(), reason);
    }
    Ok(())
}

pub fn check_permissions(owner: u32, mode: u32, current_uid: u32) -> Result<(), String> {
    if owner != 0 && owner != current_uid {
        return Err(format!("owned by uid {}, expected root", owner));
    }
    if mode & 0o022 != 0 {
        return Err(format!(
            "mode {:04o} allows group or other write access",
            mode & 0o7777
        ));
    }
    Ok(())
}

/// Turns parsed sections into entries, collecting issues for the invalid
/// ones instead of failing.
pub fn entries_from_sections(sections: &[IniSection]) -> ExtensionConfig {
    let mut config = ExtensionConfig::default();
    let mut seen: HashSet<&str> = HashSet::new();

    for section in sections {
        let issue = |message: String| ConfigIssue {
            section: section.name.clone(),
            line: section.line,
            message,
        };

        if !seen.insert(section.name.as_str()) {
            config
                .issues
                .push(issue("duplicate section name".to_string()));
            continue;
        }

        match section_to_entry(section) {
            Ok(entry) => config.entries.push(entry),
            Err(message) => config.issues.push(issue(message)),
        }
    }

    config
}

fn section_to_entry(section: &IniSection) -> Result<Entry, String> {
    let mut keys: HashSet<&str> = HashSet::new();
    for entry in &section.entries {
        if !keys.insert(entry.key.as_str()) {
            return Err(format!("key '{}' given more than once", entry.key));
        }
    }

    let Some(kind) = section.get("type") else {
        return Err(format!("missing 'type' (one of {})", ENTRY_TYPES));
    };
    let kind = kind.to_ascii_lowercase();

    let allowed: &[&str] = match kind.as_str() {
        "command" => &["type", "command", "failok", "sort"],
        "file" => &["type", "file", "failok", "sort"],
        "directory" => &["type", "directory", "file_pattern", "failok", "sort"],
        other => {
            return Err(format!(
                "unknown type '{}' (expected one of {})",
                other, ENTRY_TYPES
            ));
        }
    };
    if let Some(unknown) = section
        .entries
        .iter()
        .find(|e| !allowed.contains(&e.key.as_str()))
    {
        return Err(format!(
            "key '{}' is not valid for type '{}'",
            unknown.key, kind
        ));
    }

    let fail_ok = flag(section, "failok")?;
    let sort = flag(section, "sort")?;

    let entry = match kind.as_str() {
        "command" => {
            if let Some(reason) = invalid_component_reason(&section.name) {
                return Err(format!("section name {} for a command artifact", reason));
            }
            let command = required(section, "command")?;
            let mut entry = CommandEntry::shell(&section.name, command);
            entry.sort = sort;
            entry.fail_ok = fail_ok;
            Entry::Command(entry)
        }
        "file" => {
            let path = absolute_path(section, "file")?;
            let mut entry = FileEntry::new(path);
            entry.sort = sort;
            entry.fail_ok = fail_ok;
            Entry::File(entry)
        }
        _ => {
            let path = absolute_path(section, "directory")?;
            let mut entry = DirectoryEntry::new(path);
            if let Some(pattern) = section.get("file_pattern") {
                let regex = Regex::new(pattern)
                    .map_err(|e| format!("invalid file_pattern \"{}\": {}", pattern, e))?;
                entry = entry.matching(regex);
            }
            entry.sort = sort;
            entry.fail_ok = fail_ok;
            Entry::Directory(entry)
        }
    };

    if let Some(reason) = invalid_component_reason(entry.name()) {
        return Err(format!("artifact name \"{}\" {}", entry.name(), reason));
    }
    Ok(entry)
}

fn required<'s>(section: &'s IniSection, key: &str) -> Result<&'s str, String> {
    match section.get(key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(format!("missing '{}'", key)),
    }
}

fn absolute_path(section: &IniSection, key: &str) -> Result<PathBuf, String> {
    let value = required(section, key)?;
    let path = PathBuf::from(value);
    if !path.is_absolute() {
        return Err(format!("'{}' must be an absolute path, got \"{}\"", key, value));
    }
    Ok(path)
}

fn flag(section: &IniSection, key: &str) -> Result<bool, String> {
    match section.get(key) {
        None => Ok(false),
        Some(value) => parse_bool(value)
            .ok_or_else(|| format!("'{}' must be a boolean, got \"{}\"", key, value)),
    }
}
