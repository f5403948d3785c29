//! Minimal INI reader.
//!
//! Supported syntax:
//! - `[section]` headers
//! - `key = value` or `key: value`, keys case-insensitive
//! - indented lines continue the previous value (joined with `\n`)
//! - full-line comments starting with `#` or `;`
//!
//! Semantic checks (known keys, duplicates) are left to the caller.

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniEntry {
    /// Lowercased key.
    pub key: String,
    pub value: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniSection {
    pub name: String,
    /// Line of the section header (1-based).
    pub line: usize,
    pub entries: Vec<IniEntry>,
}

impl IniSection {
    /// First value for `key` (case-insensitive).
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }
}

pub fn parse_ini_file(path: &Path) -> Result<Vec<IniSection>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_ini(&content).with_context(|| format!("Failed to parse config file: {}", path.display()))
}

pub fn parse_ini(content: &str) -> Result<Vec<IniSection>> {
    let mut sections: Vec<IniSection> = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = raw.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        // Continuation of the previous value.
        if raw.starts_with([' ', '\t']) {
            if let Some(last) = sections.last_mut().and_then(|s| s.entries.last_mut()) {
                if !last.value.is_empty() {
                    last.value.push('\n');
                }
                last.value.push_str(trimmed);
                continue;
            }
        }

        if let Some(rest) = trimmed.strip_prefix('[') {
            let Some(name) = rest.strip_suffix(']') else {
                bail!("line {}: unterminated section header", line_no);
            };
            let name = name.trim();
            if name.is_empty() {
                bail!("line {}: empty section name", line_no);
            }
            sections.push(IniSection {
                name: name.to_string(),
                line: line_no,
                entries: Vec::new(),
            });
            continue;
        }

        let Some(split) = trimmed.find(['=', ':']) else {
            bail!("line {}: expected 'key = value', found \"{}\"", line_no, trimmed);
        };
        let key = trimmed[..split].trim();
        let value = trimmed[split + 1..].trim();
        if key.is_empty() {
            bail!("line {}: missing key before '{}'", line_no, &trimmed[split..=split]);
        }

        let Some(section) = sections.last_mut() else {
            bail!("line {}: \"{}\" appears before any [section]", line_no, key);
        };
        section.entries.push(IniEntry {
            key: key.to_ascii_lowercase(),
            value: value.to_string(),
            line: line_no,
        });
    }

    Ok(sections)
}

/// Parses an INI boolean the way Python's configparser does.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}
