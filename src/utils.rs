//! Common utility functions shared across the codebase.

use regex::Regex;

/// Sorts the lines of `text`, keeping a trailing newline if there was one.
///
/// # Examples
///
/// ```
/// use configsnap::utils::sort_lines;
///
/// assert_eq!(sort_lines("b\na\nc\n"), "a\nb\nc\n");
/// assert_eq!(sort_lines("b\na"), "a\nb");
/// assert_eq!(sort_lines(""), "");
/// ```
pub fn sort_lines(text: &str) -> String {
    let mut lines = split_lines(text);
    lines.sort_unstable();
    join_lines(&lines, text.ends_with('\n'))
}

/// Keeps only the lines of `text` matching `filter`.
pub fn filter_lines(text: &str, filter: &Regex) -> String {
    let lines: Vec<&str> = split_lines(text)
        .into_iter()
        .filter(|line| filter.is_match(line))
        .collect();
    join_lines(&lines, text.ends_with('\n'))
}

/// Splits on `\n` only, so `\r` stays part of the line.
fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    text.strip_suffix('\n').unwrap_or(text).split('\n').collect()
}

fn join_lines(lines: &[&str], trailing_newline: bool) -> String {
    let mut out = lines.join("\n");
    if trailing_newline && !lines.is_empty() {
        out.push('\n');
    }
    out
}

/// True when the process runs with an effective uid of 0.
pub fn is_root() -> bool {
    nix::unistd::Uid::effective().is_root()
}

/// Effective uid of the running process.
pub fn effective_uid() -> u32 {
    nix::unistd::Uid::effective().as_raw()
}

/// Checks a name used as a single path component (tags, phases, suffixes).
///
/// Returns a description of the problem, or `None` if the name is usable.
pub fn invalid_component_reason(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        Some("must not be empty")
    } else if name == "." || name == ".." {
        Some("must not be '.' or '..'")
    } else if name.contains('/') {
        Some("must not contain '/'")
    } else if name.contains('\0') {
        Some("must not contain NUL bytes")
    } else {
        None
    }
}
