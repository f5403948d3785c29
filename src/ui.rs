//! Console output gated by verbosity.
//!
//! Progress and warnings go to stderr, reports go to stdout. Colors are
//! handled by `colored`, which honors `NO_COLOR`.

use std::fmt::Display;

use colored::Colorize;

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent,
    Normal,
    Verbose,
}

#[derive(Debug, Clone, Copy)]
pub struct Console {
    verbosity: Verbosity,
}

impl Console {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    pub fn is_silent(&self) -> bool {
        self.verbosity == Verbosity::Silent
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    /// Progress line, hidden in silent mode.
    pub fn info(&self, message: impl Display) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{}", message);
        }
    }

    /// Detail line, shown only with `--verbose`.
    pub fn note(&self, message: impl Display) {
        if self.is_verbose() {
            eprintln!("{} {}", "note:".bold().cyan(), message);
        }
    }

    /// Warnings are shown unless silent.
    pub fn warn(&self, message: impl Display) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{} {}", "warning:".bold().yellow(), message);
        }
    }

    /// Errors are always shown.
    pub fn error(&self, message: impl Display) {
        eprintln!("{} {}", "error:".bold().red(), message);
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new(Verbosity::Normal)
    }
}
