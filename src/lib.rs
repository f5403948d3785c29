//! configsnap - record and compare Linux host configuration
//!
//! configsnap captures the state of a host (storage layout, packages,
//! network configuration, services, plus any files or commands an operator
//! adds) into phase-suffixed files under a per-tag directory, then diffs a
//! later phase against the `pre` phase to surface unexpected changes after
//! maintenance.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (arguments, orchestration, reporting)
//! - `config`: Loading of the operator's extension file
//! - `core`: Collection, comparison and archiving
//! - `parsers`: The INI reader used by `config`
//! - `ui`: Verbosity-aware console output
//! - `utils`: Shared helpers

pub mod cli;
pub mod config;
pub mod core;
pub mod parsers;
pub mod ui;
pub mod utils;
