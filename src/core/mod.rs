//! Collection, comparison and archiving.
//!
//! - `entry`: what to collect (file, directory, command)
//! - `catalog`: the built-in probes
//! - `collector`: runs probes and writes `<name>.<phase>` artifacts
//! - `compare`: diffs two phases of a working directory
//! - `archive`: tar.gz of the working directory
//! - `workdir`: `<basedir>/<tag>/configsnap/` layout

pub mod archive;
pub mod catalog;
pub mod collector;
pub mod compare;
pub mod copy;
pub mod entry;
pub mod exec;
pub mod workdir;

pub use catalog::{Group, Probe, builtin_catalog, custom_probes};
pub use collector::{CollectSummary, Collector};
pub use compare::{Comparator, CompareReport, FileDiff};
pub use entry::{CommandEntry, DirectoryEntry, Entry, FileEntry};
pub use workdir::WorkDir;
