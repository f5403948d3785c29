//! CLI argument definitions using clap.
//!
//! configsnap is a single command driven by flags:
//!
//! - `-t TAG -p pre` records the state before maintenance
//! - `-t TAG -p post` records it again and diffs against `pre`
//! - `-C` compares already recorded phases without collecting

use std::path::PathBuf;

use clap::Parser;

use crate::{config::DEFAULT_CONFIG_PATH, ui::Verbosity};

pub const DEFAULT_BASEDIR: &str = "/root";
pub const DEFAULT_PRE_SUFFIX: &str = "pre";

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    /// Tag identifying this maintenance; artifacts go to <basedir>/<tag>/configsnap/
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Phase suffix for this run, e.g. pre, post or rollback (default: current time)
    #[arg(short, long)]
    pub phase: Option<String>,

    /// Base directory for tag directories
    #[arg(short = 'd', long, env = "CONFIGSNAP_BASEDIR", default_value = DEFAULT_BASEDIR)]
    pub basedir: PathBuf,

    /// Phase that post and rollback runs are compared against
    #[arg(long = "pre", value_name = "SUFFIX", default_value = DEFAULT_PRE_SUFFIX)]
    pub pre_suffix: String,

    /// Replace existing artifacts and archives for this phase
    #[arg(short = 'w', long)]
    pub overwrite: bool,

    /// Pack the tag's configsnap directory into a .tar.gz
    #[arg(short, long)]
    pub archive: bool,

    /// Show every probe as it runs
    #[arg(short, long, conflicts_with = "silent")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long)]
    pub silent: bool,

    /// Compare existing artifacts without collecting
    #[arg(short = 'C', long, requires = "phase")]
    pub compare_only: bool,

    /// Compare against the pre phase whatever the phase name
    #[arg(long)]
    pub force_compare: bool,

    /// Extension file with additional files, directories and commands
    #[arg(short, long, env = "CONFIGSNAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip the built-in probes and collect only the extension file entries
    #[arg(long)]
    pub only_custom: bool,
}

impl Arguments {
    pub fn verbosity(&self) -> Verbosity {
        if self.silent {
            Verbosity::Silent
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    /// Config path to use and whether it was requested explicitly.
    pub fn config_path(&self) -> (PathBuf, bool) {
        match &self.config {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        }
    }
}
