//! Sequencing of one configsnap run: collect, compare, archive.

use std::path::PathBuf;

use anyhow::{Result, bail};
use chrono::Local;

use super::args::Arguments;
use crate::{
    config::{ConfigIssue, load_optional_config},
    core::{
        CollectSummary, Collector, Comparator, CompareReport, Probe, WorkDir,
        archive::create_archive, builtin_catalog, compare::should_compare, custom_probes,
        workdir::{validate_label, validate_suffix},
    },
    ui::Console,
    utils::is_root,
};

/// Format of the default phase label.
pub const PHASE_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub tag: String,
    pub phase: String,
    pub basedir: PathBuf,
    pub pre_suffix: String,
    pub overwrite: bool,
    pub archive: bool,
    pub compare_only: bool,
    pub force_compare: bool,
    pub config_path: PathBuf,
    /// The config path came from `--config` rather than the default.
    pub config_explicit: bool,
    pub only_custom: bool,
}

impl RunOptions {
    pub fn from_args(args: Arguments) -> Result<Self> {
        let Some(tag) = args.tag.clone() else {
            bail!("No tag specified, use -t/--tag to name this maintenance");
        };
        let phase = args
            .phase
            .clone()
            .unwrap_or_else(|| Local::now().format(PHASE_TIMESTAMP_FORMAT).to_string());

        validate_label("tag", &tag)?;
        validate_suffix("phase", &phase)?;
        validate_suffix("pre suffix", &args.pre_suffix)?;

        let (config_path, config_explicit) = args.config_path();
        Ok(Self {
            tag,
            phase,
            basedir: args.basedir,
            pre_suffix: args.pre_suffix,
            overwrite: args.overwrite,
            archive: args.archive,
            compare_only: args.compare_only,
            force_compare: args.force_compare,
            config_path,
            config_explicit,
            only_custom: args.only_custom,
        })
    }
}

/// Everything a run produced, for reporting.
#[derive(Debug)]
pub struct RunResult {
    pub workdir: WorkDir,
    pub phase: String,
    pub collect: Option<CollectSummary>,
    pub config_issues: Vec<ConfigIssue>,
    pub comparison: Option<CompareReport>,
    pub archive: Option<PathBuf>,
}

impl RunResult {
    pub fn has_differences(&self) -> bool {
        self.comparison
            .as_ref()
            .is_some_and(CompareReport::has_differences)
    }

    /// False when a comparison ran but some pairs could not be diffed.
    pub fn is_complete(&self) -> bool {
        self.comparison
            .as_ref()
            .is_none_or(CompareReport::is_complete)
    }
}

pub fn run(options: &RunOptions, console: &Console) -> Result<RunResult> {
    let workdir = WorkDir::new(&options.basedir, &options.tag)?;
    let mut result = RunResult {
        workdir: workdir.clone(),
        phase: options.phase.clone(),
        collect: None,
        config_issues: Vec::new(),
        comparison: None,
        archive: None,
    };

    if options.compare_only {
        if !workdir.exists() {
            bail!(
                "No artifacts for tag '{}' in {}",
                options.tag,
                workdir.root().display()
            );
        }
        if options.phase == options.pre_suffix {
            bail!(
                "Cannot compare phase '{}' against itself, pick another --phase or --pre",
                options.phase
            );
        }
        result.comparison = Some(compare(&workdir, options, console)?);
    } else {
        collect(&workdir, options, console, &mut result)?;
        if should_compare(&options.phase, &options.pre_suffix, options.force_compare) {
            if workdir.existing_artifacts(&options.pre_suffix).is_empty() {
                console.warn(format!(
                    "No '{}' artifacts in {}, skipping comparison",
                    options.pre_suffix,
                    workdir.root().display()
                ));
            } else {
                result.comparison = Some(compare(&workdir, options, console)?);
            }
        }
    }

    if options.archive {
        result.archive = Some(create_archive(
            &workdir,
            &options.phase,
            options.overwrite,
        )?);
    }

    Ok(result)
}

fn collect(
    workdir: &WorkDir,
    options: &RunOptions,
    console: &Console,
    result: &mut RunResult,
) -> Result<()> {
    workdir.ensure_phase_free(&options.phase, options.overwrite)?;

    if !is_root() {
        console.warn("not running as root, some information may be missing");
    }

    let mut probes: Vec<Probe> = if options.only_custom {
        Vec::new()
    } else {
        builtin_catalog()?
    };

    if let Some(config) = load_optional_config(&options.config_path, options.config_explicit)? {
        console.note(format!(
            "loaded {} entries from {}",
            config.entries.len(),
            config.path.display()
        ));
        for issue in &config.issues {
            console.warn(issue);
        }
        result.config_issues = config.issues;
        probes.extend(custom_probes(config.entries));
    }

    if probes.is_empty() {
        bail!(
            "Nothing to collect, --only-custom needs entries in {}",
            options.config_path.display()
        );
    }

    if options.overwrite {
        let removed = workdir.clear_phase(&options.phase)?;
        if removed > 0 {
            console.note(format!(
                "removed {} existing '{}' artifacts",
                removed, options.phase
            ));
        }
    }

    result.collect = Some(Collector::new(workdir, &options.phase, console).run(&probes)?);
    Ok(())
}

fn compare(workdir: &WorkDir, options: &RunOptions, console: &Console) -> Result<CompareReport> {
    console.info(format!(
        "Comparing '{}' against '{}'...",
        options.phase, options.pre_suffix
    ));
    Comparator::new(workdir.root(), &options.pre_suffix, &options.phase).compare()
}
