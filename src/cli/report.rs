//! Report formatting and printing utilities.
//!
//! Kept apart from the run logic so configsnap can be used as a library
//! without printing side effects.

use std::io::{self, Write};

use colored::Colorize;

use super::run::RunResult;
use crate::{
    core::{CollectSummary, CompareReport, FileDiff},
    ui::{Console, FAILURE_MARK, SUCCESS_MARK},
};

pub fn print(result: &RunResult, console: &Console) {
    if let Some(report) = &result.comparison {
        for error in &report.errors {
            console.error(format!("could not compare {}", error));
        }
    }
    if console.is_silent() {
        return;
    }
    // A closed stdout is not worth failing the run over.
    let _ = print_to(result, console, &mut io::stdout().lock());
}

pub fn print_to<W: Write>(result: &RunResult, console: &Console, writer: &mut W) -> io::Result<()> {
    if let Some(summary) = &result.collect {
        print_collect_summary(summary, result, console, writer)?;
    }
    if let Some(report) = &result.comparison {
        print_comparison(report, console, writer)?;
    }
    if let Some(archive) = &result.archive {
        writeln!(
            writer,
            "{} Archive created: {}",
            SUCCESS_MARK.green(),
            archive.display()
        )?;
    }
    Ok(())
}

fn print_collect_summary<W: Write>(
    summary: &CollectSummary,
    result: &RunResult,
    console: &Console,
    writer: &mut W,
) -> io::Result<()> {
    writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Collected {} {} for phase '{}' in {}",
            summary.written,
            if summary.written == 1 { "artifact" } else { "artifacts" },
            result.phase,
            result.workdir.root().display()
        )
        .green()
    )?;

    let problems = summary.warnings.len() + result.config_issues.len();
    if problems > 0 {
        writeln!(
            writer,
            "  {} {} {} reported above",
            problems,
            if problems == 1 { "warning" } else { "warnings" },
            "(see stderr)".dimmed()
        )?;
    }
    if console.is_verbose() && !summary.not_installed.is_empty() {
        writeln!(
            writer,
            "  {} {}",
            "not installed:".dimmed(),
            summary.not_installed.join(", ")
        )?;
    }
    Ok(())
}

pub fn print_comparison<W: Write>(
    report: &CompareReport,
    console: &Console,
    writer: &mut W,
) -> io::Result<()> {
    for diff in &report.diffs {
        print_diff(diff, writer)?;
    }
    for name in &report.added {
        writeln!(
            writer,
            "{} {} (present in '{}' only)",
            "added:".bold().green(),
            name,
            report.phase
        )?;
    }
    for name in &report.removed {
        writeln!(
            writer,
            "{} {} (present in '{}' only)",
            "removed:".bold().red(),
            name,
            report.pre_suffix
        )?;
    }
    if console.is_verbose() && !report.skipped.is_empty() {
        writeln!(
            writer,
            "{} {}",
            "not compared (volatile):".dimmed(),
            report.skipped.join(", ")
        )?;
    }

    let failed = if report.is_complete() {
        String::new()
    } else {
        format!(", {} could not be compared", report.errors.len())
    };
    if report.has_differences() {
        writeln!(
            writer,
            "\n{} Differences found against '{}': {} changed, {} added, {} removed{}",
            FAILURE_MARK.red(),
            report.pre_suffix,
            report.diffs.len(),
            report.added.len(),
            report.removed.len(),
            failed
        )?;
    } else if !report.is_complete() {
        writeln!(
            writer,
            "\n{} Comparison against '{}' incomplete: {} compared{}",
            FAILURE_MARK.red(),
            report.pre_suffix,
            report.compared(),
            failed
        )?;
    } else {
        writeln!(
            writer,
            "{} No differences against '{}' ({} {} compared)",
            SUCCESS_MARK.green(),
            report.pre_suffix,
            report.compared(),
            if report.compared() == 1 { "file" } else { "files" }
        )?;
    }
    Ok(())
}

fn print_diff<W: Write>(diff: &FileDiff, writer: &mut W) -> io::Result<()> {
    writeln!(
        writer,
        "{} {}",
        "Differences found in".bold().yellow(),
        diff.name.bold()
    )?;
    for line in diff.diff.lines() {
        let styled = if line.starts_with("+++") || line.starts_with("---") {
            line.bold()
        } else if line.starts_with('+') {
            line.green()
        } else if line.starts_with('-') {
            line.red()
        } else if line.starts_with("@@") {
            line.cyan()
        } else {
            line.normal()
        };
        writeln!(writer, "{}", styled)?;
    }
    writeln!(writer)
}
