use anyhow::Result;

mod args;
mod exit_status;
mod report;
mod run;

pub use args::Arguments;
pub use exit_status::ExitStatus;
pub use run::{RunOptions, RunResult, run};

use crate::ui::Console;

pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    let console = Console::new(args.verbosity());
    let options = RunOptions::from_args(args)?;

    let result = run(&options, &console)?;
    report::print(&result, &console);

    if !result.is_complete() {
        return Ok(ExitStatus::Failure);
    }
    Ok(ExitStatus::Success)
}
