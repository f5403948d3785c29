use std::process::ExitCode;

/// Exit status of a configsnap run.
///
/// - `Success` (0): Collection and comparison finished. Differences found by
///   the comparison are reported but do not change the status.
/// - `Failure` (1): A fatal precondition failed (missing tag, insecure
///   config file, artifacts already present, archive error, ...), or some
///   artifact pairs could not be compared.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    /// Run completed.
    Success,
    /// Run aborted.
    Failure,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
        }
    }
}
