use std::fmt;
use std::io;

/// Errors raised while driving installer child processes.
///
/// Only `UserAbort` ever escapes a batch; the rest are turned into a log
/// entry and a failed [`InstallResult`](super::InstallResult) at the
/// orchestration boundary.
#[derive(Debug)]
pub enum InstallError {
    /// Reading the child's output failed. The streamer stops; the package
    /// still runs to completion.
    StreamRead(io::Error),
    /// The child could not be started (missing binary, permissions).
    ProcessLaunch { program: String, source: io::Error },
    /// The child exited with a nonzero code.
    InstallFailure { package: String, exit_code: i32 },
    /// The user interrupted the run.
    UserAbort,
    /// Any other I/O failure talking to the child.
    Io(io::Error),
}

impl fmt::Display for InstallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallError::StreamRead(e) => write!(f, "error reading output: {e}"),
            InstallError::ProcessLaunch { program, source } => {
                write!(f, "failed to launch {program}: {source}")
            }
            InstallError::InstallFailure { package, exit_code } => {
                write!(f, "{package} failed with exit code {exit_code}")
            }
            InstallError::UserAbort => write!(f, "interrupted by user"),
            InstallError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for InstallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InstallError::StreamRead(e) | InstallError::Io(e) => Some(e),
            InstallError::ProcessLaunch { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for InstallError {
    fn from(e: io::Error) -> Self {
        InstallError::Io(e)
    }
}
