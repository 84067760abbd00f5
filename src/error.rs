use crate::command::ExitCode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures the dispatcher reports to the user instead of running a command.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{0}: command not found")]
    CommandNotFound(String),

    /// A redirection target could not be opened.
    #[error("minish: {}: {source}", path.display())]
    Redirect { path: PathBuf, source: io::Error },

    /// The executable was found but could not be started or waited for.
    #[error("{name}: {source}")]
    Spawn { name: String, source: io::Error },
}

impl ShellError {
    /// Status the failed command reports, following POSIX shell conventions.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ShellError::CommandNotFound(_) => 127,
            ShellError::Redirect { .. } => 1,
            ShellError::Spawn { .. } => 126,
        }
    }
}
