use crate::builtin::Builtins;
use crate::env::Environment;
use anyhow::Result;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Output streams handed to a builtin for the duration of one call.
///
/// When the command line redirects a stream, the matching field points at the
/// opened file; otherwise it is the shell's own stream.
pub struct CommandIo<'a> {
    pub stdout: &'a mut dyn Write,
    pub stderr: &'a mut dyn Write,
}

impl<'a> CommandIo<'a> {
    pub fn new(stdout: &'a mut dyn Write, stderr: &'a mut dyn Write) -> Self {
        Self { stdout, stderr }
    }
}

/// A command implemented inside the shell process.
///
/// Builtins are registered by [`name`](BuiltinCommand::name) and receive the
/// arguments after the command name, already unquoted.
pub trait BuiltinCommand {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name(&self) -> &'static str;

    /// Executes the command.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for
    /// error. An `Err` is printed to the command's stderr and mapped to status 1.
    /// `builtins` is the registry the command was dispatched from.
    fn execute(
        &self,
        args: &[String],
        io: &mut CommandIo<'_>,
        env: &mut Environment,
        builtins: &Builtins,
    ) -> Result<ExitCode>;
}
