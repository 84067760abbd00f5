use crate::error::ShellError;
use crate::parser::{RedirectMode, RedirectTarget};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::process::Stdio;

/// Destination of one standard stream for a single command.
///
/// Either the shell's own stream or a file opened for a redirection. The file
/// is closed when the sink is dropped, which happens right after the command
/// returns.
#[derive(Debug)]
pub enum OutputSink {
    Inherit,
    File(File),
}

impl OutputSink {
    /// Opens the redirection target, if any.
    ///
    /// Relative paths are taken relative to `current_dir`. Missing files are
    /// created; existing ones are truncated or appended to per `target.mode`.
    pub fn open(target: Option<&RedirectTarget>, current_dir: &Path) -> Result<Self, ShellError> {
        let Some(target) = target else {
            return Ok(OutputSink::Inherit);
        };
        let path = current_dir.join(&target.path);
        let mut options = OpenOptions::new();
        match target.mode {
            RedirectMode::Truncate => options.write(true).create(true).truncate(true),
            RedirectMode::Append => options.append(true).create(true),
        };
        let file = options
            .open(&path)
            .map_err(|source| ShellError::Redirect { path, source })?;
        Ok(OutputSink::File(file))
    }

    /// Writer for an in-process builtin, falling back to the shell's stream.
    pub fn writer<'a>(&'a mut self, inherited: &'a mut dyn Write) -> &'a mut dyn Write {
        match self {
            OutputSink::Inherit => inherited,
            OutputSink::File(file) => file,
        }
    }

    /// Converts this sink into a [`Stdio`] handle for a child process.
    pub fn stdio(self) -> Stdio {
        match self {
            OutputSink::Inherit => Stdio::inherit(),
            OutputSink::File(file) => Stdio::from(file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_no_target_inherits() {
        let sink = OutputSink::open(None, Path::new("/")).unwrap();
        assert!(matches!(sink, OutputSink::Inherit));

        let mut sink = sink;
        let mut shell_out = Vec::new();
        write!(sink.writer(&mut shell_out), "hello").unwrap();
        assert_eq!(shell_out, b"hello");
    }

    #[test]
    fn test_truncate_and_append() {
        let dir = tempfile::tempdir().unwrap();
        let target = RedirectTarget::new("out.txt", RedirectMode::Truncate);
        let append = RedirectTarget::new("out.txt", RedirectMode::Append);
        let mut unused = Vec::new();

        for text in ["first\n", "second\n"] {
            let mut sink = OutputSink::open(Some(&target), dir.path()).unwrap();
            sink.writer(&mut unused).write_all(text.as_bytes()).unwrap();
        }
        let mut sink = OutputSink::open(Some(&append), dir.path()).unwrap();
        sink.writer(&mut unused).write_all(b"third\n").unwrap();
        drop(sink);

        let content = fs::read_to_string(dir.path().join("out.txt")).unwrap();
        assert_eq!(content, "second\nthird\n");
        assert!(unused.is_empty());
    }

    #[test]
    fn test_open_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let target = RedirectTarget::new("missing/dir/out.txt", RedirectMode::Truncate);
        let err = OutputSink::open(Some(&target), dir.path()).unwrap_err();
        assert!(matches!(err, ShellError::Redirect { .. }));
        assert_eq!(err.exit_code(), 1);
    }
}
