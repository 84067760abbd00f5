use crate::command::ExitCode;
use crate::env::Environment;
use crate::error::ShellError;
use crate::io_adapters::OutputSink;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Command that is not a builtin, already resolved to an executable.
pub struct ExternalCommand {
    /// Name as typed; becomes `argv[0]` of the child.
    name: String,
    path: PathBuf,
    args: Vec<String>,
}

impl ExternalCommand {
    pub fn new(name: impl Into<String>, path: PathBuf, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            path,
            args,
        }
    }

    /// Resolves `argv[0]` against the environment's search path.
    pub fn resolve(argv: &[String], env: &Environment) -> Result<Self, ShellError> {
        let (name, args) = argv
            .split_first()
            .ok_or_else(|| ShellError::CommandNotFound(String::new()))?;
        let path = find_command_path(&env.search_path, &env.current_dir, name)
            .ok_or_else(|| ShellError::CommandNotFound(name.clone()))?;
        log::debug!("resolved {name} to {}", path.display());
        Ok(Self::new(name.clone(), path, args.to_vec()))
    }

    /// Spawns the child in the shell's working directory and waits for it.
    pub fn execute(
        self,
        stdout: OutputSink,
        stderr: OutputSink,
        env: &Environment,
    ) -> Result<ExitCode, ShellError> {
        let mut cmd = std::process::Command::new(&self.path);
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.arg0(&self.name);
        }
        let spawned = cmd
            .args(&self.args)
            .stdout(stdout.stdio())
            .stderr(stderr.stdio())
            .env_clear()
            .envs(env.vars.iter())
            .current_dir(&env.current_dir)
            .spawn();
        let spawn_error = |source| ShellError::Spawn {
            name: self.name.clone(),
            source,
        };
        let mut child = spawned.map_err(spawn_error)?;
        let exit_status = child.wait().map_err(spawn_error)?;
        match exit_status.code() {
            Some(x) => Ok(x),
            None => Ok(terminated_by_signal(exit_status)),
        }
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    match ExitStatusExt::signal(&exit_status) {
        Some(signal) => 128 + signal,
        None => -1,
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Empty command: `None`.
/// - Absolute path, or any path containing a separator (e.g. `bin/sh`, `./foo`):
///   returned only if it is a regular executable file; relative ones are taken
///   relative to `current_dir`. Nothing else is searched.
/// - Single component: the first directory in `search_path` holding a regular
///   file with that name wins. Executability is not checked there.
/// - Last resort: `current_dir/<command>` if it is a regular executable file.
pub fn find_command_path(
    search_path: &[PathBuf],
    current_dir: &Path,
    command: &str,
) -> Option<PathBuf> {
    if command.is_empty() {
        return None;
    }

    let path = Path::new(command);
    if path.is_absolute() || command.contains('/') {
        let candidate = current_dir.join(path);
        return is_executable_file(&candidate).then_some(candidate);
    }

    if let Some(found) = find_in_path(search_path, command) {
        return Some(found);
    }

    let local = current_dir.join(command);
    is_executable_file(&local).then_some(local)
}

fn find_in_path(search_path: &[PathBuf], cmd: &str) -> Option<PathBuf> {
    search_path
        .iter()
        .map(|dir| dir.join(cmd))
        .find(|path| path.is_file())
}

/// Regular file with at least one execute bit set.
pub fn is_executable_file(path: &Path) -> bool {
    path.is_file() && is_executable(path)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|meta| meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    fs::metadata(path).is_ok()
}
