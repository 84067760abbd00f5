use crate::command::ExitCode;
use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// Mutable state of one shell session.
///
/// The environment contains:
/// - `vars`: a snapshot of the process environment, handed to child processes.
/// - `current_dir`: the working directory for command execution. The process
///   working directory itself is never changed.
/// - `search_path`: directories from `PATH`, parsed once at startup.
/// - `platform_home`: home directory reported by the OS, used when `HOME` is
///   unset or empty.
/// - `should_exit` / `exit_status`: set by the `exit` builtin.
#[derive(Debug, Clone)]
pub struct Environment {
    pub vars: HashMap<String, String>,
    pub current_dir: PathBuf,
    pub search_path: Vec<PathBuf>,
    pub platform_home: Option<PathBuf>,
    pub should_exit: bool,
    pub exit_status: ExitCode,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            platform_home: dirs::home_dir(),
            ..Self::from_vars(stdenv::vars().collect(), current_dir)
        }
    }

    /// Build an environment from explicit variables, deriving the search path
    /// from their `PATH` entry. No platform home directory is recorded.
    pub fn from_vars(vars: HashMap<String, String>, current_dir: PathBuf) -> Self {
        let search_path = vars
            .get("PATH")
            .map(|paths| parse_search_path(paths))
            .unwrap_or_default();
        Self {
            vars,
            current_dir,
            search_path,
            platform_home: None,
            should_exit: false,
            exit_status: 0,
        }
    }

    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Home directory: `HOME` first, then whatever the platform reports.
    pub fn home_dir(&self) -> Option<PathBuf> {
        match self.get_var("HOME") {
            Some(home) if !home.is_empty() => Some(PathBuf::from(home)),
            _ => self.platform_home.clone(),
        }
    }

    /// Ask the read-eval loop to stop once the current command returns.
    pub fn request_exit(&mut self, status: ExitCode) {
        self.should_exit = true;
        self.exit_status = status;
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits a colon-delimited `PATH` value, dropping empty entries.
pub fn parse_search_path(paths: &str) -> Vec<PathBuf> {
    stdenv::split_paths(paths)
        .filter(|dir| !dir.as_os_str().is_empty())
        .collect()
}
