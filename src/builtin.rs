use crate::command::{BuiltinCommand, CommandIo, ExitCode};
use crate::env::Environment;
use crate::external::find_command_path;
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

/// Names of every command the shell implements itself.
pub const BUILTIN_NAMES: [&str; 5] = ["echo", "exit", "type", "pwd", "cd"];

/// Name-keyed table of builtins.
pub struct Builtins {
    commands: HashMap<&'static str, Box<dyn BuiltinCommand>>,
}

impl Builtins {
    pub fn empty() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Register a command. Replaces any existing command with the same name.
    pub fn register(&mut self, cmd: Box<dyn BuiltinCommand>) {
        self.commands.insert(cmd.name(), cmd);
    }

    pub fn get(&self, name: &str) -> Option<&dyn BuiltinCommand> {
        self.commands.get(name).map(|cmd| &**cmd)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }
}

impl Default for Builtins {
    fn default() -> Self {
        let mut builtins = Self::empty();
        builtins.register(Box::new(Exit));
        builtins.register(Box::new(Echo));
        builtins.register(Box::new(Type));
        builtins.register(Box::new(Pwd));
        builtins.register(Box::new(Cd));
        builtins
    }
}

/// Print the current working directory to standard output.
pub struct Pwd;

impl BuiltinCommand for Pwd {
    fn name(&self) -> &'static str {
        "pwd"
    }

    fn execute(
        &self,
        _args: &[String],
        io: &mut CommandIo<'_>,
        env: &mut Environment,
        _builtins: &Builtins,
    ) -> Result<ExitCode> {
        writeln!(io.stdout, "{}", env.current_dir.display())?;
        Ok(0)
    }
}

/// Change the current working directory.
///
/// Without a target, changes to the home directory. `~` and `~/...` expand to
/// home. The new directory is lexically normalized and must exist.
pub struct Cd;

impl BuiltinCommand for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn execute(
        &self,
        args: &[String],
        _io: &mut CommandIo<'_>,
        env: &mut Environment,
        _builtins: &Builtins,
    ) -> Result<ExitCode> {
        let target = match args {
            [] => None,
            [target] => Some(target.as_str()),
            _ => return Err(anyhow!("cd: too many arguments")),
        };

        let new_dir = match target {
            None | Some("~") => env.home_dir().ok_or_else(|| anyhow!("cd: HOME not set"))?,
            Some(t) if t.starts_with("~/") => env
                .home_dir()
                .ok_or_else(|| anyhow!("cd: HOME not set"))?
                .join(&t[2..]),
            Some(t) => env.current_dir.join(t),
        };
        let new_dir = normalize(&new_dir);

        if !new_dir.is_dir() {
            let shown = target.map_or_else(|| new_dir.display().to_string(), str::to_string);
            return Err(anyhow!("cd: {shown}: No such file or directory"));
        }
        log::debug!("cd {}", new_dir.display());
        env.current_dir = new_dir;
        Ok(0)
    }
}

/// Resolve `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Exit shell process.
///
/// Only records the request in the environment; the read-eval loop stops once
/// the command returns.
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn execute(
        &self,
        args: &[String],
        io: &mut CommandIo<'_>,
        env: &mut Environment,
        _builtins: &Builtins,
    ) -> Result<ExitCode> {
        let status = match args {
            [] => 0,
            [code] => match code.parse::<ExitCode>() {
                Ok(status) => status,
                Err(_) => {
                    writeln!(io.stderr, "exit: {code}: numeric argument required")?;
                    return Ok(2);
                }
            },
            _ => {
                writeln!(io.stderr, "exit: too many arguments")?;
                return Ok(1);
            }
        };
        env.request_exit(status);
        Ok(status)
    }
}

/// Write the arguments to standard output, separated by spaces, with a
/// trailing newline.
pub struct Echo;

impl BuiltinCommand for Echo {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn execute(
        &self,
        args: &[String],
        io: &mut CommandIo<'_>,
        _env: &mut Environment,
        _builtins: &Builtins,
    ) -> Result<ExitCode> {
        writeln!(io.stdout, "{}", args.join(" "))?;
        Ok(0)
    }
}

/// Describe how each name would be interpreted as a command.
pub struct Type;

impl BuiltinCommand for Type {
    fn name(&self) -> &'static str {
        "type"
    }

    fn execute(
        &self,
        args: &[String],
        io: &mut CommandIo<'_>,
        env: &mut Environment,
        builtins: &Builtins,
    ) -> Result<ExitCode> {
        let mut status = 0;
        for name in args {
            if builtins.contains(name) {
                writeln!(io.stdout, "{name} is a shell builtin")?;
            } else if let Some(path) = find_command_path(&env.search_path, &env.current_dir, name)
            {
                writeln!(io.stdout, "{name} is {}", path.display())?;
            } else {
                writeln!(io.stdout, "{name}: not found")?;
                status = 1;
            }
        }
        Ok(status)
    }
}
