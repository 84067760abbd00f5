use crate::builtin::Builtins;
use crate::command::{CommandIo, ExitCode};
use crate::completion::CommandCompleter;
use crate::editor::{LineEditor, RawModeGuard};
use crate::env::Environment;
use crate::error::ShellError;
use crate::external::ExternalCommand;
use crate::io_adapters::OutputSink;
use crate::lexer;
use crate::parser::{self, ParsedCommand};
use anyhow::Context;
use std::io::{self, BufRead, Write};

/// Prompt printed before every line.
pub const DEFAULT_PROMPT: &str = "$ ";

/// A minimal shell that executes built-in and external commands.
///
/// The interpreter owns the session [`Environment`] and the table of
/// [`Builtins`]. Every line goes through the lexer, then the redirection
/// parser, and is then dispatched either to a builtin or to a child process.
///
/// Example
/// ```
/// use minish::Interpreter;
/// let mut sh = Interpreter::default();
/// let mut out = Vec::new();
/// let code = sh.run_line("echo hello   'big world'", &mut out, &mut std::io::sink());
/// assert_eq!(code, 0);
/// assert_eq!(out, b"hello big world\n");
/// ```
pub struct Interpreter {
    env: Environment,
    builtins: Builtins,
    prompt: String,
    last_status: ExitCode,
}

impl Interpreter {
    pub fn new(env: Environment) -> Self {
        Self::with_builtins(env, Builtins::default())
    }

    /// Create a new interpreter with a custom set of builtins.
    pub fn with_builtins(env: Environment, builtins: Builtins) -> Self {
        Self {
            env,
            builtins,
            prompt: DEFAULT_PROMPT.to_string(),
            last_status: 0,
        }
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn should_exit(&self) -> bool {
        self.env.should_exit
    }

    /// Status the shell process should exit with: the one given to `exit`, or
    /// the status of the last command.
    pub fn exit_status(&self) -> ExitCode {
        if self.env.should_exit {
            self.env.exit_status
        } else {
            self.last_status
        }
    }

    /// Tokenize, parse and execute one input line.
    pub fn run_line(
        &mut self,
        line: &str,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> ExitCode {
        let tokens = lexer::split_into_tokens(line);
        log::debug!("tokens: {tokens:?}");
        let cmd = parser::parse_command(tokens);
        log::debug!("parsed: {cmd:?}");
        let status = self.execute(&cmd, stdout, stderr);
        self.last_status = status;
        status
    }

    /// Execute a parsed command.
    ///
    /// `stdout`/`stderr` are the shell's own streams. Redirection targets are
    /// opened here and closed when this call returns, whatever the outcome.
    /// Failures are reported on the command's stderr and turned into a status;
    /// they never abort the shell.
    pub fn execute(
        &mut self,
        cmd: &ParsedCommand,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> ExitCode {
        let Some(name) = cmd.name() else {
            return 0;
        };

        let (mut out_sink, mut err_sink) = match self.open_sinks(cmd) {
            Ok(sinks) => sinks,
            Err(e) => return report(&e, stderr),
        };

        if let Some(builtin) = self.builtins.get(name) {
            let mut io = CommandIo::new(out_sink.writer(stdout), err_sink.writer(stderr));
            let result = builtin.execute(cmd.args(), &mut io, &mut self.env, &self.builtins);
            let status = match result {
                Ok(status) => status,
                Err(e) => {
                    if let Err(write_err) = writeln!(io.stderr, "{e}") {
                        log::warn!("failed to report {name} error: {write_err}");
                    }
                    1
                }
            };
            if let Err(e) = io.stdout.flush().and_then(|_| io.stderr.flush()) {
                log::warn!("failed to flush {name} output: {e}");
            }
            return status;
        }

        let external = match ExternalCommand::resolve(&cmd.argv, &self.env) {
            Ok(external) => external,
            Err(e) => return report(&e, err_sink.writer(stderr)),
        };
        // Keep our buffered output ahead of whatever the child prints.
        if let Err(e) = stdout.flush().and_then(|_| stderr.flush()) {
            log::warn!("failed to flush shell output before {name}: {e}");
        }
        match external.execute(out_sink, err_sink, &self.env) {
            Ok(status) => status,
            Err(e) => {
                log::warn!("{e}");
                report(&e, stderr)
            }
        }
    }

    fn open_sinks(&self, cmd: &ParsedCommand) -> Result<(OutputSink, OutputSink), ShellError> {
        let out = OutputSink::open(cmd.stdout.as_ref(), &self.env.current_dir)?;
        let err = OutputSink::open(cmd.stderr.as_ref(), &self.env.current_dir)?;
        Ok((out, err))
    }

    /// Interactive read-eval loop on the controlling terminal.
    ///
    /// Raw mode is held only while a line is being edited, so commands always
    /// run with the terminal in its normal state.
    pub fn repl(&mut self) -> anyhow::Result<ExitCode> {
        let editor = LineEditor::new(
            CommandCompleter::new(self.env.search_path.clone()),
            self.prompt.clone(),
        );
        let stdin = io::stdin();

        while !self.should_exit() {
            let line = {
                let _raw = RawModeGuard::acquire().context("failed to enable raw mode")?;
                editor
                    .read_line(&mut stdin.lock(), &mut io::stdout().lock())
                    .context("failed to read input")?
            };
            let Some(line) = line else {
                break;
            };
            self.run_line(&line, &mut io::stdout().lock(), &mut io::stderr().lock());
        }
        Ok(self.exit_status())
    }

    /// Non-interactive loop: one command per input line until end of input.
    ///
    /// Blank lines are skipped; a prompt is still printed before every read.
    pub fn run_script<R: BufRead>(
        &mut self,
        input: R,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> anyhow::Result<ExitCode> {
        let mut lines = input.lines();
        while !self.should_exit() {
            stdout.write_all(self.prompt.as_bytes())?;
            stdout.flush()?;
            let Some(line) = lines.next() else {
                break;
            };
            let line = line.context("failed to read input")?;
            if line.trim().is_empty() {
                continue;
            }
            self.run_line(&line, stdout, stderr);
        }
        Ok(self.exit_status())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(Environment::new())
    }
}

fn report(err: &ShellError, stderr: &mut dyn Write) -> ExitCode {
    if let Err(e) = writeln!(stderr, "{err}").and_then(|_| stderr.flush()) {
        log::warn!("failed to report error: {e}");
    }
    err.exit_code()
}
