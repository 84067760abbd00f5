use anyhow::Result;
use argh::FromArgs;
use minish::env::Environment;
use minish::{DEFAULT_PROMPT, Interpreter};
use std::io::{self, IsTerminal};

#[derive(FromArgs)]
/// A small interactive shell with tab completion and output redirection.
struct Cli {
    #[argh(option, short = 'c')]
    /// run a single command line and exit with its status.
    command: Option<String>,

    #[argh(switch)]
    /// read plain lines from standard input even when it is a terminal.
    no_editor: bool,

    #[argh(option, default = "DEFAULT_PROMPT.to_string()")]
    /// prompt printed before each line.
    prompt: String,

    #[argh(switch, short = 'v')]
    /// log debug information to standard error.
    verbose: bool,
}

fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut shell = Interpreter::new(Environment::new());
    shell.set_prompt(cli.prompt);

    let status = if let Some(line) = cli.command {
        shell.run_line(&line, &mut io::stdout().lock(), &mut io::stderr().lock())
    } else if io::stdin().is_terminal() && !cli.no_editor {
        log::info!("starting interactive session");
        shell.repl()?
    } else {
        log::info!("reading commands from standard input");
        shell.run_script(io::stdin().lock(), &mut io::stdout().lock(), &mut io::stderr().lock())?
    };

    log::debug!("exiting with status {status}");
    std::process::exit(status)
}
