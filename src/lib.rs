//! A small interactive shell.
//!
//! Each input line is split into words by the [`lexer`], stripped of its
//! redirections by the [`parser`], and dispatched by the [`Interpreter`] to a
//! builtin (`echo`, `exit`, `type`, `pwd`, `cd`) or to an executable found on
//! the search path. When attached to a terminal, lines are read by the
//! [`editor`], which completes command names on tab.
//!
//! The public modules [`command`] and [`env`] expose the traits and types needed
//! to implement additional builtins.

mod builtin;
pub mod command;
pub mod completion;
pub mod editor;
pub mod env;
pub mod error;
mod external;
mod interpreter;
mod io_adapters;
pub mod lexer;
pub mod parser;

pub use builtin::{BUILTIN_NAMES, Builtins};
pub use external::find_command_path;
/// Just a convenient re-export of the command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::{DEFAULT_PROMPT, Interpreter};
