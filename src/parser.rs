use crate::lexer::Token;

/// How a redirected file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    /// `>`: the file is truncated first.
    Truncate,
    /// `>>`: output is appended.
    Append,
}

/// A file a standard stream is diverted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    pub path: String,
    pub mode: RedirectMode,
}

impl RedirectTarget {
    pub fn new(path: impl Into<String>, mode: RedirectMode) -> Self {
        Self {
            path: path.into(),
            mode,
        }
    }
}

/// A command line with its redirections pulled out.
///
/// `argv` never contains a redirection operator or the filename following it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCommand {
    pub argv: Vec<String>,
    pub stdout: Option<RedirectTarget>,
    pub stderr: Option<RedirectTarget>,
}

impl ParsedCommand {
    /// Command name, if the line had any words at all.
    pub fn name(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

fn classify(token: &str) -> Option<(Stream, RedirectMode)> {
    match token {
        ">" | "1>" => Some((Stream::Stdout, RedirectMode::Truncate)),
        ">>" | "1>>" => Some((Stream::Stdout, RedirectMode::Append)),
        "2>" => Some((Stream::Stderr, RedirectMode::Truncate)),
        "2>>" => Some((Stream::Stderr, RedirectMode::Append)),
        _ => None,
    }
}

/// Extracts redirections from a token sequence.
///
/// An operator consumes the token right after it as its filename. An operator
/// at the very end has nothing to consume and is dropped. When a stream is
/// redirected twice the last one wins.
pub fn parse_command(tokens: Vec<Token>) -> ParsedCommand {
    let mut cmd = ParsedCommand::default();
    let mut tokens = tokens.into_iter();

    while let Some(token) = tokens.next() {
        let Some((stream, mode)) = classify(&token) else {
            cmd.argv.push(token);
            continue;
        };
        let Some(path) = tokens.next() else {
            log::debug!("dangling redirection operator {token:?} ignored");
            break;
        };
        let target = Some(RedirectTarget::new(path, mode));
        match stream {
            Stream::Stdout => cmd.stdout = target,
            Stream::Stderr => cmd.stderr = target,
        }
    }

    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::split_into_tokens;

    fn parse(line: &str) -> ParsedCommand {
        parse_command(split_into_tokens(line))
    }

    #[test]
    fn test_stdout_truncate() {
        let cmd = parse("echo hi > out.txt");
        assert_eq!(cmd.argv, vec!["echo", "hi"]);
        assert_eq!(
            cmd.stdout,
            Some(RedirectTarget::new("out.txt", RedirectMode::Truncate))
        );
        assert_eq!(cmd.stderr, None);
    }

    #[test]
    fn test_stdout_append() {
        let cmd = parse("echo hi >> out.txt");
        assert_eq!(cmd.argv, vec!["echo", "hi"]);
        assert_eq!(
            cmd.stdout,
            Some(RedirectTarget::new("out.txt", RedirectMode::Append))
        );
    }

    #[test]
    fn test_explicit_fd_operators() {
        let cmd = parse("ls -1 nope 1> out 2>> err");
        assert_eq!(cmd.argv, vec!["ls", "-1", "nope"]);
        assert_eq!(
            cmd.stdout,
            Some(RedirectTarget::new("out", RedirectMode::Truncate))
        );
        assert_eq!(
            cmd.stderr,
            Some(RedirectTarget::new("err", RedirectMode::Append))
        );

        let cmd = parse("cat x 1>> a 2> b");
        assert_eq!(cmd.stdout.unwrap().mode, RedirectMode::Append);
        assert_eq!(cmd.stderr.unwrap().mode, RedirectMode::Truncate);
    }

    #[test]
    fn test_operator_in_the_middle_keeps_order() {
        let cmd = parse("echo a > f b c");
        assert_eq!(cmd.argv, vec!["echo", "a", "b", "c"]);
        assert_eq!(cmd.stdout.unwrap().path, "f");
    }

    #[test]
    fn test_dangling_operator_is_dropped() {
        let cmd = parse("echo hi >");
        assert_eq!(cmd.argv, vec!["echo", "hi"]);
        assert_eq!(cmd.stdout, None);

        let cmd = parse("echo hi 2>>");
        assert_eq!(cmd.argv, vec!["echo", "hi"]);
        assert_eq!(cmd.stderr, None);
    }

    #[test]
    fn test_last_redirect_wins() {
        let cmd = parse("echo hi > first >> second");
        assert_eq!(
            cmd.stdout,
            Some(RedirectTarget::new("second", RedirectMode::Append))
        );
        assert_eq!(cmd.argv, vec!["echo", "hi"]);
    }

    #[test]
    fn test_quoted_filename() {
        let cmd = parse("echo x > 'my file.txt'");
        assert_eq!(cmd.stdout.unwrap().path, "my file.txt");
    }

    #[test]
    fn test_name_and_args() {
        let cmd = parse("type echo pwd");
        assert_eq!(cmd.name(), Some("type"));
        assert_eq!(cmd.args(), ["echo".to_string(), "pwd".to_string()]);

        let empty = parse("   ");
        assert_eq!(empty.name(), None);
        assert!(empty.args().is_empty());
    }
}
