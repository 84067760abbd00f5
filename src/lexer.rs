//! A module implementing lexical analysis (tokenization) of a single input line.
//!
//! Tokens carry no type tag: a redirection operator such as `>` comes out as an
//! ordinary word and is classified later by [`crate::parser`].

/// A single word produced by the lexer, already unquoted and unescaped.
pub type Token = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    /// Between words, skipping whitespace.
    Start,
    /// Inside an unquoted word.
    ReadingWord,
    ReadingSingleQuote,
    ReadingDoubleQuote,
}

struct LexingFSM {
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    buffer: String,
    /// Set once the current word has started, so that `''` still yields a word.
    in_word: bool,
}

impl LexingFSM {
    fn new(line: &str) -> Self {
        LexingFSM {
            input: line.chars().collect(),
            pos: 0,
            state: LexingState::Start,
            buffer: String::new(),
            in_word: false,
        }
    }

    /// Runs the state machine over the whole input.
    ///
    /// Never fails: an unterminated quote swallows the rest of the line as if
    /// the closing quote had been appended.
    fn make_tokens(&mut self) -> Vec<Token> {
        let mut out = Vec::new();

        while let Some(ch) = self.read_char() {
            match self.state {
                LexingState::Start => self.handle_start(ch),
                LexingState::ReadingWord => self.handle_word(ch, &mut out),
                LexingState::ReadingSingleQuote => self.handle_single_quote(ch),
                LexingState::ReadingDoubleQuote => self.handle_double_quote(ch),
            }
        }

        self.finish_word(&mut out);
        out
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn handle_start(&mut self, ch: char) {
        if ch.is_whitespace() {
            return;
        }
        self.in_word = true;
        self.state = LexingState::ReadingWord;
        self.handle_unquoted(ch);
    }

    fn handle_word(&mut self, ch: char, out: &mut Vec<Token>) {
        if ch.is_whitespace() {
            self.finish_word(out);
            self.state = LexingState::Start;
        } else {
            self.handle_unquoted(ch);
        }
    }

    fn handle_unquoted(&mut self, ch: char) {
        match ch {
            '\'' => self.state = LexingState::ReadingSingleQuote,
            '"' => self.state = LexingState::ReadingDoubleQuote,
            // A trailing backslash has nothing to escape and is kept as is.
            '\\' => match self.read_char() {
                Some(escaped) => self.buffer.push(escaped),
                None => self.buffer.push('\\'),
            },
            c => self.buffer.push(c),
        }
    }

    fn handle_single_quote(&mut self, ch: char) {
        match ch {
            '\'' => self.state = LexingState::ReadingWord,
            c => self.buffer.push(c),
        }
    }

    fn handle_double_quote(&mut self, ch: char) {
        match ch {
            '"' => self.state = LexingState::ReadingWord,
            '\\' => match self.peek_char() {
                Some(next @ ('\\' | '$' | '"' | '\n')) => {
                    self.read_char();
                    self.buffer.push(next);
                }
                _ => self.buffer.push('\\'),
            },
            c => self.buffer.push(c),
        }
    }

    fn finish_word(&mut self, out: &mut Vec<Token>) {
        if self.in_word {
            out.push(std::mem::take(&mut self.buffer));
            self.in_word = false;
        }
    }
}

/// Splits one input line into words following POSIX-like quoting rules.
///
/// * whitespace outside quotes separates words, runs of it collapse;
/// * `'...'` is copied verbatim;
/// * inside `"..."` a backslash only escapes `\`, `$`, `"` and newline;
/// * outside quotes a backslash escapes the next character;
/// * adjacent quoted and unquoted segments form a single word.
pub fn split_into_tokens(line: &str) -> Vec<Token> {
    let mut lexer = LexingFSM::new(line);
    lexer.make_tokens()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(line: &str) -> Vec<String> {
        split_into_tokens(line)
    }

    #[test]
    fn test_quotes_are_removed() {
        assert_eq!(toks(r#"echo 'a b' "c\"d""#), vec!["echo", "a b", "c\"d"]);
    }

    #[test]
    fn test_escaped_space_joins_word() {
        assert_eq!(toks(r"cmd a\ b"), vec!["cmd", "a b"]);
    }

    #[test]
    fn test_whitespace_collapses() {
        assert_eq!(toks("   ls \t  -la   /tmp  "), vec!["ls", "-la", "/tmp"]);
        assert!(toks("").is_empty());
        assert!(toks("  \t ").is_empty());
    }

    #[test]
    fn test_single_quotes_keep_backslashes() {
        assert_eq!(toks(r"echo 'a\nb\\c'"), vec!["echo", r"a\nb\\c"]);
        assert_eq!(toks(r#"echo 'say "hi"'"#), vec!["echo", r#"say "hi""#]);
    }

    #[test]
    fn test_double_quote_escapes() {
        assert_eq!(toks(r#"echo "a\\b""#), vec!["echo", r"a\b"]);
        assert_eq!(toks(r#"echo "\$HOME""#), vec!["echo", "$HOME"]);
        // backslash before an ordinary character is kept
        assert_eq!(toks(r#"echo "a\nb""#), vec!["echo", r"a\nb"]);
        assert_eq!(toks(r#"echo "it's""#), vec!["echo", "it's"]);
    }

    #[test]
    fn test_unquoted_backslash() {
        assert_eq!(toks(r"echo \'quoted\'"), vec!["echo", "'quoted'"]);
        assert_eq!(toks(r"echo a\\b"), vec!["echo", r"a\b"]);
        assert_eq!(toks(r"echo trailing\"), vec!["echo", r"trailing\"]);
    }

    #[test]
    fn test_adjacent_segments_concatenate() {
        assert_eq!(toks("foo'bar'"), vec!["foobar"]);
        assert_eq!(toks(r#"'a'"b"c d"#), vec!["abc", "d"]);
        assert_eq!(toks(r#""/tmp/my dir"/file"#), vec!["/tmp/my dir/file"]);
    }

    #[test]
    fn test_empty_quotes_make_empty_word() {
        assert_eq!(toks("echo '' x"), vec!["echo", "", "x"]);
        assert_eq!(toks(r#"echo """#), vec!["echo", ""]);
    }

    #[test]
    fn test_unterminated_quote_consumes_rest() {
        assert_eq!(toks("echo 'abc def"), vec!["echo", "abc def"]);
        assert_eq!(toks(r#"echo "x  y\"#), vec!["echo", r"x  y\"]);
    }

    #[test]
    fn test_redirection_operators_are_plain_words() {
        assert_eq!(
            toks("ls /nope 2>> err.log"),
            vec!["ls", "/nope", "2>>", "err.log"]
        );
    }

    #[test]
    fn test_rejoin_without_quotes_is_idempotent() {
        let line = "  cat   /etc/hosts\t-n  ";
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(toks(line).join(" "), collapsed);
    }
}
