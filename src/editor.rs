//! Byte-at-a-time line editing for interactive sessions.
//!
//! The terminal is expected to be in raw mode while [`LineEditor::read_line`]
//! runs, so the editor echoes everything itself and writes `\r\n` for line
//! breaks. [`RawModeGuard`] scopes raw mode to a single read.

use crate::completion::{Completer, longest_common_prefix};
use std::io::{self, ErrorKind, Read, Write};

const TAB: u8 = b'\t';
const BELL: &[u8] = b"\x07";
/// Moves back one cell, blanks it, and moves back again.
const ERASE: &[u8] = b"\x08 \x08";
const NEWLINE: &[u8] = b"\r\n";

/// Keeps the controlling terminal in raw mode while alive.
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    pub fn acquire() -> io::Result<Self> {
        crossterm::terminal::enable_raw_mode()?;
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = crossterm::terminal::disable_raw_mode() {
            log::warn!("failed to restore terminal mode: {e}");
        }
    }
}

#[derive(Default)]
struct EditState {
    buffer: Vec<u8>,
    /// Consecutive tab presses; only an ambiguous completion reads it.
    tab_count: u32,
}

impl EditState {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }
}

/// Reads one line from raw key bytes, completing command names on tab.
pub struct LineEditor<C> {
    completer: C,
    prompt: String,
}

impl<C: Completer> LineEditor<C> {
    pub fn new(completer: C, prompt: impl Into<String>) -> Self {
        Self {
            completer,
            prompt: prompt.into(),
        }
    }

    /// Prints the prompt and edits a line until enter is pressed.
    ///
    /// Returns `None` when input ends before anything was typed; a partially
    /// typed line is returned as is.
    pub fn read_line(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
    ) -> io::Result<Option<String>> {
        output.write_all(self.prompt.as_bytes())?;
        output.flush()?;

        let mut state = EditState::default();
        loop {
            let Some(byte) = read_byte(input)? else {
                return Ok((!state.buffer.is_empty()).then(|| state.text()));
            };
            match byte {
                b'\n' | b'\r' => {
                    output.write_all(NEWLINE)?;
                    output.flush()?;
                    return Ok(Some(state.text()));
                }
                TAB => self.complete(&mut state, output)?,
                other => {
                    state.tab_count = 0;
                    state.buffer.push(other);
                    output.write_all(&[other])?;
                }
            }
            output.flush()?;
        }
    }

    fn complete(&self, state: &mut EditState, output: &mut dyn Write) -> io::Result<()> {
        state.tab_count += 1;
        let current = state.text();
        let typed = current.trim();
        let matches = self.completer.complete(typed);

        let mut candidates = matches.iter();
        match (candidates.next(), candidates.next()) {
            (None, _) => output.write_all(BELL)?,
            (Some(only), None) => {
                replace_buffer(state, format!("{only} "), output)?;
                state.tab_count = 0;
            }
            _ => {
                let lcp = longest_common_prefix(&matches);
                if lcp.len() > typed.len() {
                    replace_buffer(state, lcp, output)?;
                    state.tab_count = 0;
                } else if state.tab_count == 1 {
                    output.write_all(BELL)?;
                } else {
                    let listing = matches.iter().map(String::as_str).collect::<Vec<_>>();
                    output.write_all(NEWLINE)?;
                    output.write_all(listing.join("  ").as_bytes())?;
                    output.write_all(NEWLINE)?;
                    output.write_all(self.prompt.as_bytes())?;
                    output.write_all(&state.buffer)?;
                    state.tab_count = 0;
                }
            }
        }
        Ok(())
    }
}

fn replace_buffer(state: &mut EditState, text: String, output: &mut dyn Write) -> io::Result<()> {
    for _ in state.text().chars() {
        output.write_all(ERASE)?;
    }
    state.buffer = text.into_bytes();
    output.write_all(&state.buffer)
}

fn read_byte(input: &mut dyn Read) -> io::Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match input.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CompletionSet;

    struct Fixed(Vec<&'static str>);

    impl Completer for Fixed {
        fn complete(&self, prefix: &str) -> CompletionSet {
            self.0
                .iter()
                .filter(|c| c.starts_with(prefix))
                .map(|c| c.to_string())
                .collect()
        }
    }

    fn run(words: Vec<&'static str>, keys: &str) -> (Option<String>, String) {
        let editor = LineEditor::new(Fixed(words), "$ ");
        let mut input = keys.as_bytes();
        let mut output = Vec::new();
        let line = editor.read_line(&mut input, &mut output).unwrap();
        (line, String::from_utf8(output).unwrap())
    }

    fn erase(n: usize) -> String {
        "\x08 \x08".repeat(n)
    }

    #[test]
    fn test_plain_line_is_echoed() {
        let (line, out) = run(vec![], "echo hi\n");
        assert_eq!(line.as_deref(), Some("echo hi"));
        assert_eq!(out, "$ echo hi\r\n");
    }

    #[test]
    fn test_carriage_return_ends_line() {
        let (line, _) = run(vec![], "pwd\r");
        assert_eq!(line.as_deref(), Some("pwd"));
    }

    #[test]
    fn test_single_match_completes_with_space() {
        let (line, out) = run(vec!["echo", "exit"], "ech\t\n");
        assert_eq!(line.as_deref(), Some("echo "));
        assert_eq!(out, format!("$ ech{}echo \r\n", erase(3)));
    }

    #[test]
    fn test_no_match_rings_bell() {
        let (line, out) = run(vec!["echo"], "zz\t\n");
        assert_eq!(line.as_deref(), Some("zz"));
        assert_eq!(out, "$ zz\x07\r\n");
    }

    #[test]
    fn test_common_prefix_extends_then_lists() {
        let words = vec!["xyz_foo", "xyz_foo_bar", "xyz_foo_bar_baz"];
        let (line, out) = run(words, "xyz_\t\t\t\n");
        assert_eq!(line.as_deref(), Some("xyz_foo"));
        let expected = format!(
            "$ xyz_{}xyz_foo\x07\r\nxyz_foo  xyz_foo_bar  xyz_foo_bar_baz\r\n$ xyz_foo\r\n",
            erase(4)
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn test_ambiguous_needs_two_tabs() {
        let (line, out) = run(vec!["abc", "abd"], "ab\t\t\n");
        assert_eq!(line.as_deref(), Some("ab"));
        assert_eq!(out, "$ ab\x07\r\nabc  abd\r\n$ ab\r\n");
    }

    #[test]
    fn test_typing_resets_tab_count() {
        let (line, out) = run(vec!["abc", "abd"], "ab\t \t\n");
        assert_eq!(line.as_deref(), Some("ab "));
        assert_eq!(out, "$ ab\x07 \x07\r\n");
    }

    #[test]
    fn test_listing_resets_tab_count() {
        let (_, out) = run(vec!["abc", "abd"], "ab\t\t\t\n");
        assert_eq!(out, "$ ab\x07\r\nabc  abd\r\n$ ab\x07\r\n");
    }

    #[test]
    fn test_other_control_bytes_are_kept() {
        let (line, out) = run(vec![], "a\x01b\n");
        assert_eq!(line.as_deref(), Some("a\x01b"));
        assert_eq!(out, "$ a\x01b\r\n");
    }

    #[test]
    fn test_end_of_input() {
        assert_eq!(run(vec![], "").0, None);
        assert_eq!(run(vec![], "partial").0.as_deref(), Some("partial"));
    }
}
