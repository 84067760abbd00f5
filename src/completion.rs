//! Tab completion of command names.
//!
//! Candidates come from a fixed table of builtin abbreviations and from the
//! executables found in the search path. Results are kept in a [`BTreeSet`],
//! which gives both de-duplication and lexicographic order.

use crate::external::is_executable_file;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

/// Sorted, de-duplicated completion candidates for one prefix.
pub type CompletionSet = BTreeSet<String>;

/// Abbreviation -> canonical builtin name.
///
/// Every key that starts with the typed prefix contributes its canonical name.
const BUILTIN_COMPLETIONS: &[(&str, &str)] = &[
    ("ec", "echo"),
    ("ech", "echo"),
    ("echo", "echo"),
    ("ex", "exit"),
    ("exi", "exit"),
    ("exit", "exit"),
    ("ty", "type"),
    ("typ", "type"),
    ("type", "type"),
    ("pw", "pwd"),
    ("pwd", "pwd"),
    ("cd", "cd"),
];

/// Source of completion candidates, as seen by the line editor.
pub trait Completer {
    fn complete(&self, prefix: &str) -> CompletionSet;
}

/// Completes builtin names and executables found in `search_path`.
#[derive(Debug, Clone, Default)]
pub struct CommandCompleter {
    search_path: Vec<PathBuf>,
}

impl CommandCompleter {
    pub fn new(search_path: Vec<PathBuf>) -> Self {
        Self { search_path }
    }

    fn add_builtins(&self, prefix: &str, out: &mut CompletionSet) {
        for (key, name) in BUILTIN_COMPLETIONS {
            if key.starts_with(prefix) {
                out.insert((*name).to_string());
            }
        }
    }

    fn add_executables(&self, prefix: &str, out: &mut CompletionSet) {
        for dir in &self.search_path {
            let entries = match fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(e) => {
                    log::debug!("skipping {} during completion: {e}", dir.display());
                    continue;
                }
            };
            for entry in entries.flatten() {
                let Ok(name) = entry.file_name().into_string() else {
                    continue;
                };
                if name.starts_with(prefix) && is_executable_file(&entry.path()) {
                    out.insert(name);
                }
            }
        }
    }
}

impl Completer for CommandCompleter {
    fn complete(&self, prefix: &str) -> CompletionSet {
        let mut out = CompletionSet::new();
        self.add_builtins(prefix, &mut out);
        self.add_executables(prefix, &mut out);
        log::debug!("{} completion(s) for {prefix:?}", out.len());
        out
    }
}

/// Longest string that prefixes every candidate; empty for an empty set.
///
/// Starts from the first candidate and drops its last character until every
/// other candidate starts with it.
pub fn longest_common_prefix<'a, I>(candidates: I) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    let mut candidates = candidates.into_iter();
    let Some(first) = candidates.next() else {
        return String::new();
    };
    let mut prefix = first.clone();
    for candidate in candidates {
        while !candidate.starts_with(prefix.as_str()) {
            prefix.pop();
            if prefix.is_empty() {
                return prefix;
            }
        }
    }
    prefix
}
