// This file is part of blush, a bash-leaning POSIX shell.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Command history
//!
//! The history file holds one command per line; a multi-line command is
//! joined with literal backslash-newline on write and re-split on read.
//! History expansion (`!!`, `!n`, `!-n`, `!str`, `!?str?`) happens on the
//! raw interactive line before tokenization and is skipped inside single
//! quotes.

use std::path::PathBuf;

/// In-memory command history bound to a file
#[derive(Clone, Debug, Default)]
pub struct History {
    path: Option<PathBuf>,
    entries: Vec<String>,
}

impl History {
    /// Loads the history from the given file, if it exists.
    ///
    /// A line ending with a backslash continues into the next line: the
    /// pair re-joins to a newline inside one logical command.
    #[must_use]
    pub fn load(path: PathBuf) -> History {
        let mut entries: Vec<String> = Vec::new();
        let mut current: Option<String> = None;
        if let Ok(content) = std::fs::read_to_string(&path) {
            for line in content.lines() {
                let entry = current.get_or_insert_with(String::new);
                match line.strip_suffix('\\') {
                    Some(stripped) => {
                        entry.push_str(stripped);
                        entry.push('\n');
                    }
                    None => {
                        entry.push_str(line);
                        entries.push(current.take().unwrap());
                    }
                }
            }
            if let Some(entry) = current {
                entries.push(entry);
            }
        }
        History {
            path: Some(path),
            entries,
        }
    }

    /// Creates a history that is not persisted.
    #[must_use]
    pub fn in_memory() -> History {
        History::default()
    }

    /// Records an executed command.
    pub fn push(&mut self, command: &str) {
        let command = command.trim_end_matches('\n');
        if command.trim().is_empty() {
            return;
        }
        if self.entries.last().map(String::as_str) == Some(command) {
            return;
        }
        self.entries.push(command.to_owned());
    }

    /// Returns the number of recorded commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no commands are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the history back to its file.
    ///
    /// Newlines inside a command become backslash-newline pairs, so that
    /// one logical command re-splits on load.
    pub fn save(&self) {
        let Some(path) = &self.path else {
            return;
        };
        let mut content = String::new();
        for entry in &self.entries {
            content.push_str(&entry.replace('\n', "\\\n"));
            content.push('\n');
        }
        let _ = std::fs::write(path, content);
    }

    /// Applies history expansion to an input line.
    ///
    /// Returns the expanded line and whether anything was substituted, or
    /// an error message for a failed event lookup.
    pub fn expand(&self, line: &str) -> Result<(String, bool), String> {
        let mut result = String::new();
        let mut changed = false;
        let mut chars = line.char_indices().peekable();
        let mut in_single_quotes = false;

        while let Some((index, c)) = chars.next() {
            match c {
                '\'' => {
                    in_single_quotes = !in_single_quotes;
                    result.push(c);
                }
                '\\' if !in_single_quotes => {
                    result.push(c);
                    if let Some((_, next)) = chars.next() {
                        result.push(next);
                    }
                }
                '!' if !in_single_quotes => {
                    let rest = &line[index + c.len_utf8()..];
                    match self.event(rest) {
                        Some((entry, consumed)) => {
                            result.push_str(&entry);
                            changed = true;
                            for _ in 0..consumed {
                                chars.next();
                            }
                        }
                        None if rest.starts_with(|c: char| {
                            c == '!' || c == '-' || c == '?' || c.is_ascii_alphanumeric()
                        }) =>
                        {
                            return Err(format!("!{rest}: event not found"));
                        }
                        None => result.push(c),
                    }
                }
                c => result.push(c),
            }
        }
        Ok((result, changed))
    }

    /// Resolves one history event designator. Returns the entry and the
    /// number of characters consumed after the `!`.
    fn event(&self, designator: &str) -> Option<(String, usize)> {
        let mut chars = designator.chars();
        match chars.next()? {
            '!' => self.entries.last().map(|entry| (entry.clone(), 1)),
            '?' => {
                // `!?string?`: most recent command containing the string
                let end = designator[1..].find('?')?;
                let needle = &designator[1..1 + end];
                let consumed = needle.chars().count() + 2;
                self.entries
                    .iter()
                    .rev()
                    .find(|entry| entry.contains(needle))
                    .map(|entry| (entry.clone(), consumed))
            }
            '-' => {
                let digits: String = chars.take_while(char::is_ascii_digit).collect();
                let back: usize = digits.parse().ok()?;
                self.entries
                    .len()
                    .checked_sub(back)
                    .and_then(|index| self.entries.get(index))
                    .map(|entry| (entry.clone(), digits.len() + 1))
            }
            c if c.is_ascii_digit() => {
                let digits: String = std::iter::once(c)
                    .chain(chars.take_while(char::is_ascii_digit))
                    .collect();
                let number: usize = digits.parse().ok()?;
                self.entries
                    .get(number.checked_sub(1)?)
                    .map(|entry| (entry.clone(), digits.len()))
            }
            c if c.is_ascii_alphabetic() => {
                let prefix: String = std::iter::once(c)
                    .chain(chars.take_while(|c| !c.is_whitespace()))
                    .collect();
                let consumed = prefix.chars().count();
                self.entries
                    .iter()
                    .rev()
                    .find(|entry| entry.starts_with(&prefix))
                    .map(|entry| (entry.clone(), consumed))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_with(entries: &[&str]) -> History {
        let mut history = History::in_memory();
        for entry in entries {
            history.push(entry);
        }
        history
    }

    #[test]
    fn bang_bang_is_the_last_command() {
        let history = history_with(&["echo one", "echo two"]);
        let (expanded, changed) = history.expand("!!").unwrap();
        assert_eq!(expanded, "echo two");
        assert!(changed);
    }

    #[test]
    fn numbered_events() {
        let history = history_with(&["first", "second", "third"]);
        assert_eq!(history.expand("!1").unwrap().0, "first");
        assert_eq!(history.expand("!-2").unwrap().0, "second");
    }

    #[test]
    fn prefix_and_substring_search() {
        let history = history_with(&["git status", "cargo fmt", "git push"]);
        assert_eq!(history.expand("!git").unwrap().0, "git push");
        assert_eq!(history.expand("!?fmt?").unwrap().0, "cargo fmt");
    }

    #[test]
    fn expansion_embeds_in_line() {
        let history = history_with(&["ls /tmp"]);
        assert_eq!(history.expand("sudo !!").unwrap().0, "sudo ls /tmp");
    }

    #[test]
    fn unknown_event_is_an_error() {
        let history = history_with(&["a"]);
        assert!(history.expand("!zzz").is_err());
        assert!(history.expand("!9").is_err());
    }

    #[test]
    fn bang_without_designator_is_literal() {
        let history = history_with(&["a"]);
        let (expanded, changed) = history.expand("echo hi!").unwrap();
        assert_eq!(expanded, "echo hi!");
        assert!(!changed);
        let (expanded, _) = history.expand("[[ ! -f x ]]").unwrap();
        assert_eq!(expanded, "[[ ! -f x ]]");
    }

    #[test]
    fn single_quotes_suppress_expansion() {
        let history = history_with(&["secret"]);
        let (expanded, changed) = history.expand("echo '!!'").unwrap();
        assert_eq!(expanded, "echo '!!'");
        assert!(!changed);
    }

    #[test]
    fn duplicate_suppression_and_empty_lines() {
        let mut history = history_with(&["a"]);
        history.push("a");
        history.push("   ");
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn file_round_trip_with_multiline_commands() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("history");
        let mut history = History::load(path.clone());
        history.push("for x in 1 2; do\necho $x\ndone");
        history.push("echo simple");
        history.save();

        let reloaded = History::load(path);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(
            reloaded.expand("!for").unwrap().0,
            "for x in 1 2; do\necho $x\ndone"
        );
    }
}
