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

//! Pattern matching for shell globbing.
//!
//! This crate compiles a shell pattern (`*`, `?`, bracket expressions, and
//! optionally the extended operators `?(…)`, `*(…)`, `+(…)`, `@(…)`,
//! `!(…)`) into a [`regex`] automaton and matches candidate strings
//! against it. It backs pathname expansion, `case` pattern matching,
//! `[[ word == pattern ]]`, and the pattern operators of parameter
//! expansion (`${var#pat}`, `${var/pat/repl}` and friends).
//!
//! The input to the parser is an iterator of [`PatternChar`]s rather than a
//! plain string, so that the caller can mark characters that originated
//! inside quotes. A quoted character never acts as a pattern operator:
//!
//! ```
//! # use blush_fnmatch::{Config, Pattern, PatternChar};
//! let quoted_star = [PatternChar::Literal('*')];
//! let pattern = Pattern::parse(quoted_star, &Config::default()).unwrap();
//! assert!(pattern.is_match("*"));
//! assert!(!pattern.is_match("anything"));
//! ```
//!
//! An unclosed bracket expression is not an error; the `[` matches itself,
//! as in most shells.

mod ast;
mod regex_impl;

use regex::Regex;
use thiserror::Error;

pub use ast::{Ast, Atom, Bracket, BracketAtom, BracketItem, GroupKind};

/// Character of a pattern, with quote provenance
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PatternChar {
    /// Character that may act as a pattern operator
    Normal(char),
    /// Character that always matches itself (it was quoted in the source)
    Literal(char),
}

impl PatternChar {
    /// Returns the character value regardless of provenance.
    #[inline]
    #[must_use]
    pub const fn char_value(self) -> char {
        match self {
            PatternChar::Normal(c) | PatternChar::Literal(c) => c,
        }
    }
}

/// Adapts a plain string for input to the parser, treating every character
/// as [`PatternChar::Normal`].
pub fn without_escape(pattern: &str) -> impl Iterator<Item = PatternChar> + Clone + '_ {
    pattern.chars().map(PatternChar::Normal)
}

/// Adapts a string with backslash escapes for input to the parser.
///
/// A backslash makes the next character [`PatternChar::Literal`]. A
/// trailing lone backslash is dropped.
pub fn with_escape(pattern: &str) -> impl Iterator<Item = PatternChar> + Clone + '_ {
    let mut chars = pattern.chars();
    std::iter::from_fn(move || match chars.next() {
        Some('\\') => chars.next().map(PatternChar::Literal),
        Some(c) => Some(PatternChar::Normal(c)),
        None => None,
    })
}

/// Options that affect pattern compilation
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Config {
    /// Recognize the extended operators `?(…)`, `*(…)`, `+(…)`, `@(…)`,
    /// and `!(…)`
    pub extglob: bool,

    /// Require a leading period in the candidate string to be matched by a
    /// literal period in the pattern
    ///
    /// Pathname expansion sets this so that `*` does not match hidden
    /// files.
    pub literal_period: bool,
}

/// Error compiling a pattern
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// A `!(…)` group appeared as part of a larger pattern.
    ///
    /// Negative groups are only supported when they span the whole
    /// pattern, as the underlying regex engine has no backtracking.
    #[error("`!(…)` is only supported as a complete pattern")]
    EmbeddedNegation,

    /// The generated regular expression was rejected by the regex engine.
    #[error(transparent)]
    Regex(Box<regex::Error>),
}

impl From<regex::Error> for Error {
    fn from(error: regex::Error) -> Self {
        Error::Regex(Box::new(error))
    }
}

/// Compiled pattern
#[derive(Clone, Debug)]
pub struct Pattern {
    /// Regex matching the entire candidate string
    full: Regex,
    /// Regex matching a prefix of the candidate string
    prefix: Regex,
    /// Whether the match result is inverted (`!(…)` as a whole pattern)
    negate: bool,
    /// The pattern text if it contains no pattern operators at all
    literal: Option<String>,
}

impl Pattern {
    /// Compiles a pattern from pattern characters.
    pub fn parse<I>(pattern: I, config: &Config) -> Result<Self, Error>
    where
        I: IntoIterator<Item = PatternChar>,
        I::IntoIter: Clone,
    {
        let ast = Ast::new(pattern, config)?;
        Self::from_ast(&ast, config)
    }

    /// Compiles a pattern from a parsed [`Ast`].
    pub fn from_ast(ast: &Ast, config: &Config) -> Result<Self, Error> {
        let (body, negate) = regex_impl::to_regex(ast, config)?;
        let full = Regex::new(&format!("^(?:{body})$"))?;
        let prefix = Regex::new(&format!("^(?:{body})"))?;
        let literal = ast.to_literal();
        Ok(Pattern {
            full,
            prefix,
            negate,
            literal,
        })
    }

    /// Returns the pattern text if the pattern contains no operators.
    ///
    /// Callers use this to skip matching machinery entirely: a literal
    /// pattern matches only its own text.
    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        self.literal.as_deref()
    }

    /// Matches the pattern against the whole candidate string.
    #[must_use]
    pub fn is_match(&self, candidate: &str) -> bool {
        self.full.is_match(candidate) != self.negate
    }

    /// Returns the length in bytes of the longest match starting at the
    /// beginning of `candidate`, or `None` if nothing matches there.
    ///
    /// Negated patterns do not support partial matching and always return
    /// `None`.
    #[must_use]
    pub fn prefix_match_len(&self, candidate: &str) -> Option<usize> {
        if self.negate {
            return None;
        }
        self.prefix.find(candidate).map(|m| m.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn pattern(s: &str) -> Pattern {
        Pattern::parse(without_escape(s), &Config::default()).unwrap()
    }

    fn extglob(s: &str) -> Pattern {
        let config = Config {
            extglob: true,
            ..Config::default()
        };
        Pattern::parse(without_escape(s), &config).unwrap()
    }

    #[test]
    fn literal_pattern() {
        let p = pattern("abc");
        assert_eq!(p.as_literal(), Some("abc"));
        assert!(p.is_match("abc"));
        assert!(!p.is_match("abcd"));
        assert!(!p.is_match("ab"));
    }

    #[test]
    fn any_char_and_any_string() {
        let p = pattern("a?c");
        assert!(p.is_match("abc"));
        assert!(p.is_match("axc"));
        assert!(!p.is_match("ac"));

        let p = pattern("a*c");
        assert!(p.is_match("ac"));
        assert!(p.is_match("abbbc"));
        assert!(!p.is_match("ab"));
    }

    #[test]
    fn star_matches_empty_and_all() {
        let p = pattern("*");
        assert!(p.is_match(""));
        assert!(p.is_match("anything at all"));
    }

    #[test]
    fn bracket_expressions() {
        let p = pattern("[abc]");
        assert!(p.is_match("a"));
        assert!(p.is_match("c"));
        assert!(!p.is_match("d"));

        let p = pattern("[a-z0-9]");
        assert!(p.is_match("q"));
        assert!(p.is_match("7"));
        assert!(!p.is_match("Q"));

        let p = pattern("[!a-z]");
        assert!(p.is_match("A"));
        assert!(!p.is_match("a"));

        let p = pattern("[[:digit:]]");
        assert!(p.is_match("5"));
        assert!(!p.is_match("x"));
    }

    #[test]
    fn bracket_with_leading_close_bracket() {
        let p = pattern("[]a]");
        assert!(p.is_match("]"));
        assert!(p.is_match("a"));
        assert!(!p.is_match("b"));
    }

    #[test]
    fn unclosed_bracket_is_literal() {
        let p = pattern("a[b");
        assert!(p.is_match("a[b"));
        assert!(!p.is_match("ab"));
    }

    #[test]
    fn quoted_chars_are_inert() {
        let chars = [
            PatternChar::Normal('a'),
            PatternChar::Literal('*'),
            PatternChar::Normal('*'),
        ];
        let p = Pattern::parse(chars, &Config::default()).unwrap();
        assert!(p.is_match("a*"));
        assert!(p.is_match("a*xyz"));
        assert!(!p.is_match("axyz"));
    }

    #[test]
    fn regex_metacharacters_are_escaped() {
        let p = pattern("a.c");
        assert!(p.is_match("a.c"));
        assert!(!p.is_match("abc"));

        let p = pattern("x(y)+");
        assert!(p.is_match("x(y)+"));
        assert!(!p.is_match("xy"));
    }

    #[test]
    fn prefix_match_is_longest() {
        let p = pattern("a*");
        assert_eq!(p.prefix_match_len("aaab"), Some(4));
        assert_eq!(p.prefix_match_len("ba"), None);

        let p = pattern("*b");
        assert_eq!(p.prefix_match_len("abcb"), Some(4));
    }

    #[test]
    fn extglob_optional_group() {
        let p = extglob("a?(bc)d");
        assert!(p.is_match("ad"));
        assert!(p.is_match("abcd"));
        assert!(!p.is_match("abcbcd"));
    }

    #[test]
    fn extglob_star_and_plus_groups() {
        let p = extglob("*(ab|c)");
        assert!(p.is_match(""));
        assert!(p.is_match("ababc"));
        assert!(!p.is_match("abx"));

        let p = extglob("+(a)b");
        assert!(p.is_match("ab"));
        assert!(p.is_match("aaab"));
        assert!(!p.is_match("b"));
    }

    #[test]
    fn extglob_at_group() {
        let p = extglob("@(foo|bar)");
        assert!(p.is_match("foo"));
        assert!(p.is_match("bar"));
        assert!(!p.is_match("foobar"));
    }

    #[test]
    fn extglob_whole_pattern_negation() {
        let p = extglob("!(*.o)");
        assert!(p.is_match("main.rs"));
        assert!(!p.is_match("main.o"));
    }

    #[test]
    fn extglob_embedded_negation_is_rejected() {
        let config = Config {
            extglob: true,
            ..Config::default()
        };
        let result = Pattern::parse(without_escape("a!(b)c"), &config);
        assert_matches!(result, Err(Error::EmbeddedNegation));
    }

    #[test]
    fn extglob_disabled_treats_operators_literally() {
        let p = pattern("a@(b)");
        assert!(p.is_match("a@(b)"));
        assert!(!p.is_match("ab"));
    }

    #[test]
    fn literal_period_config() {
        let config = Config {
            literal_period: true,
            ..Config::default()
        };
        let p = Pattern::parse(without_escape("*"), &config).unwrap();
        assert!(p.is_match("file"));
        assert!(!p.is_match(".hidden"));

        let p = Pattern::parse(without_escape(".*"), &config).unwrap();
        assert!(p.is_match(".hidden"));

        let p = Pattern::parse(without_escape("?x"), &config).unwrap();
        assert!(!p.is_match(".x"));
    }

    #[test]
    fn with_escape_quotes_next_char() {
        let p = Pattern::parse(with_escape(r"\*a"), &Config::default()).unwrap();
        assert!(p.is_match("*a"));
        assert!(!p.is_match("xa"));
    }
}
