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

//! Word expansion
//!
//! [`expand_words`] turns the words of a command into the final argument
//! fields, applying the whole pipeline in order: brace expansion, tilde
//! expansion, parameter/command/arithmetic expansion, field splitting,
//! pathname expansion, and quote removal. [`expand_word`] expands a word
//! in a context that takes a single field (assignment values, redirection
//! targets, `case` subjects), skipping splitting and pathname expansion.
//!
//! Expansion happens at execution time: a word inside a loop body sees
//! the variable values current at each iteration.

pub mod attr;
mod brace;
mod glob;
pub mod initial;
mod split;

pub mod phrase;

use self::phrase::AttrField;
use blush_env::semantics::Field;
use blush_env::system::Errno;
use blush_env::Env;
use blush_syntax::source::pretty::{Annotation, AnnotationType, MessageBase};
use blush_syntax::source::Location;
use blush_syntax::syntax::{Text, Word};
use std::borrow::Cow;
use thiserror::Error;

/// Cause of an expansion failure
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ErrorCause {
    /// Expansion of an unset parameter under `set -u`
    #[error("{name}: unbound variable")]
    UnsetParameter { name: String },
    /// `${var:?message}` with an unset or empty value
    #[error("{name}: {message}")]
    EmptyExpansion { name: String, message: String },
    /// Error evaluating an arithmetic expression
    #[error("arithmetic error: {0}")]
    Arith(String),
    /// Invalid array subscript
    #[error("{0}: bad array subscript")]
    BadSubscript(String),
    /// A pattern that could not be compiled
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
    /// Assignment to a read-only variable
    #[error("{name}: readonly variable")]
    ReadOnlyVariable { name: String },
    /// A nested command or process substitution could not be started
    #[error("cannot start substitution: {0}")]
    SubstitutionSystem(Errno),
    /// A syntax error inside a command substitution
    #[error("error in command substitution")]
    SubstitutionSyntax,
}

/// Expansion failure with its location
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{cause}")]
pub struct Error {
    pub cause: ErrorCause,
    pub location: Location,
}

impl MessageBase for Error {
    fn message_title(&self) -> Cow<'_, str> {
        self.cause.to_string().into()
    }

    fn main_annotation(&self) -> Annotation<'_> {
        Annotation {
            r#type: AnnotationType::Error,
            label: self.cause.to_string().into(),
            location: &self.location,
        }
    }
}

/// Result of expansion
pub type Result<T> = std::result::Result<T, Error>;

/// Reports an expansion error and diverts execution.
///
/// The status becomes 1 and the rest of the command is not run. An
/// interactive shell aborts the current command line; a non-interactive
/// shell exits, as POSIX requires for expansion errors.
pub fn report_error(
    env: &mut Env,
    error: &Error,
) -> blush_env::semantics::Result {
    use blush_env::semantics::{Divert, ExitStatus};
    let message = blush_syntax::source::pretty::render(
        &blush_syntax::source::pretty::Message::from(error),
    );
    let _ = env.system.write_all(2, message.as_bytes());
    let _ = env.system.write_all(2, b"\n");
    env.exit_status = ExitStatus::FAILURE;
    if env.is_interactive() {
        std::ops::ControlFlow::Break(Divert::Interrupt(None))
    } else {
        std::ops::ControlFlow::Break(Divert::Exit(None))
    }
}

/// Expands command words to the final argument fields.
///
/// The number of resulting fields may be zero, one, or many per word.
pub fn expand_words(env: &mut Env, words: &[Word]) -> Result<Vec<Field>> {
    let mut fields = Vec::new();
    for word in words {
        for word in brace::expand_braces(word) {
            fields.extend(expand_one_word(env, &word)?);
        }
    }
    Ok(fields)
}

fn expand_one_word(env: &mut Env, word: &Word) -> Result<Vec<Field>> {
    let phrase = initial::expand_word_attr(env, word)?;

    let mut attr_fields = Vec::new();
    for field in phrase.0 {
        attr_fields.extend(split::split(env, field));
    }

    // A word that expands to one empty field without any quoting
    // disappears entirely
    if let [field] = &attr_fields[..] {
        if field.chars.is_empty() && !field.quoted {
            attr_fields.clear();
        }
    }

    let mut fields = Vec::new();
    for field in attr_fields {
        fields.extend(glob::glob_field(env, field, &word.location));
    }
    Ok(fields)
}

/// Expands a word to exactly one field.
///
/// Field splitting and pathname expansion do not apply; an expansion that
/// produces several fields (like `"$@"`) is joined with spaces.
pub fn expand_word(env: &mut Env, word: &Word) -> Result<Field> {
    let phrase = initial::expand_word_attr(env, word)?;
    Ok(join_phrase(phrase.0, &word.location))
}

/// Expands a text (a double-quote-like context) to a string.
pub fn expand_text(env: &mut Env, text: &Text, location: &Location) -> Result<String> {
    let phrase = initial::expand_text_attr(env, text, true)?;
    Ok(join_phrase(phrase.0, location).value)
}

fn join_phrase(fields: Vec<AttrField>, location: &Location) -> Field {
    let mut value = String::new();
    for (index, field) in fields.iter().enumerate() {
        if index > 0 {
            value.push(' ');
        }
        value.extend(field.chars.iter().map(|c| c.value));
    }
    Field {
        value,
        origin: location.clone(),
    }
}

/// Converts an attributed field into a final field (quote removal).
pub(crate) fn to_field(field: AttrField, location: &Location) -> Field {
    Field {
        value: field.to_string_value(),
        origin: location.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blush_env::variable::{Scalar, Value};
    use blush_syntax::alias::AliasSet;
    use blush_syntax::parser::lex::Lexer;
    use blush_syntax::parser::parse_program;
    use blush_syntax::source::Source;
    use blush_syntax::syntax::Command;

    /// Parses a simple command and returns its words.
    fn words_of(input: &str) -> Vec<Word> {
        let mut lexer = Lexer::with_source(input, Source::Unknown);
        let list = parse_program(&mut lexer, &AliasSet::new()).unwrap();
        match &*list.0[0].and_or.first.commands[0] {
            Command::Simple(simple) => simple.words.clone(),
            other => panic!("not a simple command: {other}"),
        }
    }

    fn expand_values(env: &mut Env, input: &str) -> Vec<String> {
        expand_words(env, &words_of(input))
            .unwrap()
            .into_iter()
            .map(|field| field.value)
            .collect()
    }

    #[test]
    fn literal_words() {
        let mut env = Env::new();
        assert_eq!(expand_values(&mut env, "a b c"), ["a", "b", "c"]);
    }

    #[test]
    fn variable_expansion_splits_fields() {
        let mut env = Env::new();
        env.variables
            .assign("x", Value::Scalar("one two".into()))
            .unwrap();
        assert_eq!(expand_values(&mut env, "$x"), ["one", "two"]);
        assert_eq!(expand_values(&mut env, "\"$x\""), ["one two"]);
    }

    #[test]
    fn literal_chars_adjacent_to_expansions_are_never_split() {
        let mut env = Env::new();
        env.variables
            .assign("x", Value::Scalar("a b".into()))
            .unwrap();
        assert_eq!(expand_values(&mut env, "pre$x"), ["prea", "b"]);
    }

    #[test]
    fn unset_variable_vanishes() {
        let mut env = Env::new();
        assert_eq!(expand_values(&mut env, "$unset"), Vec::<String>::new());
        assert_eq!(expand_values(&mut env, "\"\""), [""]);
    }

    #[test]
    fn quoted_at_with_no_params_produces_no_fields() {
        let mut env = Env::new();
        assert_eq!(expand_values(&mut env, "\"$@\""), Vec::<String>::new());
    }

    #[test]
    fn quoted_at_produces_separate_fields() {
        let mut env = Env::new();
        env.variables.positional_params_mut().values = vec!["a b".into(), "c".into()];
        assert_eq!(expand_values(&mut env, "\"$@\""), ["a b", "c"]);
        assert_eq!(expand_values(&mut env, "x\"$@\"y"), ["xa b", "cy"]);
    }

    #[test]
    fn quoted_star_joins_with_first_ifs_char() {
        let mut env = Env::new();
        env.variables.positional_params_mut().values = vec!["a".into(), "b".into()];
        assert_eq!(expand_values(&mut env, "\"$*\""), ["a b"]);
        env.variables
            .assign("IFS", Value::Scalar(":".into()))
            .unwrap();
        assert_eq!(expand_values(&mut env, "\"$*\""), ["a:b"]);
    }

    #[test]
    fn single_quotes_preserve_bytes() {
        let mut env = Env::new();
        assert_eq!(
            expand_values(&mut env, "'a  $x  *'"),
            ["a  $x  *"]
        );
    }

    #[test]
    fn brace_expansion_makes_sibling_words(){
        let mut env = Env::new();
        assert_eq!(expand_values(&mut env, "a{b,c}d"), ["abd", "acd"]);
        assert_eq!(expand_values(&mut env, "{1..4}"), ["1", "2", "3", "4"]);
    }

    #[test]
    fn expand_word_joins_multiple_fields() {
        let mut env = Env::new();
        env.variables.positional_params_mut().values = vec!["a".into(), "b".into()];
        let word = words_of("\"$@\"").remove(0);
        assert_eq!(expand_word(&mut env, &word).unwrap().value, "a b");
    }

    #[test]
    fn round_trip_scalar_value() {
        let mut env = Env::new();
        let tricky = "a  b\t*  'q' \\x";
        env.variables
            .assign("v", Scalar(tricky.into()))
            .unwrap();
        assert_eq!(expand_values(&mut env, "\"${v}\""), [tricky]);
    }
}
