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

//! Arithmetic expansion
//!
//! The content of `$((…))` first undergoes parameter and command
//! substitution like a double-quoted string, and the resulting text is
//! evaluated as an integer expression by the `blush-arith` crate, which
//! reads and writes shell variables through the [`VarEnv`] adapter.

use super::super::attr::soft_chars;
use super::super::phrase::Phrase;
use super::super::{Error, ErrorCause, Result};
use blush_env::option::ShellOption;
use blush_env::variable::Value;
use blush_env::Env;
use blush_syntax::source::Location;
use blush_syntax::syntax::Text;
use std::fmt;

/// Error accessing a variable during arithmetic evaluation
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct VarError(pub String);

impl fmt::Display for VarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Adapter exposing shell variables to the arithmetic evaluator
pub(crate) struct VarEnv<'a> {
    pub env: &'a mut Env,
}

impl blush_arith::Env for VarEnv<'_> {
    type Error = VarError;

    fn get_variable(&self, name: &str) -> std::result::Result<Option<&str>, VarError> {
        let value = self.env.variables.get(name).and_then(|variable| {
            match variable.value.as_ref()? {
                Value::Scalar(s) => Some(s.as_str()),
                Value::Array(values) => values.first().map(String::as_str),
                Value::Assoc(map) => map.get("0").map(String::as_str),
            }
        });
        if value.is_none() && self.env.options.get(ShellOption::Nounset) {
            return Err(VarError(format!("{name}: unbound variable")));
        }
        Ok(value)
    }

    fn assign_variable(&mut self, name: &str, value: &str) -> std::result::Result<(), VarError> {
        self.env
            .variables
            .assign(name, Value::Scalar(value.to_owned()))
            .map(drop)
            .map_err(|error| VarError(error.to_string()))
    }
}

/// Evaluates an arithmetic expression string in the environment.
pub(crate) fn eval_expression(
    env: &mut Env,
    expression: &str,
    location: &Location,
) -> Result<i64> {
    let mut var_env = VarEnv { env };
    blush_arith::eval(expression, &mut var_env).map_err(|error| Error {
        cause: ErrorCause::Arith(error.to_string()),
        location: location.clone(),
    })
}

/// Expands `$((…))`.
pub fn expand_arith(
    env: &mut Env,
    content: &Text,
    quoted: bool,
    location: &Location,
) -> Result<Phrase> {
    let expression = super::super::expand_text(env, content, location)?;
    let value = eval_expression(env, &expression, location)?;
    Ok(Phrase::from_chars(
        soft_chars(&value.to_string(), quoted),
        false,
    ))
}

#[cfg(test)]
mod tests {
    use super::super::super::phrase::AttrField;
    use super::super::expand_word_attr;
    use super::*;
    use blush_syntax::source::Source;
    use blush_syntax::syntax::Word;

    fn word(input: &str) -> Word {
        blush_syntax::parser::lex::Lexer::with_source(input, Source::Unknown)
            .word()
            .unwrap()
    }

    fn expand_one(env: &mut Env, input: &str) -> String {
        let phrase = expand_word_attr(env, &word(input)).unwrap();
        assert_eq!(phrase.0.len(), 1);
        AttrField::to_string_value(&phrase.0[0])
    }

    #[test]
    fn constant_arithmetic() {
        let mut env = Env::new();
        assert_eq!(expand_one(&mut env, "$((1 + 2 * 3))"), "7");
    }

    #[test]
    fn variables_resolve_without_dollar() {
        let mut env = Env::new();
        env.variables
            .assign("n", Value::Scalar("20".into()))
            .unwrap();
        assert_eq!(expand_one(&mut env, "$((n + 1))"), "21");
        assert_eq!(expand_one(&mut env, "$(($n + 2))"), "22");
    }

    #[test]
    fn assignment_side_effect() {
        let mut env = Env::new();
        assert_eq!(expand_one(&mut env, "$((x = 6 * 7))"), "42");
        assert_eq!(env.variables.get_scalar("x").unwrap(), "42");
    }

    #[test]
    fn unset_is_zero() {
        let mut env = Env::new();
        assert_eq!(expand_one(&mut env, "$((unset + 5))"), "5");
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let mut env = Env::new();
        let result = expand_word_attr(&mut env, &word("$((1 / 0))"));
        assert!(matches!(
            result.unwrap_err().cause,
            ErrorCause::Arith(_)
        ));
    }
}
