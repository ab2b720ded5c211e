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

//! Field splitting
//!
//! Splitting applies only to characters that resulted from an unquoted
//! expansion; literal characters adjacent to an expansion never split the
//! field. Whitespace separators in `$IFS` collapse and are trimmed at
//! both ends; a non-whitespace separator (with its adjacent whitespace)
//! delimits exactly one field, which may be empty.

use super::attr::AttrChar;
use super::phrase::AttrField;
use blush_env::Env;

/// Default IFS value when the variable is unset
pub const DEFAULT_IFS: &str = " \t\n";

/// Class of a character with respect to the current IFS
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Class {
    NonIfs,
    IfsWhitespace,
    IfsNonWhitespace,
}

fn classify(c: &AttrChar, ifs: &str) -> Class {
    if !c.is_splittable() || !ifs.contains(c.value) {
        Class::NonIfs
    } else if c.value.is_whitespace() {
        Class::IfsWhitespace
    } else {
        Class::IfsNonWhitespace
    }
}

/// Returns the IFS value in effect.
pub fn ifs(env: &Env) -> String {
    match env.variables.get_scalar("IFS") {
        Some(value) => value.into_owned(),
        None => DEFAULT_IFS.to_owned(),
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    /// Before the first field
    Start,
    /// Accumulating field characters
    InField,
    /// After whitespace that closed a field
    AfterWhitespace,
    /// Directly after a non-whitespace separator
    AfterSeparator,
    /// After a non-whitespace separator followed by whitespace
    AfterSeparatorWhitespace,
}

/// Splits one attributed field into zero or more fields.
pub fn split(env: &Env, field: AttrField) -> Vec<AttrField> {
    let ifs = ifs(env);
    if ifs.is_empty() || !field.chars.iter().any(AttrChar::is_splittable) {
        return vec![field];
    }

    let quoted = field.quoted;
    let make = |chars| AttrField { chars, quoted };

    let mut fields = Vec::new();
    let mut current = Vec::new();
    let mut state = State::Start;

    for c in field.chars {
        state = match (state, classify(&c, &ifs)) {
            (_, Class::NonIfs) => {
                current.push(c);
                State::InField
            }
            (State::InField, Class::IfsWhitespace) => {
                fields.push(make(std::mem::take(&mut current)));
                State::AfterWhitespace
            }
            (State::InField, Class::IfsNonWhitespace) => {
                fields.push(make(std::mem::take(&mut current)));
                State::AfterSeparator
            }
            (
                State::Start | State::AfterSeparator | State::AfterSeparatorWhitespace,
                Class::IfsNonWhitespace,
            ) => {
                // Two separators in a row (or a leading one) delimit an
                // empty field
                fields.push(make(Vec::new()));
                State::AfterSeparator
            }
            (State::AfterWhitespace, Class::IfsNonWhitespace) => State::AfterSeparator,
            (State::AfterSeparator, Class::IfsWhitespace) => State::AfterSeparatorWhitespace,
            (state, Class::IfsWhitespace) => state,
        };
    }
    if state == State::InField {
        fields.push(make(current));
    }

    if fields.is_empty() && quoted {
        // A quoted empty field survives splitting
        fields.push(make(Vec::new()));
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::super::attr::{literal_chars, soft_chars};
    use super::*;

    fn soft_field(s: &str) -> AttrField {
        AttrField {
            chars: soft_chars(s, false),
            quoted: false,
        }
    }

    fn values(fields: &[AttrField]) -> Vec<String> {
        fields.iter().map(AttrField::to_string_value).collect()
    }

    fn split_with_ifs(ifs: &str, input: &str) -> Vec<String> {
        let mut env = Env::new();
        env.variables
            .assign("IFS", blush_env::variable::Value::Scalar(ifs.into()))
            .unwrap();
        values(&split(&env, soft_field(input)))
    }

    #[test]
    fn whitespace_separators_collapse() {
        let env = Env::new();
        let fields = split(&env, soft_field("  a   b  "));
        assert_eq!(values(&fields), ["a", "b"]);
    }

    #[test]
    fn whitespace_only_produces_no_fields() {
        let env = Env::new();
        assert!(split(&env, soft_field("   ")).is_empty());
    }

    #[test]
    fn literal_chars_do_not_split() {
        let env = Env::new();
        let field = AttrField {
            chars: literal_chars("a b", false),
            quoted: false,
        };
        assert_eq!(values(&split(&env, field)), ["a b"]);
    }

    #[test]
    fn quoted_soft_chars_do_not_split() {
        let env = Env::new();
        let field = AttrField {
            chars: soft_chars("a b", true),
            quoted: true,
        };
        assert_eq!(values(&split(&env, field)), ["a b"]);
    }

    #[test]
    fn non_whitespace_separators() {
        assert_eq!(split_with_ifs(":", "a::b"), ["a", "", "b"]);
        assert_eq!(split_with_ifs(":", "a:b:"), ["a", "b"]);
        assert_eq!(split_with_ifs(":", ":a"), ["", "a"]);
    }

    #[test]
    fn whitespace_around_separator_merges() {
        assert_eq!(split_with_ifs(" :", "a : b"), ["a", "b"]);
        assert_eq!(split_with_ifs(" :", "a : : b"), ["a", "", "b"]);
    }

    #[test]
    fn empty_ifs_disables_splitting() {
        assert_eq!(split_with_ifs("", "a b"), ["a b"]);
    }
}
