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

//! This crate provides the [`quoted`] function that turns an arbitrary
//! string into a form that can be fed back to the shell and expands to the
//! original string.
//!
//! The result is chosen to be as readable as possible:
//!
//! - If the string contains no character that the shell treats specially,
//!   it is returned unchanged.
//! - If the string contains special characters but no single quote, the
//!   whole string is single-quoted.
//! - Otherwise, the string is double-quoted and the characters `"`, `` ` ``,
//!   `$`, and `\` are escaped with a backslash.
//!
//! Variable listings produced by `set` and `declare -p` and trap listings
//! produced by `trap` use this function so that their output can be sourced
//! again.
//!
//! # Examples
//!
//! ```
//! # use std::borrow::Cow::{Borrowed, Owned};
//! # use blush_quote::quoted;
//! assert_eq!(quoted("bare"), Borrowed("bare"));
//! assert_eq!(quoted("two words"), Owned::<str>("'two words'".to_owned()));
//! assert_eq!(quoted("it's"), Owned::<str>(r#""it's""#.to_owned()));
//! ```

use std::borrow::Cow::{self, Borrowed, Owned};

/// Quotes a string for re-input to the shell.
///
/// Returns `Borrowed(s)` when no quoting is needed, and an `Owned` quoted
/// rendition otherwise. The empty string quotes to `''`.
#[must_use]
pub fn quoted(s: &str) -> Cow<'_, str> {
    if !s.is_empty() && !needs_quoting(s) {
        return Borrowed(s);
    }

    if !s.contains('\'') {
        return Owned(format!("'{s}'"));
    }

    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');
    for c in s.chars() {
        if matches!(c, '"' | '`' | '$' | '\\') {
            result.push('\\');
        }
        result.push(c);
    }
    result.push('"');
    Owned(result)
}

fn needs_quoting(s: &str) -> bool {
    if s.chars().any(special_char) {
        return true;
    }

    // # and ~ are special only at the start of a word
    if s.starts_with(['#', '~']) {
        return true;
    }

    // { and [ are special only when later closed
    if let Some(i) = s.find('{') {
        if s[i + 1..].contains('}') {
            return true;
        }
    }
    if let Some(i) = s.find('[') {
        if s[i + 1..].contains(']') {
            return true;
        }
    }

    false
}

fn special_char(c: char) -> bool {
    match c {
        ';' | '&' | '|' | '(' | ')' | '<' | '>' => true,
        '$' | '`' | '\\' | '"' | '\'' | '=' | '*' | '?' | '!' => true,
        _ => c.is_whitespace(),
    }
}
