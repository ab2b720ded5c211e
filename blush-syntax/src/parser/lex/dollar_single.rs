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

//! Lexing of dollar-single-quoted strings (`$'…'`)

use super::core::Lexer;
use crate::parser::error::{Error, SyntaxError};
use crate::syntax::{EscapeUnit, EscapedString, WordUnit};

impl Lexer {
    /// Parses a `$'…'` string starting at the current `$` character.
    pub fn dollar_single_quote(&mut self) -> Result<WordUnit, Error> {
        let start = self.index();
        self.next_char(); // $
        self.next_char(); // '
        let mut units = Vec::new();
        loop {
            match self.next_char() {
                None => {
                    return Err(self.error(
                        SyntaxError::UnclosedDollarSingleQuote,
                        start..start + 2,
                    ))
                }
                Some('\'') => return Ok(WordUnit::DollarSingleQuote(EscapedString(units))),
                Some('\\') => self.escape_unit(&mut units, start)?,
                Some(c) => units.push(EscapeUnit::Literal(c)),
            }
        }
    }

    /// Parses one backslash escape inside `$'…'`.
    fn escape_unit(&mut self, units: &mut Vec<EscapeUnit>, start: usize) -> Result<(), Error> {
        let Some(c) = self.next_char() else {
            return Err(self.error(SyntaxError::UnclosedDollarSingleQuote, start..start + 2));
        };
        let escaped = match c {
            'a' => '\u{7}',
            'b' => '\u{8}',
            'e' | 'E' => '\u{1B}',
            'f' => '\u{C}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\u{B}',
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            '?' => '?',
            'c' => {
                // Control character notation
                let Some(c) = self.next_char() else {
                    return Err(self.error(
                        SyntaxError::UnclosedDollarSingleQuote,
                        start..start + 2,
                    ));
                };
                let value = (c.to_ascii_uppercase() as u32) ^ 0x40;
                match char::from_u32(value) {
                    Some(control) => control,
                    None => {
                        units.push(EscapeUnit::Literal('\\'));
                        units.push(EscapeUnit::Literal('c'));
                        units.push(EscapeUnit::Literal(c));
                        return Ok(());
                    }
                }
            }
            'x' => match self.hex_digits(2) {
                Some(value) => char::from_u32(value).unwrap_or('\u{FFFD}'),
                None => {
                    units.push(EscapeUnit::Literal('\\'));
                    units.push(EscapeUnit::Literal('x'));
                    return Ok(());
                }
            },
            'u' => match self.hex_digits(4) {
                Some(value) => char::from_u32(value).unwrap_or('\u{FFFD}'),
                None => {
                    units.push(EscapeUnit::Literal('\\'));
                    units.push(EscapeUnit::Literal('u'));
                    return Ok(());
                }
            },
            'U' => match self.hex_digits(8) {
                Some(value) => char::from_u32(value).unwrap_or('\u{FFFD}'),
                None => {
                    units.push(EscapeUnit::Literal('\\'));
                    units.push(EscapeUnit::Literal('U'));
                    return Ok(());
                }
            },
            '0'..='7' => {
                // Up to three octal digits, the first already consumed
                let mut value = c.to_digit(8).unwrap();
                for _ in 0..2 {
                    match self.peek_char().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            self.next_char();
                            value = value * 8 + digit;
                        }
                        None => break,
                    }
                }
                char::from_u32(value & 0xFF).unwrap_or('\u{FFFD}')
            }
            // Unknown escapes keep the backslash
            other => {
                units.push(EscapeUnit::Literal('\\'));
                units.push(EscapeUnit::Literal(other));
                return Ok(());
            }
        };
        units.push(EscapeUnit::Escaped(escaped));
        Ok(())
    }

    /// Consumes up to `max` hex digits and returns their value.
    fn hex_digits(&mut self, max: usize) -> Option<u32> {
        let mut value = 0;
        let mut count = 0;
        while count < max {
            match self.peek_char().and_then(|c| c.to_digit(16)) {
                Some(digit) => {
                    self.next_char();
                    value = value * 16 + digit;
                    count += 1;
                }
                None => break,
            }
        }
        (count > 0).then_some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;
    use assert_matches::assert_matches;

    fn parse(input: &str) -> EscapedString {
        let unit = Lexer::with_source(input, Source::Unknown)
            .dollar_single_quote()
            .unwrap();
        assert_matches!(unit, WordUnit::DollarSingleQuote(string) => string)
    }

    fn value(input: &str) -> String {
        parse(input).0.iter().map(|unit| unit.char_value()).collect()
    }

    #[test]
    fn common_escapes() {
        assert_eq!(value(r"$'a\tb\n'"), "a\tb\n");
        assert_eq!(value(r"$'\\'"), "\\");
        assert_eq!(value(r"$'\''"), "'");
    }

    #[test]
    fn numeric_escapes() {
        assert_eq!(value(r"$'\101'"), "A");
        assert_eq!(value(r"$'\x41'"), "A");
        assert_eq!(value(r"$'A'"), "A");
    }

    #[test]
    fn control_escape() {
        assert_eq!(value(r"$'\cA'"), "\u{1}");
    }

    #[test]
    fn unknown_escape_keeps_backslash() {
        assert_eq!(value(r"$'\q'"), "\\q");
    }

    #[test]
    fn unclosed() {
        let error = Lexer::with_source("$'abc", Source::Unknown)
            .dollar_single_quote()
            .unwrap_err();
        assert_eq!(error.cause, SyntaxError::UnclosedDollarSingleQuote);
    }
}
