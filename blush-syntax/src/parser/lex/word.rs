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

//! Lexing of words and the quoting constructs inside them

use super::core::{is_blank, Lexer};
use super::op::is_operator_char;
use crate::parser::error::{Error, SyntaxError};
use crate::syntax::*;
use std::rc::Rc;

impl Lexer {
    /// Parses a word token, ending at an unquoted blank or operator
    /// character.
    pub fn word(&mut self) -> Result<Word, Error> {
        let start = self.index();
        let units = self.word_units(|c| is_blank(c) || is_operator_char(c))?;
        let location = self.location(start..self.index());
        let word = Word { units, location };
        Ok(super::tilde::parse_tilde_front(word))
    }

    /// Parses the regex operand of `=~` inside `[[ … ]]`.
    ///
    /// Bracket and parenthesis characters do not delimit the word here;
    /// only whitespace ends it.
    pub fn regex_word(&mut self) -> Result<Word, Error> {
        let start = self.index();
        let units = self.word_units(|c| c.is_whitespace())?;
        let location = self.location(start..self.index());
        Ok(Word { units, location })
    }

    /// Parses word units up to an unquoted delimiter character.
    pub fn word_units(
        &mut self,
        is_delimiter: impl Fn(char) -> bool + Copy,
    ) -> Result<Vec<WordUnit>, Error> {
        let mut units = Vec::new();
        loop {
            self.skip_line_continuations();
            let Some(c) = self.peek_char() else {
                return Ok(units);
            };

            // Process substitution begins with an operator character
            if matches!(c, '<' | '>') && self.peek_char_at(1) == Some('(') {
                units.push(self.process_subst()?);
                continue;
            }

            if is_delimiter(c) {
                return Ok(units);
            }

            match c {
                '\'' => units.push(self.single_quote()?),
                '"' => units.push(self.double_quote()?),
                '\\' => {
                    self.next_char();
                    match self.next_char() {
                        Some(escaped) => units.push(Unquoted(Backslashed(escaped))),
                        None => units.push(Unquoted(Literal('\\'))),
                    }
                }
                '$' => match self.peek_char_at(1) {
                    Some('\'') => units.push(self.dollar_single_quote()?),
                    Some('"') => {
                        // `$"…"` is plain double quoting (no localization)
                        self.next_char();
                    }
                    _ => match self.text_dollar_unit()? {
                        Some(unit) => units.push(Unquoted(unit)),
                        None => {
                            self.next_char();
                            units.push(Unquoted(Literal('$')));
                        }
                    },
                },
                '`' => units.push(Unquoted(self.backquote(false)?)),
                _ => {
                    self.next_char();
                    units.push(Unquoted(Literal(c)));
                }
            }
        }
    }

    /// Parses a single-quoted string, after the current `'`.
    fn single_quote(&mut self) -> Result<WordUnit, Error> {
        let start = self.index();
        self.next_char();
        let mut value = String::new();
        loop {
            match self.next_char() {
                Some('\'') => return Ok(SingleQuote(value)),
                Some(c) => value.push(c),
                None => {
                    return Err(self.error(
                        SyntaxError::UnclosedSingleQuote,
                        start..start + 1,
                    ))
                }
            }
        }
    }

    /// Parses a double-quoted text, after the current `"`.
    fn double_quote(&mut self) -> Result<WordUnit, Error> {
        let start = self.index();
        self.next_char();
        let text = self.double_quote_text(start)?;
        Ok(DoubleQuote(text))
    }

    /// Parses text units up to an unquoted closing `"`.
    pub fn double_quote_text(&mut self, opening_index: usize) -> Result<Text, Error> {
        let mut units = Vec::new();
        loop {
            let Some(c) = self.peek_char() else {
                return Err(self.error(
                    SyntaxError::UnclosedDoubleQuote,
                    opening_index..opening_index + 1,
                ));
            };
            match c {
                '"' => {
                    self.next_char();
                    return Ok(Text(units));
                }
                '\\' => match self.peek_char_at(1) {
                    Some('\n') => {
                        self.index_skip(2);
                    }
                    Some(escaped @ ('$' | '`' | '"' | '\\')) => {
                        self.index_skip(2);
                        units.push(Backslashed(escaped));
                    }
                    _ => {
                        self.next_char();
                        units.push(Literal('\\'));
                    }
                },
                '$' => match self.text_dollar_unit()? {
                    Some(unit) => units.push(unit),
                    None => {
                        self.next_char();
                        units.push(Literal('$'));
                    }
                },
                '`' => units.push(self.backquote(true)?),
                _ => {
                    self.next_char();
                    units.push(Literal(c));
                }
            }
        }
    }

    /// Advances the position by `count` characters.
    fn index_skip(&mut self, count: usize) {
        for _ in 0..count {
            self.next_char();
        }
    }

    /// Parses a backquoted command substitution, after the current `` ` ``.
    ///
    /// Inside backquotes, a backslash retains its meaning only before
    /// `$`, `` ` ``, `\`, and (inside double quotes) `"`.
    pub fn backquote(&mut self, in_double_quotes: bool) -> Result<TextUnit, Error> {
        let start = self.index();
        self.next_char();
        let mut content = Vec::new();
        loop {
            match self.next_char() {
                Some('`') => {
                    let location = self.location(start..self.index());
                    return Ok(Backquote { content, location });
                }
                Some('\\') => match self.peek_char() {
                    Some(c @ ('$' | '`' | '\\')) => {
                        self.next_char();
                        content.push(BackquoteUnit::Backslashed(c));
                    }
                    Some('"') if in_double_quotes => {
                        self.next_char();
                        content.push(BackquoteUnit::Backslashed('"'));
                    }
                    _ => content.push(BackquoteUnit::Literal('\\')),
                },
                Some(c) => content.push(BackquoteUnit::Literal(c)),
                None => {
                    return Err(self.error(SyntaxError::UnclosedBackquote, start..start + 1))
                }
            }
        }
    }

    /// Parses a process substitution `<(…)` or `>(…)`.
    fn process_subst(&mut self) -> Result<WordUnit, Error> {
        let start = self.index();
        let direction = match self.next_char() {
            Some('<') => SubstDirection::In,
            _ => SubstDirection::Out,
        };
        self.next_char(); // (
        let content = self.raw_command(start, ')')?;
        let location = self.location(start..self.index());
        Ok(ProcessSubst {
            direction,
            content: Rc::from(content),
            location,
        })
    }

    /// Reads raw command text up to an unnested `close` character.
    ///
    /// The scan is quote-aware: delimiters inside single quotes, double
    /// quotes, or backslash escapes do not count. The closing character is
    /// consumed but not included in the result.
    pub fn raw_command(&mut self, opening_index: usize, close: char) -> Result<String, Error> {
        let mut content = String::new();
        let mut depth = 0u32;
        let mut single = false;
        let mut double = false;
        loop {
            let Some(c) = self.next_char() else {
                let cause = if close == ')' {
                    SyntaxError::UnclosedCommandSubstitution
                } else {
                    SyntaxError::UnclosedGrouping
                };
                return Err(self.error(cause, opening_index..opening_index + 1));
            };
            match c {
                '\\' if !single => {
                    content.push(c);
                    if let Some(next) = self.next_char() {
                        content.push(next);
                    }
                    continue;
                }
                '\'' if !double => single = !single,
                '"' if !single => double = !double,
                '(' if !single && !double => depth += 1,
                ')' if !single && !double && close == ')' => {
                    if depth == 0 {
                        return Ok(content);
                    }
                    depth -= 1;
                }
                _ => {}
            }
            content.push(c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;
    use assert_matches::assert_matches;

    fn parse_word(input: &str) -> Word {
        Lexer::with_source(input, Source::Unknown).word().unwrap()
    }

    #[test]
    fn plain_word() {
        let word = parse_word("hello");
        assert_eq!(word.to_string_if_literal().unwrap(), "hello");
        assert_eq!(word.location.range, 0..5);
    }

    #[test]
    fn word_stops_at_blank_and_operator() {
        assert_eq!(parse_word("a b").to_string(), "a");
        assert_eq!(parse_word("a|b").to_string(), "a");
        assert_eq!(parse_word("a;b").to_string(), "a");
    }

    #[test]
    fn single_quotes() {
        let word = parse_word("'a b$x'");
        assert_eq!(word.units, [SingleQuote("a b$x".to_owned())]);
    }

    #[test]
    fn unclosed_single_quote() {
        let error = Lexer::with_source("'abc", Source::Unknown)
            .word()
            .unwrap_err();
        assert_eq!(error.cause, SyntaxError::UnclosedSingleQuote);
    }

    #[test]
    fn double_quotes_with_literal_content() {
        let word = parse_word("\"a b\"");
        assert_matches!(&word.units[..], [DoubleQuote(Text(units))] => {
            assert_eq!(units, &[Literal('a'), Literal(' '), Literal('b')]);
        });
    }

    #[test]
    fn double_quote_escapes() {
        let word = parse_word(r#""a\$b\x""#);
        assert_matches!(&word.units[..], [DoubleQuote(Text(units))] => {
            assert_eq!(
                units,
                &[
                    Literal('a'),
                    Backslashed('$'),
                    Literal('b'),
                    Literal('\\'),
                    Literal('x'),
                ]
            );
        });
    }

    #[test]
    fn composite_word_glues_fragments() {
        let word = parse_word("pre'mid'post");
        assert_eq!(word.units.len(), 8);
        assert_eq!(word.units[3], SingleQuote("mid".to_owned()));
        assert_eq!(word.to_string(), "pre'mid'post");
    }

    #[test]
    fn backslash_escapes_next_char() {
        let word = parse_word(r"a\ b");
        assert_eq!(
            word.units,
            [
                Unquoted(Literal('a')),
                Unquoted(Backslashed(' ')),
                Unquoted(Literal('b')),
            ]
        );
    }

    #[test]
    fn raw_parameter_in_word() {
        let word = parse_word("$foo/");
        assert_matches!(&word.units[..], [Unquoted(RawParam { param, .. }), Unquoted(Literal('/'))] => {
            assert_eq!(param.id, "foo");
        });
    }

    #[test]
    fn backquote_in_word() {
        let word = parse_word("`echo \\`x`");
        assert_matches!(&word.units[..], [Unquoted(Backquote { content, .. })] => {
            assert!(content.contains(&BackquoteUnit::Backslashed('`')));
        });
    }

    #[test]
    fn process_substitution() {
        let word = parse_word("<(echo hi)");
        assert_matches!(&word.units[..], [ProcessSubst { direction, content, .. }] => {
            assert_eq!(*direction, SubstDirection::In);
            assert_eq!(&**content, "echo hi");
        });
    }

    #[test]
    fn command_substitution_with_nested_quotes() {
        let word = parse_word(r#""$(echo "x")""#);
        assert_matches!(&word.units[..], [DoubleQuote(Text(units))] => {
            assert_matches!(&units[..], [CommandSubst { content, .. }] => {
                assert_eq!(&**content, "echo \"x\"");
            });
        });
    }

    #[test]
    fn dollar_double_quote_is_plain_double_quote() {
        let word = parse_word("$\"hi\"");
        assert_matches!(&word.units[..], [DoubleQuote(_)]);
    }

    #[test]
    fn regex_word_keeps_brackets_and_parens() {
        let mut lexer = Lexer::with_source("^(a|b)[0-9]+$ ]]", Source::Unknown);
        let word = lexer.regex_word().unwrap();
        assert_eq!(word.to_string_if_literal().unwrap(), "^(a|b)[0-9]+$");
    }
}
