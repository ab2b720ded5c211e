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

//! Lexing of dollar-prefixed expansions

use super::core::Lexer;
use crate::parser::error::{Error, SyntaxError};
use crate::syntax::*;
use std::rc::Rc;

impl Lexer {
    /// Parses an expansion starting at the current `$` character.
    ///
    /// Returns `None` if the `$` does not start an expansion, in which
    /// case the position is not changed and the caller treats the `$` as a
    /// literal. `$'…'` and `$"…"` are word-level constructs handled by the
    /// caller, not here.
    pub fn text_dollar_unit(&mut self) -> Result<Option<TextUnit>, Error> {
        debug_assert_eq!(self.peek_char(), Some('$'));
        let start = self.index();
        match self.peek_char_at(1) {
            Some('{') => {
                self.next_char();
                self.next_char();
                let param = self.braced_param(start)?;
                Ok(Some(TextUnit::BracedParam(param)))
            }
            Some('(') => {
                self.next_char();
                self.next_char();
                if self.peek_char() == Some('(') {
                    // Tentatively parse `$((…))` as arithmetic; fall back
                    // to a command substitution holding a subshell when no
                    // matching `))` closes it
                    let reset = self.index();
                    self.next_char();
                    if let Some(content) = self.arith_text(start)? {
                        let location = self.location(start..self.index());
                        return Ok(Some(Arith { content, location }));
                    }
                    self.rewind(reset);
                }
                let content = self.raw_command(start, ')')?;
                let location = self.location(start..self.index());
                Ok(Some(CommandSubst {
                    content: Rc::from(content),
                    location,
                }))
            }
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                self.next_char();
                let mut id = String::new();
                while let Some(c) = self.peek_char() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        id.push(c);
                        self.next_char();
                    } else {
                        break;
                    }
                }
                Ok(Some(self.raw_param(id, start)))
            }
            Some(c) if c.is_ascii_digit() => {
                // Only one digit: `$10` is `${1}0`
                self.next_char();
                self.next_char();
                Ok(Some(self.raw_param(c.to_string(), start)))
            }
            Some(c) if SpecialParam::from_char(c).is_some() => {
                self.next_char();
                self.next_char();
                Ok(Some(self.raw_param(c.to_string(), start)))
            }
            _ => Ok(None),
        }
    }

    fn raw_param(&self, id: String, start: usize) -> TextUnit {
        RawParam {
            param: Param::from_id(id),
            location: self.location(start..self.index()),
        }
    }

    /// Parses the content of an arithmetic expansion after `$((`.
    ///
    /// Returns `None` when a single unnested `)` not followed by another
    /// `)` is found, meaning the construct was a command substitution
    /// starting with a subshell.
    pub fn arith_text(&mut self, opening_index: usize) -> Result<Option<Text>, Error> {
        let mut units = Vec::new();
        let mut depth = 0u32;
        loop {
            self.skip_line_continuations();
            let Some(c) = self.peek_char() else {
                return Err(self.error(
                    SyntaxError::UnclosedArith,
                    opening_index..opening_index + 1,
                ));
            };
            match c {
                '(' => {
                    depth += 1;
                    self.next_char();
                    units.push(Literal('('));
                }
                ')' => {
                    if depth > 0 {
                        depth -= 1;
                        self.next_char();
                        units.push(Literal(')'));
                    } else if self.peek_char_at(1) == Some(')') {
                        self.next_char();
                        self.next_char();
                        return Ok(Some(Text(units)));
                    } else {
                        return Ok(None);
                    }
                }
                '$' => match self.text_dollar_unit()? {
                    Some(unit) => units.push(unit),
                    None => {
                        self.next_char();
                        units.push(Literal('$'));
                    }
                },
                '`' => units.push(self.backquote(false)?),
                _ => {
                    self.next_char();
                    units.push(Literal(c));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;
    use assert_matches::assert_matches;

    fn unit(input: &str) -> TextUnit {
        Lexer::with_source(input, Source::Unknown)
            .text_dollar_unit()
            .unwrap()
            .unwrap()
    }

    #[test]
    fn raw_param_name() {
        assert_matches!(unit("$foo_1"), RawParam { param, .. } => {
            assert_eq!(param.id, "foo_1");
        });
    }

    #[test]
    fn positional_takes_one_digit() {
        let mut lexer = Lexer::with_source("$10", Source::Unknown);
        assert_matches!(lexer.text_dollar_unit().unwrap().unwrap(), RawParam { param, .. } => {
            assert_eq!(param.r#type, ParamType::Positional(1));
        });
        assert_eq!(lexer.peek_char(), Some('0'));
    }

    #[test]
    fn special_params() {
        assert_matches!(unit("$?"), RawParam { param, .. } => {
            assert_eq!(param.r#type, ParamType::Special(SpecialParam::Question));
        });
        assert_matches!(unit("$#"), RawParam { param, .. } => {
            assert_eq!(param.r#type, ParamType::Special(SpecialParam::Number));
        });
    }

    #[test]
    fn lone_dollar_is_not_an_expansion() {
        let mut lexer = Lexer::with_source("$ x", Source::Unknown);
        assert_eq!(lexer.text_dollar_unit().unwrap(), None);
        assert_eq!(lexer.peek_char(), Some('$'));
    }

    #[test]
    fn command_substitution() {
        assert_matches!(unit("$(echo hi)"), CommandSubst { content, .. } => {
            assert_eq!(&*content, "echo hi");
        });
    }

    #[test]
    fn nested_command_substitution() {
        assert_matches!(unit("$(echo $(date))"), CommandSubst { content, .. } => {
            assert_eq!(&*content, "echo $(date)");
        });
    }

    #[test]
    fn arithmetic_expansion() {
        assert_matches!(unit("$((1 + 2))"), Arith { content, .. } => {
            assert_eq!(content.to_string(), "1 + 2");
        });
    }

    #[test]
    fn arithmetic_with_nested_parens() {
        assert_matches!(unit("$(((1 + 2) * 3))"), Arith { content, .. } => {
            assert_eq!(content.to_string(), "(1 + 2) * 3");
        });
    }

    #[test]
    fn subshell_command_substitution_fallback() {
        assert_matches!(unit("$( (echo a) )"), CommandSubst { content, .. } => {
            assert_eq!(&*content, " (echo a) ");
        });
    }

    #[test]
    fn arith_containing_expansion() {
        assert_matches!(unit("$((x + $y))"), Arith { content, .. } => {
            assert_matches!(&content.0[..], [Literal('x'), Literal(' '), Literal('+'), Literal(' '), RawParam { param, .. }] => {
                assert_eq!(param.id, "y");
            });
        });
    }

    #[test]
    fn unclosed_command_substitution() {
        let mut lexer = Lexer::with_source("$(echo", Source::Unknown);
        let error = lexer.text_dollar_unit().unwrap_err();
        assert_eq!(error.cause, SyntaxError::UnclosedCommandSubstitution);
        assert!(error.cause.is_incomplete());
    }
}
