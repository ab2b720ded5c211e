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

//! Lexing of braced parameter expansions (`${…}`)

use super::core::Lexer;
use crate::parser::error::{Error, SyntaxError};
use crate::syntax::*;

impl Lexer {
    /// Parses a braced parameter expansion.
    ///
    /// `start` is the index of the `$`; the `${` has been consumed.
    pub fn braced_param(&mut self, start: usize) -> Result<BracedParam, Error> {
        let unclosed = |lexer: &Lexer| lexer.error(SyntaxError::UnclosedParam, start..start + 2);

        // `#` and `!` are prefix operators unless they are the parameter
        // themselves, as in `${#}` and `${!}`
        let prefix = match self.peek_char() {
            Some(c @ ('#' | '!')) if self.peek_char_at(1) != Some('}') => {
                self.next_char();
                Some(c)
            }
            _ => None,
        };

        let Some(id) = self.param_id() else {
            return Err(self.error(SyntaxError::EmptyParam, start..start + 2));
        };
        let param = Param::from_id(id);

        let mut subscript = None;
        if self.peek_char() == Some('[') && param.r#type == ParamType::Variable {
            subscript = Some(self.subscript(start)?);
        }

        let modifier = match prefix {
            Some('#') => {
                // Length takes no further modifier
                Modifier::Length
            }
            Some('!') => match self.peek_char() {
                Some('*' | '@') if self.peek_char_at(1) == Some('}') => {
                    self.next_char();
                    Modifier::Names
                }
                _ if matches!(subscript, Some(Subscript::At | Subscript::Star)) => Modifier::Keys,
                _ => Modifier::Indirect,
            },
            _ => self.param_modifier(start)?,
        };

        if !self.next_if_char('}') {
            return Err(unclosed(self));
        }
        let location = self.location(start..self.index());
        Ok(BracedParam {
            param,
            subscript,
            modifier,
            location,
        })
    }

    /// Parses the raw parameter identifier inside `${…}`.
    ///
    /// Unlike `$1`, a braced positional parameter may have several digits.
    fn param_id(&mut self) -> Option<String> {
        match self.peek_char()? {
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut id = String::new();
                while let Some(c) = self.peek_char() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        id.push(c);
                        self.next_char();
                    } else {
                        break;
                    }
                }
                Some(id)
            }
            c if c.is_ascii_digit() => {
                let mut id = String::new();
                while let Some(c) = self.peek_char() {
                    if c.is_ascii_digit() {
                        id.push(c);
                        self.next_char();
                    } else {
                        break;
                    }
                }
                Some(id)
            }
            c if SpecialParam::from_char(c).is_some() => {
                self.next_char();
                Some(c.to_string())
            }
            _ => None,
        }
    }

    /// Parses an array subscript after the parameter name.
    fn subscript(&mut self, start: usize) -> Result<Subscript, Error> {
        self.next_char(); // [
        match (self.peek_char(), self.peek_char_at(1)) {
            (Some('@'), Some(']')) => {
                self.next_char();
                self.next_char();
                return Ok(Subscript::At);
            }
            (Some('*'), Some(']')) => {
                self.next_char();
                self.next_char();
                return Ok(Subscript::Star);
            }
            _ => {}
        }
        let mut units = Vec::new();
        let mut depth = 0u32;
        loop {
            self.skip_line_continuations();
            let Some(c) = self.peek_char() else {
                return Err(self.error(SyntaxError::UnclosedParam, start..start + 2));
            };
            match c {
                '[' => {
                    depth += 1;
                    self.next_char();
                    units.push(Literal('['));
                }
                ']' => {
                    if depth == 0 {
                        self.next_char();
                        return Ok(Subscript::Index(Text(units)));
                    }
                    depth -= 1;
                    self.next_char();
                    units.push(Literal(']'));
                }
                '$' => match self.text_dollar_unit()? {
                    Some(unit) => units.push(unit),
                    None => {
                        self.next_char();
                        units.push(Literal('$'));
                    }
                },
                _ => {
                    self.next_char();
                    units.push(Literal(c));
                }
            }
        }
    }

    /// Parses the modifier that follows the parameter (and subscript).
    fn param_modifier(&mut self, start: usize) -> Result<Modifier, Error> {
        let Some(c) = self.peek_char() else {
            return Err(self.error(SyntaxError::UnclosedParam, start..start + 2));
        };
        match c {
            '}' => Ok(Modifier::None),

            ':' => match self.peek_char_at(1) {
                Some(t @ ('-' | '=' | '?' | '+')) => {
                    self.next_char();
                    self.next_char();
                    let word = self.param_word(&['}'])?;
                    Ok(Modifier::Switch(Switch {
                        r#type: switch_type(t),
                        condition: SwitchCondition::UnsetOrEmpty,
                        word,
                    }))
                }
                _ => {
                    self.next_char();
                    let offset = self.slice_text(start)?;
                    let length = if self.next_if_char(':') {
                        Some(self.slice_text(start)?)
                    } else {
                        None
                    };
                    Ok(Modifier::Slice(Slice { offset, length }))
                }
            },

            '-' | '=' | '?' | '+' => {
                self.next_char();
                let word = self.param_word(&['}'])?;
                Ok(Modifier::Switch(Switch {
                    r#type: switch_type(c),
                    condition: SwitchCondition::Unset,
                    word,
                }))
            }

            '#' | '%' => {
                self.next_char();
                let length = if self.next_if_char(c) {
                    TrimLength::Longest
                } else {
                    TrimLength::Shortest
                };
                let side = if c == '#' {
                    TrimSide::Prefix
                } else {
                    TrimSide::Suffix
                };
                let pattern = self.param_word(&['}'])?;
                Ok(Modifier::Trim(Trim {
                    side,
                    length,
                    pattern,
                }))
            }

            '/' => {
                self.next_char();
                let global = self.next_if_char('/');
                let anchor = match self.peek_char() {
                    Some('#') if !global => {
                        self.next_char();
                        Some(SubstAnchor::Front)
                    }
                    Some('%') if !global => {
                        self.next_char();
                        Some(SubstAnchor::Back)
                    }
                    _ => None,
                };
                let pattern = self.param_word(&['/', '}'])?;
                let replacement = if self.next_if_char('/') {
                    Some(self.param_word(&['}'])?)
                } else {
                    None
                };
                Ok(Modifier::Subst(Subst {
                    pattern,
                    replacement,
                    anchor,
                    global,
                }))
            }

            '^' | ',' => {
                self.next_char();
                let all = self.next_if_char(c);
                let direction = if c == '^' {
                    CaseDirection::Upper
                } else {
                    CaseDirection::Lower
                };
                let pattern = if self.peek_char() == Some('}') {
                    None
                } else {
                    Some(self.param_word(&['}'])?)
                };
                Ok(Modifier::Case(CaseConv {
                    direction,
                    all,
                    pattern,
                }))
            }

            _ => {
                let index = self.index();
                Err(self.error(SyntaxError::InvalidModifier, index..index + 1))
            }
        }
    }

    /// Parses a word inside `${…}` up to an unquoted stop character.
    ///
    /// The stop character is not consumed.
    fn param_word(&mut self, stop: &[char]) -> Result<Word, Error> {
        let start = self.index();
        let units = self.word_units(|c| stop.contains(&c))?;
        let location = self.location(start..self.index());
        Ok(Word { units, location })
    }

    /// Parses an arithmetic text inside a slice modifier, up to an
    /// unnested `:` or the closing `}`.
    fn slice_text(&mut self, start: usize) -> Result<Text, Error> {
        let mut units = Vec::new();
        let mut depth = 0u32;
        loop {
            self.skip_line_continuations();
            let Some(c) = self.peek_char() else {
                return Err(self.error(SyntaxError::UnclosedParam, start..start + 2));
            };
            match c {
                '}' | ':' if depth == 0 => return Ok(Text(units)),
                '(' => {
                    depth += 1;
                    self.next_char();
                    units.push(Literal('('));
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    self.next_char();
                    units.push(Literal(')'));
                }
                '$' => match self.text_dollar_unit()? {
                    Some(unit) => units.push(unit),
                    None => {
                        self.next_char();
                        units.push(Literal('$'));
                    }
                },
                _ => {
                    self.next_char();
                    units.push(Literal(c));
                }
            }
        }
    }
}

fn switch_type(c: char) -> SwitchType {
    match c {
        '+' => SwitchType::Alter,
        '-' => SwitchType::Default,
        '=' => SwitchType::Assign,
        _ => SwitchType::Error,
    }
}
