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

//! Parsing of commands: dispatch, simple commands, function definitions

use super::core::Parser;
use super::error::{Error, SyntaxError};
use super::lex::tilde::parse_tilde_everywhere;
use super::lex::{Keyword, Operator, TokenId};
use crate::syntax::*;
use std::rc::Rc;

/// Splits an assignment word into its parts.
///
/// Returns the word unchanged when it is not a valid assignment: the name
/// must be a literal identifier, optionally followed by a literal
/// subscript in brackets, then `=` or `+=`.
fn assign_from_word(word: Word) -> Result<Assign, Word> {
    /// Scans the unit list and returns
    /// `(name, subscript_range, append, value_start)`.
    fn scan(units: &[WordUnit]) -> Option<(String, Option<std::ops::Range<usize>>, bool, usize)> {
        let mut index = 0;

        let mut name = String::new();
        while let Some(Unquoted(Literal(c))) = units.get(index) {
            if c.is_ascii_alphanumeric() || *c == '_' {
                name.push(*c);
                index += 1;
            } else {
                break;
            }
        }
        if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }

        let mut subscript = None;
        if units.get(index) == Some(&Unquoted(Literal('['))) {
            let open = index + 1;
            index += 1;
            let mut depth = 0u32;
            loop {
                match units.get(index) {
                    Some(Unquoted(Literal('['))) => depth += 1,
                    Some(Unquoted(Literal(']'))) => {
                        if depth == 0 {
                            break;
                        }
                        depth -= 1;
                    }
                    Some(_) => {}
                    None => return None,
                }
                index += 1;
            }
            subscript = Some(open..index);
            index += 1;
        }

        let append = units.get(index) == Some(&Unquoted(Literal('+')));
        if append {
            index += 1;
        }
        if units.get(index) != Some(&Unquoted(Literal('='))) {
            return None;
        }
        Some((name, subscript, append, index + 1))
    }

    let Some((name, subscript_range, append, value_start)) = scan(&word.units) else {
        return Err(word);
    };
    let subscript = subscript_range.map(|range| Word {
        units: word.units[range].to_vec(),
        location: word.location.clone(),
    });
    let value = Word {
        units: word.units[value_start..].to_vec(),
        location: word.location.clone(),
    };
    let value = parse_tilde_everywhere(value);
    Ok(Assign {
        name,
        subscript,
        append,
        value: Scalar(value),
        location: word.location,
    })
}

/// Returns true if the assignment value is an empty scalar, making an
/// immediately following `(` start an array literal.
fn has_empty_value(assign: &Assign) -> bool {
    matches!(&assign.value, Scalar(word) if word.units.is_empty())
}

impl Parser<'_> {
    /// Parses one command of a pipeline.
    pub fn command(&mut self) -> Result<Command, Error> {
        use Keyword::*;
        match self.peek()?.id {
            TokenId::EndOfInput => Err(self.error_at_peek(SyntaxError::EmptyCommandList)?),
            TokenId::Token(Some(
                If | While | Until | For | Case | Select | OpenBrace | OpenBracketBracket,
            )) => Ok(Command::Compound(self.full_compound_command()?)),
            TokenId::Token(Some(Function)) => self.function_definition_keyword(),
            TokenId::Token(Some(keyword)) if keyword.is_clause_delimiter() || keyword == Bang => {
                Err(self.error_at_peek(SyntaxError::InvalidCommandToken)?)
            }
            TokenId::Operator(Operator::OpenParen) => {
                Ok(Command::Compound(self.full_compound_command()?))
            }
            TokenId::Operator(operator) if !redirection_operator(operator) => {
                Err(self.error_at_peek(SyntaxError::InvalidCommandToken)?)
            }
            _ => self.simple_command(),
        }
    }

    /// Parses a simple command, or a `name()` function definition.
    fn simple_command(&mut self) -> Result<Command, Error> {
        let mut assigns = Vec::new();
        let mut words: Vec<Word> = Vec::new();
        let mut redirs = Vec::new();

        loop {
            if let Some(redir) = self.maybe_redir()? {
                redirs.push(redir);
                continue;
            }

            // `name ( )` starts a function definition
            if words.len() == 1
                && assigns.is_empty()
                && redirs.is_empty()
                && self.peek_operator()? == Some(Operator::OpenParen)
            {
                let name = words.pop().unwrap();
                return self.function_definition_paren(name);
            }

            if !matches!(self.peek()?.id, TokenId::Token(_)) {
                break;
            }

            if self.alias_chain {
                self.alias_chain = false;
                if self.maybe_substitute_alias()? {
                    continue;
                }
            }

            let token = self.take()?;
            if words.is_empty() {
                match assign_from_word(token.word) {
                    Ok(mut assign) => {
                        if has_empty_value(&assign)
                            && self.queue_is_empty()
                            && self.lexer().peek_char() == Some('(')
                        {
                            assign.value = Array(self.array_values()?);
                        }
                        assigns.push(assign);
                    }
                    Err(word) => words.push(word),
                }
            } else {
                words.push(token.word);
            }
        }

        if assigns.is_empty() && words.is_empty() && redirs.is_empty() {
            return Err(self.error_at_peek(SyntaxError::InvalidCommandToken)?);
        }
        Ok(Command::Simple(SimpleCommand {
            assigns,
            words,
            redirs: Rc::new(redirs),
        }))
    }

    /// Parses the words of an array assignment value, after the `(`.
    fn array_values(&mut self) -> Result<Vec<Word>, Error> {
        let opening = self.lexer().index();
        self.lexer().next_char();
        let mut values = Vec::new();
        loop {
            let token = self.lexer().token()?;
            match token.id {
                TokenId::Operator(Operator::Newline) => continue,
                TokenId::Operator(Operator::CloseParen) => return Ok(values),
                TokenId::Token(_) => values.push(token.word),
                _ => {
                    let location = self.lexer().location(opening..opening + 1);
                    return Err(Error {
                        cause: SyntaxError::UnclosedArrayValue,
                        location,
                    });
                }
            }
        }
    }

    /// Parses a function definition of the form `name() body`.
    ///
    /// The name word has been consumed; the next token is the `(`.
    fn function_definition_paren(&mut self, name: Word) -> Result<Command, Error> {
        if name.to_string_if_literal().is_none() {
            return Err(Error {
                cause: SyntaxError::InvalidFunctionName,
                location: name.location,
            });
        }
        self.take()?; // (
        if !self.take_if_operator(Operator::CloseParen)? {
            return Err(self.error_at_peek(SyntaxError::InvalidFunctionName)?);
        }
        self.skip_newlines()?;
        let body = self.function_body()?;
        Ok(Command::Function(FunctionDefinition {
            has_keyword: false,
            name,
            body: Rc::new(body),
        }))
    }

    /// Parses a function definition of the form `function name [()] body`.
    fn function_definition_keyword(&mut self) -> Result<Command, Error> {
        self.take()?; // function
        let token = self.peek()?;
        if !matches!(token.id, TokenId::Token(_)) {
            return Err(self.error_at_peek(SyntaxError::InvalidFunctionName)?);
        }
        let name = self.take()?.word;
        if self.take_if_operator(Operator::OpenParen)? {
            if !self.take_if_operator(Operator::CloseParen)? {
                return Err(self.error_at_peek(SyntaxError::InvalidFunctionName)?);
            }
        }
        self.skip_newlines()?;
        let body = self.function_body()?;
        Ok(Command::Function(FunctionDefinition {
            has_keyword: true,
            name,
            body: Rc::new(body),
        }))
    }

    fn function_body(&mut self) -> Result<FullCompoundCommand, Error> {
        use Keyword::*;
        match self.peek()?.id {
            TokenId::Token(Some(
                If | While | Until | For | Case | Select | OpenBrace | OpenBracketBracket,
            ))
            | TokenId::Operator(Operator::OpenParen) => self.full_compound_command(),
            _ => Err(self.error_at_peek(SyntaxError::InvalidFunctionBody)?),
        }
    }
}

/// Returns true for operators that begin a redirection.
pub(super) fn redirection_operator(operator: Operator) -> bool {
    use Operator::*;
    matches!(
        operator,
        Less | LessAnd
            | LessLess
            | LessLessDash
            | LessLessLess
            | LessGreater
            | Greater
            | GreaterAnd
            | GreaterGreater
            | GreaterBar
            | AndGreater
            | AndGreaterGreater
    )
}

#[cfg(test)]
mod tests {
    use super::super::lex::Lexer;
    use super::super::parse_program;
    use crate::alias::AliasSet;
    use crate::source::Source;
    use crate::syntax::*;
    use assert_matches::assert_matches;
    use std::rc::Rc;

    fn parse_command(input: &str) -> Command {
        let mut lexer = Lexer::with_source(input, Source::Unknown);
        let list = parse_program(&mut lexer, &AliasSet::new()).unwrap();
        assert_eq!(list.0.len(), 1, "input: {input:?}");
        Rc::try_unwrap(Rc::clone(&list.0[0].and_or.first.commands[0]))
            .unwrap_or_else(|rc| (*rc).clone())
    }

    #[test]
    fn words_and_arguments() {
        assert_matches!(parse_command("echo a b"), Command::Simple(simple) => {
            assert_eq!(simple.words.len(), 3);
            assert!(simple.assigns.is_empty());
        });
    }

    #[test]
    fn assignments_before_command() {
        assert_matches!(parse_command("a=1 b=2 cmd"), Command::Simple(simple) => {
            assert_eq!(simple.assigns.len(), 2);
            assert_eq!(simple.assigns[0].name, "a");
            assert_eq!(simple.assigns[1].name, "b");
            assert_eq!(simple.words.len(), 1);
        });
    }

    #[test]
    fn assignment_after_command_word_is_an_argument() {
        assert_matches!(parse_command("cmd a=1"), Command::Simple(simple) => {
            assert!(simple.assigns.is_empty());
            assert_eq!(simple.words.len(), 2);
        });
    }

    #[test]
    fn append_assignment() {
        assert_matches!(parse_command("a+=x"), Command::Simple(simple) => {
            assert!(simple.assigns[0].append);
        });
    }

    #[test]
    fn subscript_assignment() {
        assert_matches!(parse_command("a[i+1]=x"), Command::Simple(simple) => {
            let assign = &simple.assigns[0];
            assert_eq!(assign.name, "a");
            assert_eq!(assign.subscript.as_ref().unwrap().to_string(), "i+1");
        });
    }

    #[test]
    fn array_assignment() {
        assert_matches!(parse_command("a=(1 'x y' 3)"), Command::Simple(simple) => {
            assert_matches!(&simple.assigns[0].value, Array(words) => {
                assert_eq!(words.len(), 3);
            });
        });
    }

    #[test]
    fn empty_array_assignment() {
        assert_matches!(parse_command("a=()"), Command::Simple(simple) => {
            assert_matches!(&simple.assigns[0].value, Array(words) => {
                assert!(words.is_empty());
            });
        });
    }

    #[test]
    fn array_assignment_spanning_lines() {
        assert_matches!(parse_command("a=(1\n2)"), Command::Simple(simple) => {
            assert_matches!(&simple.assigns[0].value, Array(words) => {
                assert_eq!(words.len(), 2);
            });
        });
    }

    #[test]
    fn invalid_assignment_is_a_word() {
        assert_matches!(parse_command("1x=2"), Command::Simple(simple) => {
            assert!(simple.assigns.is_empty());
            assert_eq!(simple.words.len(), 1);
        });
    }

    #[test]
    fn function_definition_paren_form() {
        assert_matches!(parse_command("f() { echo hi; }"), Command::Function(def) => {
            assert!(!def.has_keyword);
            assert_eq!(def.name.to_string(), "f");
            assert_matches!(def.body.command, CompoundCommand::Grouping(_));
        });
    }

    #[test]
    fn function_definition_keyword_form() {
        assert_matches!(parse_command("function f { echo hi; }"), Command::Function(def) => {
            assert!(def.has_keyword);
        });
        assert_matches!(parse_command("function g() ( : )"), Command::Function(def) => {
            assert_matches!(def.body.command, CompoundCommand::Subshell { .. });
        });
    }

    #[test]
    fn keywords_as_arguments_are_words() {
        assert_matches!(parse_command("echo if done"), Command::Simple(simple) => {
            assert_eq!(simple.words.len(), 3);
        });
    }

    #[test]
    fn redirections_mixed_with_words() {
        assert_matches!(parse_command("a >out b <in"), Command::Simple(simple) => {
            assert_eq!(simple.words.len(), 2);
            assert_eq!(simple.redirs.len(), 2);
        });
    }
}
