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

//! Parsing of lists, and-or lists, and pipelines

use super::core::Parser;
use super::error::Error;
use super::lex::{Keyword, Operator, TokenId};
use crate::syntax::{AndOr, AndOrList, Item, List, Pipeline};
use std::rc::Rc;

impl Parser<'_> {
    /// Returns true if the next token ends a command list rather than
    /// starting a command.
    fn at_list_end(&mut self) -> Result<bool, Error> {
        Ok(match self.peek()?.id {
            TokenId::EndOfInput => true,
            TokenId::Operator(
                Operator::CloseParen
                | Operator::SemicolonSemicolon
                | Operator::SemicolonAnd
                | Operator::SemicolonSemicolonAnd,
            ) => true,
            TokenId::Token(Some(keyword)) => keyword.is_clause_delimiter(),
            _ => false,
        })
    }

    /// Parses a possibly empty sequence of and-or lists.
    ///
    /// Parsing stops before a token that cannot start a command; the
    /// caller validates that token. Newlines between commands are
    /// consumed, which also collects pending here-document contents.
    pub fn command_list(&mut self) -> Result<List, Error> {
        let mut items = Vec::new();
        loop {
            self.skip_newlines()?;
            while self.maybe_substitute_alias()? {}
            if self.at_list_end()? {
                return Ok(List(items));
            }

            let and_or = Rc::new(self.and_or_list()?);
            let mut async_flag = None;
            match self.peek_operator()? {
                Some(Operator::Semicolon | Operator::Newline) => {
                    self.take()?;
                }
                Some(Operator::And) => {
                    let token = self.take()?;
                    async_flag = Some(token.word.location);
                }
                _ => {
                    // A newline, a list terminator, or an error the caller
                    // will report
                    items.push(Item {
                        and_or,
                        async_flag: None,
                    });
                    return Ok(List(items));
                }
            }
            items.push(Item { and_or, async_flag });
        }
    }

    /// Parses an and-or list: pipelines connected with `&&` and `||`.
    pub fn and_or_list(&mut self) -> Result<AndOrList, Error> {
        let first = self.pipeline()?;
        let mut rest = Vec::new();
        loop {
            let connector = match self.peek_operator()? {
                Some(Operator::AndAnd) => AndOr::AndThen,
                Some(Operator::BarBar) => AndOr::OrElse,
                _ => return Ok(AndOrList { first, rest }),
            };
            self.take()?;
            self.skip_newlines()?;
            rest.push((connector, self.pipeline()?));
        }
    }

    /// Parses a pipeline: commands connected with `|`, with an optional
    /// leading `!`.
    pub fn pipeline(&mut self) -> Result<Pipeline, Error> {
        while self.maybe_substitute_alias()? {}
        let mut negation = false;
        while self.peek_keyword()? == Some(Keyword::Bang) {
            self.take()?;
            negation = !negation;
            while self.maybe_substitute_alias()? {}
        }

        let mut commands = vec![Rc::new(self.command()?)];
        while self.take_if_operator(Operator::Bar)? {
            self.skip_newlines()?;
            while self.maybe_substitute_alias()? {}
            commands.push(Rc::new(self.command()?));
        }
        Ok(Pipeline { commands, negation })
    }
}

#[cfg(test)]
mod tests {
    use super::super::lex::Lexer;
    use super::super::parse_program;
    use crate::alias::{AliasSet, HashEntry};
    use crate::source::{Location, Source};
    use crate::syntax::*;
    use assert_matches::assert_matches;

    fn parse(input: &str) -> List {
        let mut lexer = Lexer::with_source(input, Source::Unknown);
        parse_program(&mut lexer, &AliasSet::new()).unwrap()
    }

    #[test]
    fn empty_program() {
        assert_eq!(parse("").0.len(), 0);
        assert_eq!(parse("\n\n").0.len(), 0);
        assert_eq!(parse("  # comment\n").0.len(), 0);
    }

    #[test]
    fn semicolon_separated_items() {
        let list = parse("a; b; c");
        assert_eq!(list.0.len(), 3);
        assert!(list.0.iter().all(|item| item.async_flag.is_none()));
    }

    #[test]
    fn async_item() {
        let list = parse("a& b");
        assert_eq!(list.0.len(), 2);
        assert!(list.0[0].async_flag.is_some());
        assert!(list.0[1].async_flag.is_none());
    }

    #[test]
    fn and_or_chain() {
        let list = parse("a && b || c");
        let and_or = &list.0[0].and_or;
        assert_eq!(and_or.rest.len(), 2);
        assert_eq!(and_or.rest[0].0, AndOr::AndThen);
        assert_eq!(and_or.rest[1].0, AndOr::OrElse);
    }

    #[test]
    fn pipeline_with_negation() {
        let list = parse("! a | b");
        let pipeline = &list.0[0].and_or.first;
        assert!(pipeline.negation);
        assert_eq!(pipeline.commands.len(), 2);
    }

    #[test]
    fn newline_after_pipe_continues_pipeline() {
        let list = parse("a |\nb");
        assert_eq!(list.0[0].and_or.first.commands.len(), 2);
    }

    #[test]
    fn newline_after_and_and_continues() {
        let list = parse("a &&\n\nb");
        assert_eq!(list.0[0].and_or.rest.len(), 1);
    }

    #[test]
    fn alias_substitution_in_command_position() {
        let mut aliases = AliasSet::new();
        aliases.insert(HashEntry::new("ll", "ls -l", Location::dummy("")));
        let mut lexer = Lexer::with_source("ll /tmp", Source::Unknown);
        let list = parse_program(&mut lexer, &aliases).unwrap();
        assert_matches!(&*list.0[0].and_or.first.commands[0], Command::Simple(simple) => {
            let words: Vec<String> = simple.words.iter().map(Word::to_string).collect();
            assert_eq!(words, ["ls", "-l", "/tmp"]);
        });
    }

    #[test]
    fn recursive_alias_is_not_reexpanded() {
        let mut aliases = AliasSet::new();
        aliases.insert(HashEntry::new("ls", "ls --color", Location::dummy("")));
        let mut lexer = Lexer::with_source("ls x", Source::Unknown);
        let list = parse_program(&mut lexer, &aliases).unwrap();
        assert_matches!(&*list.0[0].and_or.first.commands[0], Command::Simple(simple) => {
            let words: Vec<String> = simple.words.iter().map(Word::to_string).collect();
            assert_eq!(words, ["ls", "--color", "x"]);
        });
    }

    #[test]
    fn alias_not_substituted_in_argument_position() {
        let mut aliases = AliasSet::new();
        aliases.insert(HashEntry::new("ll", "ls -l", Location::dummy("")));
        let mut lexer = Lexer::with_source("echo ll", Source::Unknown);
        let list = parse_program(&mut lexer, &aliases).unwrap();
        assert_matches!(&*list.0[0].and_or.first.commands[0], Command::Simple(simple) => {
            let words: Vec<String> = simple.words.iter().map(Word::to_string).collect();
            assert_eq!(words, ["echo", "ll"]);
        });
    }

    #[test]
    fn trailing_garbage_is_an_error() {
        let mut lexer = Lexer::with_source("a )", Source::Unknown);
        let error = parse_program(&mut lexer, &AliasSet::new()).unwrap_err();
        assert_eq!(error.cause, super::super::SyntaxError::MissingSeparator);
    }
}
