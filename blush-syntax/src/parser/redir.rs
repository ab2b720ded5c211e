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

//! Parsing of redirections

use super::command::redirection_operator;
use super::core::Parser;
use super::error::{Error, SyntaxError};
use super::lex::{Operator, TokenId};
use crate::syntax::*;
use std::cell::OnceCell;
use std::rc::Rc;

impl Parser<'_> {
    /// Parses a redirection if the next token starts one.
    pub fn maybe_redir(&mut self) -> Result<Option<Redir>, Error> {
        let fd = match self.peek()?.id {
            TokenId::IoNumber(raw) => {
                self.take()?;
                Some(Fd(raw))
            }
            TokenId::Operator(operator) if redirection_operator(operator) => None,
            _ => return Ok(None),
        };

        let Some(operator) = self.peek_operator()? else {
            // An IO_NUMBER is only produced directly before an operator
            return Err(self.error_at_peek(SyntaxError::MissingRedirOperand)?);
        };

        let body = match operator {
            Operator::LessLess | Operator::LessLessDash => {
                self.take()?;
                let remove_tabs = operator == Operator::LessLessDash;
                let token = self.peek()?;
                if !matches!(token.id, TokenId::Token(_)) || token.word.units.is_empty() {
                    return Err(self.error_at_peek(SyntaxError::MissingHereDocDelimiter)?);
                }
                let delimiter = self.take()?.word;
                let here_doc = Rc::new(HereDoc {
                    delimiter,
                    remove_tabs,
                    content: OnceCell::new(),
                });
                self.register_heredoc(Rc::clone(&here_doc));
                RedirBody::HereDoc(here_doc)
            }
            _ => {
                let operator = match operator {
                    Operator::Less => RedirOp::FileIn,
                    Operator::LessGreater => RedirOp::FileInOut,
                    Operator::Greater => RedirOp::FileOut,
                    Operator::GreaterGreater => RedirOp::FileAppend,
                    Operator::GreaterBar => RedirOp::FileClobber,
                    Operator::LessAnd => RedirOp::FdIn,
                    Operator::GreaterAnd => RedirOp::FdOut,
                    Operator::LessLessLess => RedirOp::HereString,
                    Operator::AndGreater => RedirOp::OutErr,
                    Operator::AndGreaterGreater => RedirOp::AppendOutErr,
                    _ => return Err(self.error_at_peek(SyntaxError::MissingRedirOperand)?),
                };
                self.take()?;
                let token = self.peek()?;
                if !matches!(token.id, TokenId::Token(_)) || token.word.units.is_empty() {
                    return Err(self.error_at_peek(SyntaxError::MissingRedirOperand)?);
                }
                let operand = self.take()?.word;
                RedirBody::Normal { operator, operand }
            }
        };
        Ok(Some(Redir { fd, body }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::lex::Lexer;
    use super::super::parse_program;
    use crate::alias::AliasSet;
    use crate::source::Source;
    use crate::syntax::*;
    use assert_matches::assert_matches;

    fn parse_redirs(input: &str) -> Vec<Redir> {
        let mut lexer = Lexer::with_source(input, Source::Unknown);
        let list = parse_program(&mut lexer, &AliasSet::new()).unwrap();
        assert_matches!(&*list.0[0].and_or.first.commands[0], Command::Simple(simple) => {
            simple.redirs.as_ref().clone()
        })
    }

    #[test]
    fn output_and_input_files() {
        let redirs = parse_redirs("cmd >out <in");
        assert_eq!(redirs.len(), 2);
        assert_matches!(&redirs[0].body, RedirBody::Normal { operator, operand } => {
            assert_eq!(*operator, RedirOp::FileOut);
            assert_eq!(operand.to_string(), "out");
        });
        assert_eq!(redirs[0].fd_or_default(), Fd::STDOUT);
        assert_eq!(redirs[1].fd_or_default(), Fd::STDIN);
    }

    #[test]
    fn explicit_fd() {
        let redirs = parse_redirs("cmd 2>err");
        assert_eq!(redirs[0].fd, Some(Fd(2)));
    }

    #[test]
    fn fd_duplication() {
        let redirs = parse_redirs("cmd 2>&1");
        assert_matches!(&redirs[0].body, RedirBody::Normal { operator, operand } => {
            assert_eq!(*operator, RedirOp::FdOut);
            assert_eq!(operand.to_string(), "1");
        });
    }

    #[test]
    fn fd_close() {
        let redirs = parse_redirs("cmd <&-");
        assert_matches!(&redirs[0].body, RedirBody::Normal { operator, operand } => {
            assert_eq!(*operator, RedirOp::FdIn);
            assert_eq!(operand.to_string(), "-");
        });
    }

    #[test]
    fn both_streams() {
        let redirs = parse_redirs("cmd &>all &>>more");
        assert_matches!(&redirs[0].body, RedirBody::Normal { operator, .. } => {
            assert_eq!(*operator, RedirOp::OutErr);
        });
        assert_matches!(&redirs[1].body, RedirBody::Normal { operator, .. } => {
            assert_eq!(*operator, RedirOp::AppendOutErr);
        });
    }

    #[test]
    fn here_string() {
        let redirs = parse_redirs("cmd <<<word");
        assert_matches!(&redirs[0].body, RedirBody::Normal { operator, operand } => {
            assert_eq!(*operator, RedirOp::HereString);
            assert_eq!(operand.to_string(), "word");
        });
    }

    #[test]
    fn here_doc_content_is_attached() {
        let mut lexer = Lexer::with_source("cat <<EOF\nline\nEOF\n", Source::Unknown);
        let list = parse_program(&mut lexer, &AliasSet::new()).unwrap();
        assert_matches!(&*list.0[0].and_or.first.commands[0], Command::Simple(simple) => {
            assert_matches!(&simple.redirs[0].body, RedirBody::HereDoc(here_doc) => {
                let content = here_doc.content.get().unwrap();
                assert_eq!(content.to_string_if_literal().unwrap(), "line\n");
            });
        });
    }

    #[test]
    fn two_here_docs_on_one_command() {
        let input = "cat <<ONE <<TWO\nfirst\nONE\nsecond\nTWO\n";
        let mut lexer = Lexer::with_source(input, Source::Unknown);
        let list = parse_program(&mut lexer, &AliasSet::new()).unwrap();
        assert_matches!(&*list.0[0].and_or.first.commands[0], Command::Simple(simple) => {
            assert_matches!(&simple.redirs[0].body, RedirBody::HereDoc(one) => {
                assert_eq!(one.content.get().unwrap().to_string_if_literal().unwrap(), "first\n");
            });
            assert_matches!(&simple.redirs[1].body, RedirBody::HereDoc(two) => {
                assert_eq!(two.content.get().unwrap().to_string_if_literal().unwrap(), "second\n");
            });
        });
    }

    #[test]
    fn here_doc_across_pipeline() {
        let input = "cat <<A | cat <<B\none\nA\ntwo\nB\n";
        let mut lexer = Lexer::with_source(input, Source::Unknown);
        let list = parse_program(&mut lexer, &AliasSet::new()).unwrap();
        let pipeline = &list.0[0].and_or.first;
        assert_eq!(pipeline.commands.len(), 2);
        assert_matches!(&*pipeline.commands[0], Command::Simple(simple) => {
            assert_matches!(&simple.redirs[0].body, RedirBody::HereDoc(doc) => {
                assert_eq!(doc.content.get().unwrap().to_string_if_literal().unwrap(), "one\n");
            });
        });
    }

    #[test]
    fn missing_here_doc_delimiter() {
        let mut lexer = Lexer::with_source("cat <<\n", Source::Unknown);
        let error = parse_program(&mut lexer, &AliasSet::new()).unwrap_err();
        assert_eq!(
            error.cause,
            super::super::SyntaxError::MissingHereDocDelimiter
        );
    }

    #[test]
    fn missing_redir_operand() {
        let mut lexer = Lexer::with_source("cmd > ;", Source::Unknown);
        let error = parse_program(&mut lexer, &AliasSet::new()).unwrap_err();
        assert_eq!(error.cause, super::super::SyntaxError::MissingRedirOperand);
    }
}
