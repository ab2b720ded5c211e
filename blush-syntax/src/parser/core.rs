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

//! Core machinery of the parser
//!
//! The parser keeps a queue of lookahead tokens. Ordinarily the queue
//! holds at most one token read from the lexer, but alias substitution
//! splices the re-lexed replacement tokens onto its front. Here-document
//! contents are read from the lexer the moment a newline token is lexed,
//! so the lookahead can never run past a pending here-document body.

use super::error::{Error, SyntaxError};
use super::lex::{Keyword, Lexer, Operator, Token, TokenId};
use crate::alias::AliasSet;
use crate::source::Source;
use crate::syntax::{HereDoc, List};
use std::collections::VecDeque;
use std::rc::Rc;

/// Syntax parser
pub struct Parser<'a> {
    lexer: &'a mut Lexer,
    aliases: &'a AliasSet,
    queue: VecDeque<Token>,
    pending_heredocs: Vec<Rc<HereDoc>>,
    /// Alias names that must not be substituted, with the queue length at
    /// which each block expires
    blocked_aliases: Vec<(String, usize)>,
    /// Whether the last substituted alias ended in a blank, which subjects
    /// the next word to alias substitution as well
    pub(super) alias_chain: bool,
}

impl<'a> Parser<'a> {
    /// Creates a parser reading from the given lexer.
    #[must_use]
    pub fn new(lexer: &'a mut Lexer, aliases: &'a AliasSet) -> Self {
        Parser {
            lexer,
            aliases,
            queue: VecDeque::new(),
            pending_heredocs: Vec::new(),
            blocked_aliases: Vec::new(),
            alias_chain: false,
        }
    }

    /// Gives direct access to the underlying lexer.
    ///
    /// Only valid while the token queue is empty; the callers below use it
    /// for constructs that bypass ordinary tokenization (`(( ))`, array
    /// values, `=~` operands).
    pub(super) fn lexer(&mut self) -> &mut Lexer {
        debug_assert!(self.queue.is_empty(), "lexer access with pending tokens");
        self.lexer
    }

    /// Whether the lookahead queue is empty, meaning the lexer position is
    /// exactly at the end of the last consumed token.
    pub(super) fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Reads one more token from the lexer into the queue.
    ///
    /// Pending here-document contents are read the moment the newline
    /// token is lexed, so the lookahead can never skip over them. Input
    /// that ends while here-documents are still pending is incomplete.
    fn fill_queue(&mut self) -> Result<(), Error> {
        let token = self.lexer.token()?;
        match token.id {
            TokenId::Operator(Operator::Newline) => {
                for here_doc in self.pending_heredocs.drain(..) {
                    self.lexer.here_doc_content(&here_doc)?;
                }
            }
            TokenId::EndOfInput if !self.pending_heredocs.is_empty() => {
                let here_doc = &self.pending_heredocs[0];
                return Err(Error {
                    cause: SyntaxError::UnclosedHereDocContent {
                        delimiter: here_doc.delimiter.to_string(),
                    },
                    location: here_doc.delimiter.location.clone(),
                });
            }
            _ => {}
        }
        self.queue.push_back(token);
        Ok(())
    }

    /// Peeks the next token.
    pub fn peek(&mut self) -> Result<&Token, Error> {
        if self.queue.is_empty() {
            self.fill_queue()?;
        }
        Ok(&self.queue[0])
    }

    /// Consumes and returns the next token.
    pub fn take(&mut self) -> Result<Token, Error> {
        if self.queue.is_empty() {
            self.fill_queue()?;
        }
        let token = self.queue.pop_front().unwrap();
        let queue_len = self.queue.len();
        self.blocked_aliases.retain(|&(_, expiry)| queue_len > expiry);
        Ok(token)
    }

    /// Returns the keyword the next token spells, if any.
    pub fn peek_keyword(&mut self) -> Result<Option<Keyword>, Error> {
        Ok(self.peek()?.keyword())
    }

    /// Returns the operator of the next token, if it is one.
    pub fn peek_operator(&mut self) -> Result<Option<Operator>, Error> {
        Ok(match self.peek()?.id {
            TokenId::Operator(operator) => Some(operator),
            _ => None,
        })
    }

    /// Creates an error pointing at the next token.
    pub fn error_at_peek(&mut self, cause: SyntaxError) -> Result<Error, Error> {
        let location = self.peek()?.word.location.clone();
        Ok(Error { cause, location })
    }

    /// Consumes the next token if it spells the given keyword.
    pub fn take_if_keyword(&mut self, keyword: Keyword) -> Result<bool, Error> {
        if self.peek_keyword()? == Some(keyword) {
            self.take()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consumes the next token if it is the given operator.
    pub fn take_if_operator(&mut self, operator: Operator) -> Result<bool, Error> {
        if self.peek_operator()? == Some(operator) {
            self.take()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Requires the given keyword, or fails with `missing`.
    pub fn require_keyword(
        &mut self,
        keyword: Keyword,
        missing: SyntaxError,
    ) -> Result<(), Error> {
        if self.take_if_keyword(keyword)? {
            Ok(())
        } else {
            Err(self.error_at_peek(missing)?)
        }
    }

    /// Skips newline tokens, reading pending here-document contents.
    pub fn skip_newlines(&mut self) -> Result<(), Error> {
        while self.peek_operator()? == Some(Operator::Newline) {
            self.take()?;
        }
        Ok(())
    }

    /// Registers a here-document whose content is read at the next
    /// newline.
    pub(super) fn register_heredoc(&mut self, here_doc: Rc<HereDoc>) {
        self.pending_heredocs.push(here_doc);
    }

    /// Substitutes an alias for the next token if applicable.
    ///
    /// Returns true if a substitution happened, in which case the caller
    /// should retry examining the next token.
    pub fn maybe_substitute_alias(&mut self) -> Result<bool, Error> {
        let token = self.peek()?;
        if !matches!(token.id, TokenId::Token(_)) {
            return Ok(false);
        }
        let Some(name) = token.word.to_string_if_literal() else {
            return Ok(false);
        };
        if self.blocked_aliases.iter().any(|(blocked, _)| *blocked == name) {
            return Ok(false);
        }
        let Some(entry) = self.aliases.get(name.as_str()) else {
            return Ok(false);
        };
        let replacement = entry.0.replacement.clone();

        self.queue.pop_front();
        let expiry = self.queue.len();

        let mut sub_lexer = Lexer::with_source(
            &replacement,
            Source::Alias { name: name.clone() },
        );
        let mut tokens = Vec::new();
        loop {
            let token = sub_lexer.token()?;
            if token.id == TokenId::EndOfInput {
                break;
            }
            tokens.push(token);
        }
        for token in tokens.into_iter().rev() {
            self.queue.push_front(token);
        }
        self.blocked_aliases.push((name, expiry));
        self.alias_chain = replacement.ends_with(|c: char| super::lex::is_blank(c));
        Ok(true)
    }

    /// Parses a whole program: a list terminated by the end of input.
    pub fn program(&mut self) -> Result<List, Error> {
        self.skip_newlines()?;
        let list = self.command_list()?;
        self.skip_newlines()?;
        if self.peek()?.id != TokenId::EndOfInput {
            return Err(self.error_at_peek(SyntaxError::MissingSeparator)?);
        }
        Ok(list)
    }
}
