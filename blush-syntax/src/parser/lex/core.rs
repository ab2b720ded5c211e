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

//! Fundamental building blocks of the lexical analyzer
//!
//! The lexer is a single forward pass over a complete code block. Derived
//! functions in the sibling modules parse words, expansions, and
//! here-document contents on top of the primitives here. The lexer can
//! [rewind](Lexer::rewind) to a saved position, which the parser uses for
//! the few constructs that need backtracking (`$((…))` versus `$( (…))`,
//! `((…))` versus nested subshells, array assignment values).

use super::super::error::{Error, SyntaxError};
use super::keyword::Keyword;
use super::op::{self, Operator};
use crate::source::{Code, Location, Source};
use crate::syntax::Word;
use std::os::unix::io::RawFd;
use std::rc::Rc;

/// Returns true if the character is a blank (horizontal whitespace).
#[must_use]
pub fn is_blank(c: char) -> bool {
    c != '\n' && c.is_whitespace()
}

/// Token identifier, or classification of tokens
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TokenId {
    /// Ordinary token
    ///
    /// If the token spells a reserved word, the associated value names it.
    /// Whether the keyword takes effect depends on the parsing context.
    Token(Option<Keyword>),
    /// Operator
    Operator(Operator),
    /// `IO_NUMBER`: digits immediately preceding a redirection operator
    IoNumber(RawFd),
    /// End of input
    EndOfInput,
}

/// Result of lexical analysis
#[derive(Clone, Debug)]
pub struct Token {
    /// Content of the token
    ///
    /// The word is empty for operator and end-of-input tokens.
    pub word: Word,
    /// Token identifier
    pub id: TokenId,
    /// Char index of the first character of the token in the lexer input
    pub index: usize,
}

impl Token {
    /// Returns the keyword this token spells, if any.
    #[must_use]
    pub fn keyword(&self) -> Option<Keyword> {
        match self.id {
            TokenId::Token(keyword) => keyword,
            _ => None,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.id {
            TokenId::Operator(Operator::Newline) => f.write_str("newline"),
            TokenId::Operator(op) => write!(f, "`{op}`"),
            TokenId::EndOfInput => f.write_str("end of input"),
            _ => write!(f, "`{}`", self.word),
        }
    }
}

/// Lexical analyzer
///
/// The lexer owns the source code block and a current position. The
/// position counts characters, not bytes; [`Lexer::location`] converts
/// character ranges to the byte ranges stored in [`Location`]s.
#[derive(Clone, Debug)]
pub struct Lexer {
    code: Rc<Code>,
    /// Byte offset and value of each character
    chars: Vec<(usize, char)>,
    /// Index into `chars` of the next character to be consumed
    index: usize,
}

impl Lexer {
    /// Creates a lexer for a code block.
    #[must_use]
    pub fn new(code: Rc<Code>) -> Lexer {
        let chars = code.value.char_indices().collect();
        Lexer {
            code,
            chars,
            index: 0,
        }
    }

    /// Creates a lexer for a plain string, with the given source tag.
    #[must_use]
    pub fn with_source(value: &str, source: Source) -> Lexer {
        Lexer::new(Code::new(value, source))
    }

    /// Returns the code block this lexer reads from.
    #[must_use]
    pub fn code(&self) -> &Rc<Code> {
        &self.code
    }

    /// Returns the current position (a char index).
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Moves the position back (or forward) to a previously saved index.
    pub fn rewind(&mut self, index: usize) {
        self.index = index;
    }

    /// Peeks the next character without consuming it.
    #[must_use]
    pub fn peek_char(&self) -> Option<char> {
        self.peek_char_at(0)
    }

    /// Peeks the character `offset` positions ahead.
    #[must_use]
    pub fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index + offset).map(|&(_, c)| c)
    }

    /// Consumes and returns the next character.
    pub fn next_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.index += 1;
        Some(c)
    }

    /// Consumes the next character if it equals `expected`.
    pub fn next_if_char(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Returns the remaining input as a string slice.
    #[must_use]
    pub fn remaining(&self) -> &str {
        match self.chars.get(self.index) {
            Some(&(offset, _)) => &self.code.value[offset..],
            None => "",
        }
    }

    /// Converts a char-index range to a location.
    #[must_use]
    pub fn location(&self, range: std::ops::Range<usize>) -> Location {
        let start = self
            .chars
            .get(range.start)
            .map_or(self.code.value.len(), |&(offset, _)| offset);
        let end = self
            .chars
            .get(range.end)
            .map_or(self.code.value.len(), |&(offset, _)| offset);
        Location {
            code: Rc::clone(&self.code),
            range: start..end,
        }
    }

    /// Returns a location for the current position.
    #[must_use]
    pub fn location_here(&self) -> Location {
        self.location(self.index..self.index)
    }

    /// Creates an error at the given char range.
    #[must_use]
    pub fn error(&self, cause: SyntaxError, range: std::ops::Range<usize>) -> Error {
        Error {
            cause,
            location: self.location(range),
        }
    }

    /// Skips a `\` newline pair, which is invisible to the grammar
    /// outside single quotes and here-document contents.
    ///
    /// Returns true if one was skipped.
    pub fn skip_line_continuation(&mut self) -> bool {
        if self.peek_char() == Some('\\') && self.peek_char_at(1) == Some('\n') {
            self.index += 2;
            true
        } else {
            false
        }
    }

    /// Skips consecutive line continuations.
    pub fn skip_line_continuations(&mut self) {
        while self.skip_line_continuation() {}
    }

    /// Skips blanks, line continuations, and a comment.
    ///
    /// A comment runs from an unquoted `#` at the start of a token to just
    /// before the next newline.
    pub fn skip_blanks_and_comment(&mut self) {
        loop {
            self.skip_line_continuations();
            match self.peek_char() {
                Some(c) if is_blank(c) => {
                    self.index += 1;
                }
                Some('#') => {
                    while let Some(c) = self.peek_char() {
                        if c == '\n' {
                            break;
                        }
                        self.index += 1;
                    }
                    return;
                }
                _ => return,
            }
        }
    }

    /// Reads the rest of the current line including the newline, verbatim.
    ///
    /// Used for here-document contents.
    pub fn raw_line(&mut self) -> Option<String> {
        self.peek_char()?;
        let mut line = String::new();
        while let Some(c) = self.next_char() {
            if c == '\n' {
                line.push(c);
                return Some(line);
            }
            line.push(c);
        }
        // Last line without a trailing newline
        Some(line)
    }

    /// Parses the next token.
    pub fn token(&mut self) -> Result<Token, Error> {
        self.skip_blanks_and_comment();
        let index = self.index;

        let Some(c) = self.peek_char() else {
            return Ok(Token {
                word: Word {
                    units: vec![],
                    location: self.location(index..index),
                },
                id: TokenId::EndOfInput,
                index,
            });
        };

        // An IO_NUMBER is a digit run glued to a redirection operator
        if c.is_ascii_digit() {
            let mut end = 0;
            while self.peek_char_at(end).is_some_and(|c| c.is_ascii_digit()) {
                end += 1;
            }
            if let Some('<' | '>') = self.peek_char_at(end) {
                let digits: String = (0..end)
                    .map(|offset| self.peek_char_at(offset).unwrap())
                    .collect();
                if let Ok(fd) = digits.parse::<RawFd>() {
                    self.index += end;
                    return Ok(Token {
                        word: Word {
                            units: vec![],
                            location: self.location(index..self.index),
                        },
                        id: TokenId::IoNumber(fd),
                        index,
                    });
                }
            }
        }

        // Process substitution starts with an operator character but is a word
        let process_subst = matches!(c, '<' | '>') && self.peek_char_at(1) == Some('(');

        if op::is_operator_char(c) && !process_subst {
            let operator = op::longest_match(self.remaining())
                .expect("operator characters always match an operator");
            self.index += operator.as_str().chars().count();
            return Ok(Token {
                word: Word {
                    units: vec![],
                    location: self.location(index..self.index),
                },
                id: TokenId::Operator(operator),
                index,
            });
        }

        let word = self.word()?;
        let keyword = word
            .to_string_if_literal()
            .and_then(|literal| literal.parse().ok());
        Ok(Token {
            word,
            id: TokenId::Token(keyword),
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexer(input: &str) -> Lexer {
        Lexer::with_source(input, Source::Unknown)
    }

    #[test]
    fn empty_input_yields_end_of_input() {
        let mut lexer = lexer("");
        let token = lexer.token().unwrap();
        assert_eq!(token.id, TokenId::EndOfInput);
    }

    #[test]
    fn blanks_and_comments_are_skipped() {
        let mut lexer = lexer("   # comment\necho");
        let token = lexer.token().unwrap();
        assert_eq!(token.id, TokenId::Operator(Operator::Newline));
        let token = lexer.token().unwrap();
        assert_eq!(token.word.to_string(), "echo");
    }

    #[test]
    fn operators_longest_match() {
        let mut lexer = lexer("&& & ;;");
        assert_eq!(
            lexer.token().unwrap().id,
            TokenId::Operator(Operator::AndAnd)
        );
        assert_eq!(lexer.token().unwrap().id, TokenId::Operator(Operator::And));
        assert_eq!(
            lexer.token().unwrap().id,
            TokenId::Operator(Operator::SemicolonSemicolon)
        );
    }

    #[test]
    fn io_number() {
        let mut lexer = lexer("2> file");
        assert_eq!(lexer.token().unwrap().id, TokenId::IoNumber(2));
        assert_eq!(
            lexer.token().unwrap().id,
            TokenId::Operator(Operator::Greater)
        );
        assert_eq!(lexer.token().unwrap().word.to_string(), "file");
    }

    #[test]
    fn digits_not_before_redirection_are_a_word() {
        let mut lexer = lexer("22 x");
        let token = lexer.token().unwrap();
        assert_eq!(token.word.to_string_if_literal().unwrap(), "22");
    }

    #[test]
    fn keywords_are_tagged() {
        let mut lexer = lexer("if x");
        assert_eq!(lexer.token().unwrap().keyword(), Some(Keyword::If));
        assert_eq!(lexer.token().unwrap().keyword(), None);
    }

    #[test]
    fn line_continuation_joins_tokens() {
        let mut lexer = lexer("ec\\\nho");
        let token = lexer.token().unwrap();
        assert_eq!(token.word.to_string_if_literal().unwrap(), "echo");
    }

    #[test]
    fn rewind_restores_position() {
        let mut lexer = lexer("a b");
        let start = lexer.index();
        let _ = lexer.token().unwrap();
        lexer.rewind(start);
        let token = lexer.token().unwrap();
        assert_eq!(token.word.to_string_if_literal().unwrap(), "a");
    }

    #[test]
    fn raw_line_reads_verbatim() {
        let mut lexer = lexer("one $x\ntwo\n");
        assert_eq!(lexer.raw_line().unwrap(), "one $x\n");
        assert_eq!(lexer.raw_line().unwrap(), "two\n");
        assert_eq!(lexer.raw_line(), None);
    }
}
