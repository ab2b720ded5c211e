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

//! Reading here-document contents
//!
//! The here-doc operator and its delimiter are parsed with the containing
//! command, but the content only starts after the next newline token. The
//! parser keeps the [`HereDoc`](crate::syntax::HereDoc)s it has seen on a
//! pending list and calls [`Lexer::here_doc_content`] for each, in source
//! order, when it consumes the newline.

use super::core::Lexer;
use crate::parser::error::{Error, SyntaxError};
use crate::source::Source;
use crate::syntax::*;

/// Computes the delimiter string and whether any part of it was quoted.
///
/// A quoted delimiter turns off expansion in the content.
fn delimiter_string(word: &Word) -> (String, bool) {
    let mut value = String::new();
    let mut quoted = false;
    for unit in &word.units {
        match unit {
            Unquoted(Literal(c)) => value.push(*c),
            Unquoted(Backslashed(c)) => {
                value.push(*c);
                quoted = true;
            }
            SingleQuote(s) => {
                value.push_str(s);
                quoted = true;
            }
            DoubleQuote(text) => {
                for text_unit in &text.0 {
                    match text_unit {
                        Literal(c) | Backslashed(c) => value.push(*c),
                        // Expansions in delimiters are not expanded
                        other => value.push_str(&other.to_string()),
                    }
                }
                quoted = true;
            }
            DollarSingleQuote(string) => {
                value.extend(string.0.iter().map(|unit| unit.char_value()));
                quoted = true;
            }
            Tilde(name) => {
                value.push('~');
                value.push_str(name);
            }
            other => value.push_str(&other.to_string()),
        }
    }
    (value, quoted)
}

impl Lexer {
    /// Reads the content of a here-document and fills its content cell.
    pub fn here_doc_content(&mut self, here_doc: &HereDoc) -> Result<(), Error> {
        let (delimiter, quoted) = delimiter_string(&here_doc.delimiter);
        let start = self.index();
        let mut body = String::new();
        loop {
            let Some(line) = self.raw_line() else {
                return Err(Error {
                    cause: SyntaxError::UnclosedHereDocContent {
                        delimiter: delimiter.clone(),
                    },
                    location: self.location(start..self.index()),
                });
            };
            let mut content_line = line.as_str();
            if here_doc.remove_tabs {
                content_line = content_line.trim_start_matches('\t');
            }
            if content_line.strip_suffix('\n').unwrap_or(content_line) == delimiter {
                break;
            }
            body.push_str(content_line);
        }

        let content = if quoted {
            Text(body.chars().map(Literal).collect())
        } else {
            parse_body(&body, self)?
        };
        here_doc
            .content
            .set(content)
            .expect("here-doc content must be filled only once");
        Ok(())
    }
}

/// Parses an expanding here-document body.
///
/// A backslash is special only before `$`, `` ` ``, `\`, and newline;
/// single and double quotes are ordinary characters.
fn parse_body(body: &str, outer: &Lexer) -> Result<Text, Error> {
    let source = Source::clone(&outer.code().source);
    let mut lexer = Lexer::with_source(body, source);
    let mut units = Vec::new();
    loop {
        let Some(c) = lexer.peek_char() else {
            return Ok(Text(units));
        };
        match c {
            '\\' => match lexer.peek_char_at(1) {
                Some('\n') => {
                    lexer.next_char();
                    lexer.next_char();
                }
                Some(escaped @ ('$' | '`' | '\\')) => {
                    lexer.next_char();
                    lexer.next_char();
                    units.push(Backslashed(escaped));
                }
                _ => {
                    lexer.next_char();
                    units.push(Literal('\\'));
                }
            },
            '$' => match lexer.text_dollar_unit()? {
                Some(unit) => units.push(unit),
                None => {
                    lexer.next_char();
                    units.push(Literal('$'));
                }
            },
            '`' => units.push(lexer.backquote(false)?),
            _ => {
                lexer.next_char();
                units.push(Literal(c));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::cell::OnceCell;

    fn here_doc(delimiter_source: &str, remove_tabs: bool) -> HereDoc {
        let delimiter = Lexer::with_source(delimiter_source, Source::Unknown)
            .word()
            .unwrap();
        HereDoc {
            delimiter,
            remove_tabs,
            content: OnceCell::new(),
        }
    }

    fn read(input: &str, here_doc: &HereDoc) -> Result<(), Error> {
        let mut lexer = Lexer::with_source(input, Source::Unknown);
        lexer.here_doc_content(here_doc)
    }

    #[test]
    fn unquoted_delimiter_expands_content() {
        let here_doc = here_doc("EOF", false);
        read("hello $name\nEOF\n", &here_doc).unwrap();
        let content = here_doc.content.get().unwrap();
        assert_matches!(&content.0[6..7], [RawParam { param, .. }] => {
            assert_eq!(param.id, "name");
        });
    }

    #[test]
    fn quoted_delimiter_keeps_content_literal() {
        let here_doc = here_doc("'EOF'", false);
        read("hello $name\nEOF\n", &here_doc).unwrap();
        let content = here_doc.content.get().unwrap();
        assert_eq!(
            content.to_string_if_literal().unwrap(),
            "hello $name\n"
        );
    }

    #[test]
    fn remove_tabs_strips_content_and_delimiter() {
        let here_doc = here_doc("END", true);
        read("\t\tindented\n\tEND\n", &here_doc).unwrap();
        let content = here_doc.content.get().unwrap();
        assert_eq!(content.to_string_if_literal().unwrap(), "indented\n");
    }

    #[test]
    fn backslash_newline_joins_lines_when_expanding() {
        let here_doc = here_doc("EOF", false);
        read("a\\\nb\nEOF\n", &here_doc).unwrap();
        let content = here_doc.content.get().unwrap();
        assert_eq!(content.to_string_if_literal().unwrap(), "ab\n");
    }

    #[test]
    fn missing_delimiter_is_an_error() {
        let here_doc = here_doc("EOF", false);
        let error = read("content only\n", &here_doc).unwrap_err();
        assert_matches!(
            error.cause,
            SyntaxError::UnclosedHereDocContent { ref delimiter } => {
                assert_eq!(delimiter, "EOF");
            }
        );
        assert!(error.cause.is_incomplete());
    }

    #[test]
    fn empty_content() {
        let here_doc = here_doc("EOF", false);
        read("EOF\n", &here_doc).unwrap();
        let content = here_doc.content.get().unwrap();
        assert_eq!(content.to_string_if_literal().unwrap(), "");
    }
}
