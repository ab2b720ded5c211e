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

//! Parsing of compound commands

use super::core::Parser;
use super::error::{Error, SyntaxError};
use super::lex::{Keyword, Operator, TokenId};
use crate::syntax::*;
use std::rc::Rc;

/// Recognizes a unary test operator word.
fn unary_test_op(s: &str) -> Option<UnaryTestOp> {
    use UnaryTestOp::*;
    Some(match s {
        "-n" => NonEmpty,
        "-z" => Empty,
        "-e" => Exists,
        "-f" => IsFile,
        "-d" => IsDir,
        "-r" => Readable,
        "-w" => Writable,
        "-x" => Executable,
        "-s" => NonEmptyFile,
        "-L" | "-h" => Symlink,
        "-t" => Terminal,
        "-v" => VarSet,
        _ => return None,
    })
}

/// Returns true if the string is a valid variable name.
fn is_name(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with(|c: char| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Parser<'_> {
    /// Parses a compound command with its trailing redirections.
    pub fn full_compound_command(&mut self) -> Result<FullCompoundCommand, Error> {
        let command = self.compound_command()?;
        let mut redirs = Vec::new();
        while let Some(redir) = self.maybe_redir()? {
            redirs.push(redir);
        }
        Ok(FullCompoundCommand { command, redirs })
    }

    /// Parses a compound command.
    pub fn compound_command(&mut self) -> Result<CompoundCommand, Error> {
        match self.peek()?.id {
            TokenId::Operator(Operator::OpenParen) => self.subshell_or_arith(),
            TokenId::Token(Some(Keyword::OpenBrace)) => self.brace_group(),
            TokenId::Token(Some(Keyword::If)) => self.if_command(),
            TokenId::Token(Some(Keyword::While)) => self.loop_command(false),
            TokenId::Token(Some(Keyword::Until)) => self.loop_command(true),
            TokenId::Token(Some(Keyword::For)) => self.for_command(),
            TokenId::Token(Some(Keyword::Select)) => self.select_command(),
            TokenId::Token(Some(Keyword::Case)) => self.case_command(),
            TokenId::Token(Some(Keyword::OpenBracketBracket)) => self.test_command(),
            _ => Err(self.error_at_peek(SyntaxError::InvalidCommandToken)?),
        }
    }

    /// Parses a non-empty command list for a clause body.
    fn clause_body(&mut self) -> Result<List, Error> {
        let body = self.command_list()?;
        if body.0.is_empty() {
            return Err(self.error_at_peek(SyntaxError::EmptyCommandList)?);
        }
        Ok(body)
    }

    fn brace_group(&mut self) -> Result<CompoundCommand, Error> {
        let opening = self.take()?; // {
        let body = self.command_list()?;
        if !self.take_if_keyword(Keyword::CloseBrace)? {
            return Err(self.error_at_peek(SyntaxError::UnclosedGrouping)?);
        }
        if body.0.is_empty() {
            return Err(Error {
                cause: SyntaxError::EmptyGrouping,
                location: opening.word.location,
            });
        }
        Ok(CompoundCommand::Grouping(body))
    }

    /// Parses a subshell, or a `(( … ))` arithmetic command.
    ///
    /// The two cannot be told apart by tokens alone: the lexer is asked
    /// whether another `(` immediately follows the first, and the
    /// arithmetic interpretation is tried first, rewinding on failure.
    fn subshell_or_arith(&mut self) -> Result<CompoundCommand, Error> {
        let opening = self.take()?; // (
        let start = opening.index;

        if self.queue_is_empty() && self.lexer().peek_char() == Some('(') {
            let lexer = self.lexer();
            lexer.next_char();
            match lexer.arith_text(start) {
                Ok(Some(expression)) => {
                    let location = lexer.location(start..lexer.index());
                    return Ok(CompoundCommand::Arith {
                        expression,
                        location,
                    });
                }
                Ok(None) => {
                    // `( (…) …)`: a subshell after all
                    self.lexer().rewind(start + 1);
                }
                Err(error) => {
                    return Err(Error {
                        cause: SyntaxError::UnclosedArithCommand,
                        location: error.location,
                    })
                }
            }
        }

        let body = self.command_list()?;
        if !self.take_if_operator(Operator::CloseParen)? {
            return Err(self.error_at_peek(SyntaxError::UnclosedSubshell)?);
        }
        if body.0.is_empty() {
            return Err(Error {
                cause: SyntaxError::EmptySubshell,
                location: opening.word.location,
            });
        }
        Ok(CompoundCommand::Subshell {
            body: Rc::new(body),
            location: opening.word.location,
        })
    }

    fn if_command(&mut self) -> Result<CompoundCommand, Error> {
        self.take()?; // if
        let condition = self.clause_body()?;
        self.require_keyword(Keyword::Then, SyntaxError::MissingThen)?;
        let body = self.clause_body()?;

        let mut elifs = Vec::new();
        let mut r#else = None;
        loop {
            if self.take_if_keyword(Keyword::Elif)? {
                let condition = self.clause_body()?;
                self.require_keyword(Keyword::Then, SyntaxError::MissingThen)?;
                let body = self.clause_body()?;
                elifs.push(ElifThen { condition, body });
            } else if self.take_if_keyword(Keyword::Else)? {
                r#else = Some(self.clause_body()?);
            } else {
                self.require_keyword(Keyword::Fi, SyntaxError::MissingFi)?;
                return Ok(CompoundCommand::If {
                    condition,
                    body,
                    elifs,
                    r#else,
                });
            }
        }
    }

    fn loop_command(&mut self, until: bool) -> Result<CompoundCommand, Error> {
        self.take()?; // while / until
        let condition = self.clause_body()?;
        let body = self.do_clause()?;
        Ok(if until {
            CompoundCommand::Until { condition, body }
        } else {
            CompoundCommand::While { condition, body }
        })
    }

    /// Parses `do …; done`.
    fn do_clause(&mut self) -> Result<List, Error> {
        self.require_keyword(Keyword::Do, SyntaxError::MissingDo)?;
        let body = self.clause_body()?;
        self.require_keyword(Keyword::Done, SyntaxError::MissingDone)?;
        Ok(body)
    }

    fn for_command(&mut self) -> Result<CompoundCommand, Error> {
        self.take()?; // for

        // `for (( init; cond; update ))`
        if self.peek_operator()? == Some(Operator::OpenParen) {
            let opening = self.take()?;
            if self.queue_is_empty() && self.lexer().peek_char() == Some('(') {
                return self.cfor_tail(opening.index);
            }
            return Err(Error {
                cause: SyntaxError::MissingForName,
                location: opening.word.location,
            });
        }

        let token = self.peek()?;
        if !matches!(token.id, TokenId::Token(_)) {
            return Err(self.error_at_peek(SyntaxError::MissingForName)?);
        }
        let name = self.take()?.word;
        match name.to_string_if_literal() {
            Some(literal) if is_name(&literal) => (),
            _ => {
                return Err(Error {
                    cause: SyntaxError::InvalidForName,
                    location: name.location,
                })
            }
        }

        let values = self.in_clause()?;
        let body = self.do_clause()?;
        Ok(CompoundCommand::For { name, values, body })
    }

    fn select_command(&mut self) -> Result<CompoundCommand, Error> {
        self.take()?; // select
        let token = self.peek()?;
        if !matches!(token.id, TokenId::Token(_)) {
            return Err(self.error_at_peek(SyntaxError::MissingForName)?);
        }
        let name = self.take()?.word;
        let values = self.in_clause()?;
        let body = self.do_clause()?;
        Ok(CompoundCommand::Select { name, values, body })
    }

    /// Parses the optional `in word…` clause of `for` and `select`,
    /// consuming the separator before `do`.
    fn in_clause(&mut self) -> Result<Option<Vec<Word>>, Error> {
        if self.take_if_operator(Operator::Semicolon)? {
            self.skip_newlines()?;
            return Ok(None);
        }
        self.skip_newlines()?;
        if !self.take_if_keyword(Keyword::In)? {
            return Ok(None);
        }
        let mut values = Vec::new();
        while matches!(self.peek()?.id, TokenId::Token(_)) {
            values.push(self.take()?.word);
        }
        if self.take_if_operator(Operator::Semicolon)? || self.peek_operator()? == Some(Operator::Newline)
        {
            self.skip_newlines()?;
        }
        Ok(Some(values))
    }

    /// Parses the rest of a C-style for loop after `((`.
    ///
    /// `start` is the index of the first `(`; the lexer stands on the
    /// second.
    fn cfor_tail(&mut self, start: usize) -> Result<CompoundCommand, Error> {
        self.lexer().next_char(); // second (
        let init = self.cfor_section(start)?;
        let condition = self.cfor_section(start)?;
        let update = match self.lexer().arith_text(start) {
            Ok(Some(text)) => text,
            Ok(None) | Err(_) => {
                let lexer = self.lexer();
                let location = lexer.location(start..start + 2);
                return Err(Error {
                    cause: SyntaxError::UnclosedArithCommand,
                    location,
                });
            }
        };

        if self.take_if_operator(Operator::Semicolon)? {
            // optional `;` before `do`
        }
        self.skip_newlines()?;
        let body = self.do_clause()?;
        Ok(CompoundCommand::CFor {
            init,
            condition,
            update,
            body,
        })
    }

    /// Reads one `;`-terminated section of a C-style for header.
    fn cfor_section(&mut self, start: usize) -> Result<Text, Error> {
        let lexer = self.lexer();
        let mut units = Vec::new();
        let mut depth = 0u32;
        loop {
            lexer.skip_line_continuations();
            let Some(c) = lexer.peek_char() else {
                let location = lexer.location(start..start + 2);
                return Err(Error {
                    cause: SyntaxError::UnclosedArithCommand,
                    location,
                });
            };
            match c {
                ';' if depth == 0 => {
                    lexer.next_char();
                    return Ok(Text(units));
                }
                '(' => {
                    depth += 1;
                    lexer.next_char();
                    units.push(Literal('('));
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    lexer.next_char();
                    units.push(Literal(')'));
                }
                '$' => match lexer.text_dollar_unit()? {
                    Some(unit) => units.push(unit),
                    None => {
                        lexer.next_char();
                        units.push(Literal('$'));
                    }
                },
                _ => {
                    lexer.next_char();
                    units.push(Literal(c));
                }
            }
        }
    }

    fn case_command(&mut self) -> Result<CompoundCommand, Error> {
        self.take()?; // case
        let token = self.peek()?;
        if !matches!(token.id, TokenId::Token(_)) || token.word.units.is_empty() {
            return Err(self.error_at_peek(SyntaxError::MissingIn)?);
        }
        let subject = self.take()?.word;
        self.skip_newlines()?;
        self.require_keyword(Keyword::In, SyntaxError::MissingIn)?;

        let mut items = Vec::new();
        loop {
            self.skip_newlines()?;
            if self.take_if_keyword(Keyword::Esac)? {
                return Ok(CompoundCommand::Case { subject, items });
            }
            if self.peek()?.id == TokenId::EndOfInput {
                return Err(self.error_at_peek(SyntaxError::MissingEsac)?);
            }
            self.take_if_operator(Operator::OpenParen)?;

            let mut patterns = Vec::new();
            loop {
                let token = self.peek()?;
                if !matches!(token.id, TokenId::Token(_)) || token.word.units.is_empty() {
                    return Err(self.error_at_peek(SyntaxError::UnclosedPattern)?);
                }
                patterns.push(self.take()?.word);
                if !self.take_if_operator(Operator::Bar)? {
                    break;
                }
            }
            if !self.take_if_operator(Operator::CloseParen)? {
                return Err(self.error_at_peek(SyntaxError::UnclosedPattern)?);
            }

            let body = self.command_list()?;

            let continuation = match self.peek_operator()? {
                Some(Operator::SemicolonSemicolon) => {
                    self.take()?;
                    CaseContinuation::Break
                }
                Some(Operator::SemicolonAnd) => {
                    self.take()?;
                    CaseContinuation::FallThrough
                }
                Some(Operator::SemicolonSemicolonAnd) => {
                    self.take()?;
                    CaseContinuation::Continue
                }
                _ => {
                    // The last branch may omit its terminator
                    items.push(CaseItem {
                        patterns,
                        body,
                        continuation: CaseContinuation::Break,
                    });
                    self.skip_newlines()?;
                    self.require_keyword(Keyword::Esac, SyntaxError::MissingEsac)?;
                    return Ok(CompoundCommand::Case { subject, items });
                }
            };
            items.push(CaseItem {
                patterns,
                body,
                continuation,
            });
        }
    }

    fn test_command(&mut self) -> Result<CompoundCommand, Error> {
        let opening = self.take()?; // [[
        let expression = self.test_or()?;
        self.require_keyword(Keyword::CloseBracketBracket, SyntaxError::UnclosedTest)?;
        Ok(CompoundCommand::Test {
            expression: Box::new(expression),
            location: opening.word.location,
        })
    }

    fn test_or(&mut self) -> Result<TestExpr, Error> {
        let mut expression = self.test_and()?;
        while self.take_if_operator(Operator::BarBar)? {
            self.skip_newlines()?;
            expression = TestExpr::Or(Box::new(expression), Box::new(self.test_and()?));
        }
        Ok(expression)
    }

    fn test_and(&mut self) -> Result<TestExpr, Error> {
        let mut expression = self.test_primary()?;
        while self.take_if_operator(Operator::AndAnd)? {
            self.skip_newlines()?;
            expression = TestExpr::And(Box::new(expression), Box::new(self.test_primary()?));
        }
        Ok(expression)
    }

    fn test_primary(&mut self) -> Result<TestExpr, Error> {
        if self.take_if_operator(Operator::OpenParen)? {
            self.skip_newlines()?;
            let inner = self.test_or()?;
            self.skip_newlines()?;
            if !self.take_if_operator(Operator::CloseParen)? {
                return Err(self.error_at_peek(SyntaxError::InvalidTestExpression)?);
            }
            return Ok(inner);
        }
        if self.take_if_keyword(Keyword::Bang)? {
            return Ok(TestExpr::Not(Box::new(self.test_primary()?)));
        }

        let token = self.peek()?;
        match token.id {
            TokenId::EndOfInput => Err(self.error_at_peek(SyntaxError::UnclosedTest)?),
            TokenId::Token(Some(Keyword::CloseBracketBracket)) | TokenId::Operator(_) => {
                Err(self.error_at_peek(SyntaxError::InvalidTestExpression)?)
            }
            TokenId::Token(_) => {
                let word = self.take()?.word;

                // Unary operator applied to the next word
                if let Some(operator) = word
                    .to_string_if_literal()
                    .as_deref()
                    .and_then(unary_test_op)
                {
                    if self.test_operand_follows()? {
                        let operand = self.take()?.word;
                        return Ok(TestExpr::Unary { operator, operand });
                    }
                }

                // Binary operator between this word and the next
                if let Some(operator) = self.peek_binary_test_op()? {
                    if operator == BinaryTestOp::RegexMatch {
                        self.take()?;
                        let rhs = self.regex_operand()?;
                        return Ok(TestExpr::Binary {
                            operator,
                            lhs: word,
                            rhs,
                        });
                    }
                    self.take()?;
                    if !self.test_operand_follows()? {
                        return Err(self.error_at_peek(SyntaxError::InvalidTestExpression)?);
                    }
                    let rhs = self.take()?.word;
                    return Ok(TestExpr::Binary {
                        operator,
                        lhs: word,
                        rhs,
                    });
                }

                Ok(TestExpr::Word(word))
            }
            _ => Err(self.error_at_peek(SyntaxError::InvalidTestExpression)?),
        }
    }

    /// Returns true if the next token can serve as a test operand.
    fn test_operand_follows(&mut self) -> Result<bool, Error> {
        let token = self.peek()?;
        Ok(
            matches!(token.id, TokenId::Token(tag) if tag != Some(Keyword::CloseBracketBracket))
                && !token.word.units.is_empty(),
        )
    }

    /// Recognizes a binary test operator in the next token.
    fn peek_binary_test_op(&mut self) -> Result<Option<BinaryTestOp>, Error> {
        use BinaryTestOp::*;
        match self.peek()?.id {
            TokenId::Operator(Operator::Less) => return Ok(Some(StrLess)),
            TokenId::Operator(Operator::Greater) => return Ok(Some(StrGreater)),
            TokenId::Token(_) => {}
            _ => return Ok(None),
        }
        let literal = self.peek()?.word.to_string_if_literal();
        Ok(literal.as_deref().and_then(|s| {
            Some(match s {
                "=" | "==" => Match,
                "!=" => NoMatch,
                "=~" => RegexMatch,
                "-eq" => Eq,
                "-ne" => Ne,
                "-lt" => Lt,
                "-le" => Le,
                "-gt" => Gt,
                "-ge" => Ge,
                "-nt" => NewerThan,
                "-ot" => OlderThan,
                "-ef" => SameFile,
                _ => return None,
            })
        }))
    }

    /// Reads the right-hand side of `=~` with relaxed lexing.
    fn regex_operand(&mut self) -> Result<Word, Error> {
        if !self.queue_is_empty() {
            // The `=~` token was the last queued token, so the queue is
            // normally empty here; a non-empty queue means an alias
            // substitution ended right before the operand
            return Err(self.error_at_peek(SyntaxError::InvalidTestExpression)?);
        }
        let lexer = self.lexer();
        lexer.skip_blanks_and_comment();
        let word = lexer.regex_word()?;
        if word.units.is_empty() {
            return Err(self.error_at_peek(SyntaxError::InvalidTestExpression)?);
        }
        Ok(word)
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

    fn parse_compound(input: &str) -> CompoundCommand {
        let mut lexer = Lexer::with_source(input, Source::Unknown);
        let list = parse_program(&mut lexer, &AliasSet::new())
            .unwrap_or_else(|e| panic!("{input:?}: {e}"));
        assert_matches!(&*list.0[0].and_or.first.commands[0], Command::Compound(full) => {
            full.command.clone()
        })
    }

    fn parse_error(input: &str) -> super::super::SyntaxError {
        let mut lexer = Lexer::with_source(input, Source::Unknown);
        parse_program(&mut lexer, &AliasSet::new()).unwrap_err().cause
    }

    #[test]
    fn brace_group() {
        assert_matches!(parse_compound("{ a; b; }"), CompoundCommand::Grouping(body) => {
            assert_eq!(body.0.len(), 2);
        });
    }

    #[test]
    fn empty_brace_group_is_an_error() {
        assert_eq!(parse_error("{ }"), super::super::SyntaxError::EmptyGrouping);
    }

    #[test]
    fn subshell() {
        assert_matches!(parse_compound("(a; b)"), CompoundCommand::Subshell { body, .. } => {
            assert_eq!(body.0.len(), 2);
        });
    }

    #[test]
    fn arith_command() {
        assert_matches!(parse_compound("((x + 1))"), CompoundCommand::Arith { expression, .. } => {
            assert_eq!(expression.to_string(), "x + 1");
        });
    }

    #[test]
    fn nested_subshell_is_not_arith() {
        assert_matches!(
            parse_compound("( (a) )"),
            CompoundCommand::Subshell { .. }
        );
    }

    #[test]
    fn if_with_elif_and_else() {
        let compound = parse_compound("if a; then b; elif c; then d; else e; fi");
        assert_matches!(compound, CompoundCommand::If { elifs, r#else, .. } => {
            assert_eq!(elifs.len(), 1);
            assert!(r#else.is_some());
        });
    }

    #[test]
    fn while_and_until_loops() {
        assert_matches!(
            parse_compound("while a; do b; done"),
            CompoundCommand::While { .. }
        );
        assert_matches!(
            parse_compound("until a; do b; done"),
            CompoundCommand::Until { .. }
        );
    }

    #[test]
    fn for_with_values() {
        assert_matches!(parse_compound("for x in a b c; do echo $x; done"), CompoundCommand::For { name, values, .. } => {
            assert_eq!(name.to_string(), "x");
            assert_eq!(values.unwrap().len(), 3);
        });
    }

    #[test]
    fn for_with_empty_values() {
        assert_matches!(parse_compound("for x in; do echo $x; done"), CompoundCommand::For { values, .. } => {
            assert_eq!(values.unwrap().len(), 0);
        });
    }

    #[test]
    fn for_without_in_iterates_positional_params() {
        assert_matches!(parse_compound("for x; do echo $x; done"), CompoundCommand::For { values, .. } => {
            assert_eq!(values, None);
        });
        assert_matches!(parse_compound("for x do echo $x; done"), CompoundCommand::For { values, .. } => {
            assert_eq!(values, None);
        });
    }

    #[test]
    fn c_style_for() {
        let compound = parse_compound("for ((i=0; i<3; i++)); do echo $i; done");
        assert_matches!(compound, CompoundCommand::CFor { init, condition, update, .. } => {
            assert_eq!(init.to_string(), "i=0");
            assert_eq!(condition.to_string(), " i<3");
            assert_eq!(update.to_string(), " i++");
        });
    }

    #[test]
    fn select_command() {
        assert_matches!(
            parse_compound("select x in a b; do echo $x; done"),
            CompoundCommand::Select { .. }
        );
    }

    #[test]
    fn case_with_alternative_patterns() {
        let compound = parse_compound("case $x in a|b) one;; (c) two;& d) three;;& esac");
        assert_matches!(compound, CompoundCommand::Case { items, .. } => {
            assert_eq!(items.len(), 3);
            assert_eq!(items[0].patterns.len(), 2);
            assert_eq!(items[0].continuation, CaseContinuation::Break);
            assert_eq!(items[1].continuation, CaseContinuation::FallThrough);
            assert_eq!(items[2].continuation, CaseContinuation::Continue);
        });
    }

    #[test]
    fn case_with_empty_body_and_no_final_terminator() {
        let compound = parse_compound("case x in a) ;; b) echo hi\nesac");
        assert_matches!(compound, CompoundCommand::Case { items, .. } => {
            assert_eq!(items.len(), 2);
            assert!(items[0].body.0.is_empty());
        });
    }

    #[test]
    fn empty_case() {
        assert_matches!(parse_compound("case x in esac"), CompoundCommand::Case { items, .. } => {
            assert!(items.is_empty());
        });
    }

    #[test]
    fn test_unary() {
        let compound = parse_compound("[[ -f /etc/passwd ]]");
        assert_matches!(compound, CompoundCommand::Test { expression, .. } => {
            assert_matches!(*expression, TestExpr::Unary { operator: UnaryTestOp::IsFile, operand } => {
                assert_eq!(operand.to_string(), "/etc/passwd");
            });
        });
    }

    #[test]
    fn test_binary_and_precedence() {
        let compound = parse_compound("[[ a == b || c != d && -n e ]]");
        assert_matches!(compound, CompoundCommand::Test { expression, .. } => {
            assert_matches!(*expression, TestExpr::Or(lhs, rhs) => {
                assert_matches!(*lhs, TestExpr::Binary { operator: BinaryTestOp::Match, .. });
                assert_matches!(*rhs, TestExpr::And(..));
            });
        });
    }

    #[test]
    fn test_negation_and_parens() {
        let compound = parse_compound("[[ ! ( a == b ) ]]");
        assert_matches!(compound, CompoundCommand::Test { expression, .. } => {
            assert_matches!(*expression, TestExpr::Not(inner) => {
                assert_matches!(*inner, TestExpr::Binary { .. });
            });
        });
    }

    #[test]
    fn test_string_compare() {
        let compound = parse_compound("[[ a < b ]]");
        assert_matches!(compound, CompoundCommand::Test { expression, .. } => {
            assert_matches!(*expression, TestExpr::Binary { operator: BinaryTestOp::StrLess, .. });
        });
    }

    #[test]
    fn test_regex_match() {
        let compound = parse_compound("[[ $x =~ ^(a|b)[0-9]+$ ]]");
        assert_matches!(compound, CompoundCommand::Test { expression, .. } => {
            assert_matches!(*expression, TestExpr::Binary { operator: BinaryTestOp::RegexMatch, rhs, .. } => {
                assert_eq!(rhs.to_string_if_literal().unwrap(), "^(a|b)[0-9]+$");
            });
        });
    }

    #[test]
    fn test_single_word() {
        let compound = parse_compound("[[ $x ]]");
        assert_matches!(compound, CompoundCommand::Test { expression, .. } => {
            assert_matches!(*expression, TestExpr::Word(_));
        });
    }

    #[test]
    fn unclosed_constructs_are_incomplete() {
        assert!(parse_error("if a; then b;").is_incomplete());
        assert!(parse_error("while a; do b;").is_incomplete());
        assert!(parse_error("case x in").is_incomplete());
        assert!(parse_error("{ a;").is_incomplete());
        assert!(parse_error("(a;").is_incomplete());
        assert!(parse_error("[[ x").is_incomplete());
    }

    #[test]
    fn compound_with_redirections() {
        let mut lexer = Lexer::with_source("{ a; } >out 2>&1", Source::Unknown);
        let list = parse_program(&mut lexer, &AliasSet::new()).unwrap();
        assert_matches!(&*list.0[0].and_or.first.commands[0], Command::Compound(full) => {
            assert_eq!(full.redirs.len(), 2);
        });
    }
}
