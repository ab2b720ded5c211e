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

//! Syntax tree and parser for arithmetic expressions

use crate::token::{Operator, Token, TokenValue, Tokens};
use std::iter::Peekable;
use std::ops::Range;
use thiserror::Error;

/// Unary prefix operator
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PrefixOperator {
    /// `+`
    Plus,
    /// `-`
    Negate,
    /// `!`
    LogicalNot,
    /// `~`
    BitwiseNot,
    /// `++`
    Increment,
    /// `--`
    Decrement,
}

/// Unary postfix operator
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PostfixOperator {
    /// `++`
    Increment,
    /// `--`
    Decrement,
}

/// Binary operator
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BinaryOperator {
    LogicalOr,
    LogicalAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    ShiftLeft,
    ShiftRight,
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Power,
}

/// Node of the expression tree
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Ast<'a> {
    /// Integer constant
    Number(i64),
    /// Variable reference
    Variable {
        name: &'a str,
        location: Range<usize>,
    },
    /// Prefix operation
    Prefix {
        operator: PrefixOperator,
        operand: Box<Ast<'a>>,
        location: Range<usize>,
    },
    /// Postfix operation
    Postfix {
        operator: PostfixOperator,
        operand: Box<Ast<'a>>,
        location: Range<usize>,
    },
    /// Binary operation
    Binary {
        operator: BinaryOperator,
        lhs: Box<Ast<'a>>,
        rhs: Box<Ast<'a>>,
        location: Range<usize>,
    },
    /// Assignment, optionally compound (`x = e`, `x += e`, …)
    Assignment {
        operator: Option<BinaryOperator>,
        lhs: Box<Ast<'a>>,
        rhs: Box<Ast<'a>>,
        location: Range<usize>,
    },
    /// Conditional operator `a ? b : c`
    Conditional {
        condition: Box<Ast<'a>>,
        then: Box<Ast<'a>>,
        otherwise: Box<Ast<'a>>,
    },
    /// Comma operator
    Comma {
        lhs: Box<Ast<'a>>,
        rhs: Box<Ast<'a>>,
    },
}

/// Syntax error in an expression
#[derive(Clone, Copy, Debug, Eq, Error, Hash, PartialEq)]
pub enum SyntaxError {
    /// An operand is missing where one is required.
    #[error("expected an operand")]
    MissingOperand,
    /// A `(` lacks a closing `)`.
    #[error("unmatched parenthesis")]
    UnclosedParen,
    /// A `?` lacks its `:`.
    #[error("`?` without matching `:`")]
    MissingColon,
    /// A token was left over after the expression.
    #[error("unexpected token")]
    UnexpectedToken,
}

type ParseResult<T> = Result<T, (ParseErrorCause, Range<usize>)>;

/// Cause of a parse failure, combining token and syntax errors
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseErrorCause {
    Token(crate::token::TokenError),
    Syntax(SyntaxError),
}

struct Parser<'a> {
    tokens: Peekable<Tokens<'a>>,
    /// Position just past the last consumed token, for error locations
    end: usize,
}

impl<'a> Parser<'a> {
    fn peek(&mut self) -> ParseResult<Option<&Token<'a>>> {
        match self.tokens.peek() {
            None => Ok(None),
            Some(Ok(token)) => Ok(Some(token)),
            Some(Err((error, location))) => {
                Err((ParseErrorCause::Token(error.clone()), location.clone()))
            }
        }
    }

    fn peek_operator(&mut self) -> ParseResult<Option<Operator>> {
        Ok(match self.peek()? {
            Some(Token {
                value: TokenValue::Operator(op),
                ..
            }) => Some(*op),
            _ => None,
        })
    }

    fn next(&mut self) -> ParseResult<Option<Token<'a>>> {
        match self.tokens.next() {
            None => Ok(None),
            Some(Ok(token)) => {
                self.end = token.location.end;
                Ok(Some(token))
            }
            Some(Err((error, location))) => Err((ParseErrorCause::Token(error), location)),
        }
    }

    fn missing_operand<T>(&mut self) -> ParseResult<T> {
        let location = match self.peek()? {
            Some(token) => token.location.clone(),
            None => self.end..self.end,
        };
        Err((ParseErrorCause::Syntax(SyntaxError::MissingOperand), location))
    }

    fn primary(&mut self) -> ParseResult<Ast<'a>> {
        match self.peek()? {
            Some(Token {
                value: TokenValue::Number(_),
                ..
            }) => {
                let token = self.next()?.unwrap();
                match token.value {
                    TokenValue::Number(n) => Ok(Ast::Number(n)),
                    _ => unreachable!(),
                }
            }
            Some(Token {
                value: TokenValue::Variable(_),
                ..
            }) => {
                let token = self.next()?.unwrap();
                match token.value {
                    TokenValue::Variable(name) => Ok(Ast::Variable {
                        name,
                        location: token.location,
                    }),
                    _ => unreachable!(),
                }
            }
            Some(Token {
                value: TokenValue::Operator(Operator::OpenParen),
                ..
            }) => {
                let open = self.next()?.unwrap();
                let inner = self.comma()?;
                match self.peek_operator()? {
                    Some(Operator::CloseParen) => {
                        self.next()?;
                        Ok(inner)
                    }
                    _ => Err((
                        ParseErrorCause::Syntax(SyntaxError::UnclosedParen),
                        open.location,
                    )),
                }
            }
            _ => self.missing_operand(),
        }
    }

    fn postfix(&mut self) -> ParseResult<Ast<'a>> {
        let mut operand = self.primary()?;
        loop {
            let operator = match self.peek_operator()? {
                Some(Operator::PlusPlus) => PostfixOperator::Increment,
                Some(Operator::MinusMinus) => PostfixOperator::Decrement,
                _ => return Ok(operand),
            };
            let token = self.next()?.unwrap();
            operand = Ast::Postfix {
                operator,
                operand: Box::new(operand),
                location: token.location,
            };
        }
    }

    fn prefix(&mut self) -> ParseResult<Ast<'a>> {
        let operator = match self.peek_operator()? {
            Some(Operator::Plus) => PrefixOperator::Plus,
            Some(Operator::Minus) => PrefixOperator::Negate,
            Some(Operator::Bang) => PrefixOperator::LogicalNot,
            Some(Operator::Tilde) => PrefixOperator::BitwiseNot,
            Some(Operator::PlusPlus) => PrefixOperator::Increment,
            Some(Operator::MinusMinus) => PrefixOperator::Decrement,
            _ => return self.postfix(),
        };
        let token = self.next()?.unwrap();
        let operand = self.prefix()?;
        Ok(Ast::Prefix {
            operator,
            operand: Box::new(operand),
            location: token.location,
        })
    }

    fn power(&mut self) -> ParseResult<Ast<'a>> {
        let lhs = self.prefix()?;
        if self.peek_operator()? == Some(Operator::AsteriskAsterisk) {
            let token = self.next()?.unwrap();
            // Right-associative
            let rhs = self.power()?;
            return Ok(Ast::Binary {
                operator: BinaryOperator::Power,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                location: token.location,
            });
        }
        Ok(lhs)
    }

    fn binary(&mut self, level: usize) -> ParseResult<Ast<'a>> {
        use BinaryOperator::*;
        use Operator as Op;
        // Levels from loosest to tightest binding
        const LEVELS: &[&[(Op, BinaryOperator)]] = &[
            &[(Op::BarBar, LogicalOr)],
            &[(Op::AndAnd, LogicalAnd)],
            &[(Op::Bar, BitwiseOr)],
            &[(Op::Caret, BitwiseXor)],
            &[(Op::And, BitwiseAnd)],
            &[(Op::EqualEqual, Equal), (Op::BangEqual, NotEqual)],
            &[
                (Op::Less, Less),
                (Op::LessEqual, LessEqual),
                (Op::Greater, Greater),
                (Op::GreaterEqual, GreaterEqual),
            ],
            &[(Op::LessLess, ShiftLeft), (Op::GreaterGreater, ShiftRight)],
            &[(Op::Plus, Add), (Op::Minus, Subtract)],
            &[
                (Op::Asterisk, Multiply),
                (Op::Slash, Divide),
                (Op::Percent, Remainder),
            ],
        ];

        if level == LEVELS.len() {
            return self.power();
        }

        let mut lhs = self.binary(level + 1)?;
        'outer: loop {
            let peeked = self.peek_operator()?;
            for &(token_op, ast_op) in LEVELS[level] {
                if peeked == Some(token_op) {
                    let token = self.next()?.unwrap();
                    let rhs = self.binary(level + 1)?;
                    lhs = Ast::Binary {
                        operator: ast_op,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                        location: token.location,
                    };
                    continue 'outer;
                }
            }
            return Ok(lhs);
        }
    }

    fn conditional(&mut self) -> ParseResult<Ast<'a>> {
        let condition = self.binary(0)?;
        if self.peek_operator()? != Some(Operator::Question) {
            return Ok(condition);
        }
        let question = self.next()?.unwrap();
        let then = self.assignment()?;
        if self.peek_operator()? != Some(Operator::Colon) {
            return Err((
                ParseErrorCause::Syntax(SyntaxError::MissingColon),
                question.location,
            ));
        }
        self.next()?;
        let otherwise = self.assignment()?;
        Ok(Ast::Conditional {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn assignment(&mut self) -> ParseResult<Ast<'a>> {
        use BinaryOperator::*;
        let lhs = self.conditional()?;
        let operator = match self.peek_operator()? {
            Some(Operator::Equal) => None,
            Some(Operator::PlusEqual) => Some(Add),
            Some(Operator::MinusEqual) => Some(Subtract),
            Some(Operator::AsteriskEqual) => Some(Multiply),
            Some(Operator::SlashEqual) => Some(Divide),
            Some(Operator::PercentEqual) => Some(Remainder),
            Some(Operator::LessLessEqual) => Some(ShiftLeft),
            Some(Operator::GreaterGreaterEqual) => Some(ShiftRight),
            Some(Operator::AndEqual) => Some(BitwiseAnd),
            Some(Operator::CaretEqual) => Some(BitwiseXor),
            Some(Operator::BarEqual) => Some(BitwiseOr),
            _ => return Ok(lhs),
        };
        let token = self.next()?.unwrap();
        // Right-associative
        let rhs = self.assignment()?;
        Ok(Ast::Assignment {
            operator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            location: token.location,
        })
    }

    fn comma(&mut self) -> ParseResult<Ast<'a>> {
        let mut lhs = self.assignment()?;
        while self.peek_operator()? == Some(Operator::Comma) {
            self.next()?;
            let rhs = self.assignment()?;
            lhs = Ast::Comma {
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }
}

/// Parses a whole expression.
///
/// Returns `None` for an expression with no tokens, whose value is
/// conventionally zero.
pub fn parse(source: &str) -> ParseResult<Option<Ast<'_>>> {
    let mut parser = Parser {
        tokens: Tokens::new(source).peekable(),
        end: 0,
    };
    if parser.peek()?.is_none() {
        return Ok(None);
    }
    let ast = parser.comma()?;
    match parser.peek()? {
        None => Ok(Some(ast)),
        Some(token) => Err((
            ParseErrorCause::Syntax(SyntaxError::UnexpectedToken),
            token.location.clone(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn empty_expression() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn precedence_of_addition_and_multiplication() {
        let ast = parse("1+2*3").unwrap().unwrap();
        assert_matches!(ast, Ast::Binary { operator: BinaryOperator::Add, rhs, .. } => {
            assert_matches!(*rhs, Ast::Binary { operator: BinaryOperator::Multiply, .. });
        });
    }

    #[test]
    fn power_is_right_associative() {
        let ast = parse("2**3**2").unwrap().unwrap();
        assert_matches!(ast, Ast::Binary { operator: BinaryOperator::Power, rhs, .. } => {
            assert_matches!(*rhs, Ast::Binary { operator: BinaryOperator::Power, .. });
        });
    }

    #[test]
    fn assignment_is_right_associative() {
        let ast = parse("a = b = 1").unwrap().unwrap();
        assert_matches!(ast, Ast::Assignment { operator: None, rhs, .. } => {
            assert_matches!(*rhs, Ast::Assignment { operator: None, .. });
        });
    }

    #[test]
    fn conditional_with_nested_assignment() {
        let ast = parse("x ? a = 1 : 2").unwrap().unwrap();
        assert_matches!(ast, Ast::Conditional { then, .. } => {
            assert_matches!(*then, Ast::Assignment { .. });
        });
    }

    #[test]
    fn unclosed_paren() {
        let error = parse("(1+2").unwrap_err();
        assert_eq!(
            error.0,
            ParseErrorCause::Syntax(SyntaxError::UnclosedParen)
        );
        assert_eq!(error.1, 0..1);
    }

    #[test]
    fn missing_operand() {
        let error = parse("1+").unwrap_err();
        assert_eq!(
            error.0,
            ParseErrorCause::Syntax(SyntaxError::MissingOperand)
        );
    }

    #[test]
    fn trailing_garbage() {
        let error = parse("1 2").unwrap_err();
        assert_eq!(
            error.0,
            ParseErrorCause::Syntax(SyntaxError::UnexpectedToken)
        );
        assert_eq!(error.1, 2..3);
    }
}
