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

//! Arithmetic expansion for the shell.
//!
//! This crate evaluates the C-like integer expression language of
//! `$((…))`, `(( … ))`, array subscripts, and the `${var:off:len}`
//! operands. The supported operators are the usual arithmetic,
//! comparison, bitwise, logical, assignment, increment/decrement,
//! exponentiation, conditional, and comma operators, with bash-style
//! number constants (decimal, leading-zero octal, `0x` hexadecimal, and
//! `base#digits`).
//!
//! Variables are accessed through the [`Env`] trait, which the shell
//! implements on its runtime environment; a plain `HashMap` works for
//! standalone use:
//!
//! ```
//! # use std::collections::HashMap;
//! let mut env = HashMap::new();
//! assert_eq!(blush_arith::eval("x = 2 + 3 * 4", &mut env), Ok(14));
//! assert_eq!(env["x"], "14");
//! ```

mod ast;
mod env;
mod eval;
mod token;

pub use ast::{Ast, BinaryOperator, ParseErrorCause, PostfixOperator, PrefixOperator, SyntaxError};
pub use env::Env;
pub use token::TokenError;

use std::fmt::Display;
use std::ops::Range;

/// Cause of an evaluation failure
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorCause<E> {
    /// Error in tokenization
    Token(TokenError),
    /// Error in parsing
    Syntax(SyntaxError),
    /// Variable value that is not a valid number
    InvalidVariableValue(String),
    /// Result or intermediate value out of the `i64` range
    Overflow,
    /// Division or remainder by zero
    DivisionByZero,
    /// Exponentiation with a negative exponent
    NegativeExponent,
    /// Assignment whose left-hand side is not a variable
    AssignmentToValue,
    /// Error accessing a variable
    Env(E),
}

impl<E: Display> Display for ErrorCause<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ErrorCause::*;
        match self {
            Token(e) => e.fmt(f),
            Syntax(e) => e.fmt(f),
            InvalidVariableValue(value) => {
                write!(f, "value {value:?} is not a valid number")
            }
            Overflow => "arithmetic overflow".fmt(f),
            DivisionByZero => "division by zero".fmt(f),
            NegativeExponent => "exponent less than zero".fmt(f),
            AssignmentToValue => "assignment target is not a variable".fmt(f),
            Env(e) => e.fmt(f),
        }
    }
}

/// Evaluation failure with the offending range of the expression
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error<E> {
    pub cause: ErrorCause<E>,
    pub location: Range<usize>,
}

impl<E: Display> Display for Error<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.cause.fmt(f)
    }
}

impl<E: std::fmt::Debug + Display> std::error::Error for Error<E> {}

/// Parses and evaluates an expression.
///
/// An expression with no tokens evaluates to zero.
pub fn eval<E: Env>(expression: &str, env: &mut E) -> Result<i64, Error<E::Error>> {
    let ast = ast::parse(expression).map_err(|(cause, location)| Error {
        cause: match cause {
            ParseErrorCause::Token(e) => ErrorCause::Token(e),
            ParseErrorCause::Syntax(e) => ErrorCause::Syntax(e),
        },
        location,
    })?;
    match ast {
        None => Ok(0),
        Some(ast) => eval::eval(&ast, env),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn run(expression: &str) -> i64 {
        eval(expression, &mut HashMap::new()).unwrap()
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(run(""), 0);
    }

    #[test]
    fn constants_and_precedence() {
        assert_eq!(run("1 + 2 * 3"), 7);
        assert_eq!(run("(1 + 2) * 3"), 9);
        assert_eq!(run("7 / 2"), 3);
        assert_eq!(run("7 % 2"), 1);
        assert_eq!(run("2 ** 10"), 1024);
        assert_eq!(run("2 ** 3 ** 2"), 512);
    }

    #[test]
    fn unary_binds_tighter_than_power() {
        assert_eq!(run("-2 ** 2"), 4);
        assert_eq!(run("!0"), 1);
        assert_eq!(run("~0"), -1);
    }

    #[test]
    fn comparisons_and_logic() {
        assert_eq!(run("1 < 2"), 1);
        assert_eq!(run("2 <= 1"), 0);
        assert_eq!(run("3 == 3 && 4 != 5"), 1);
        assert_eq!(run("0 || 2"), 1);
    }

    #[test]
    fn shifts_and_bitwise() {
        assert_eq!(run("1 << 4"), 16);
        assert_eq!(run("256 >> 4"), 16);
        assert_eq!(run("12 & 10"), 8);
        assert_eq!(run("12 | 10"), 14);
        assert_eq!(run("12 ^ 10"), 6);
    }

    #[test]
    fn conditional_and_comma() {
        assert_eq!(run("1 ? 10 : 20"), 10);
        assert_eq!(run("0 ? 10 : 20"), 20);
        assert_eq!(run("1 + 1, 2 + 2"), 4);
    }

    #[test]
    fn variables_default_to_zero() {
        assert_eq!(run("unset_variable + 3"), 3);
    }

    #[test]
    fn variable_values_are_parsed() {
        let mut env = HashMap::new();
        env.insert("x".to_owned(), "40".to_owned());
        env.insert("neg".to_owned(), "-2".to_owned());
        assert_eq!(eval("x + 2", &mut env), Ok(42));
        assert_eq!(eval("neg * 3", &mut env), Ok(-6));
    }

    #[test]
    fn invalid_variable_value() {
        let mut env = HashMap::new();
        env.insert("x".to_owned(), "not a number".to_owned());
        assert_matches!(
            eval("x + 1", &mut env),
            Err(Error {
                cause: ErrorCause::InvalidVariableValue(_),
                ..
            })
        );
    }

    #[test]
    fn assignments() {
        let mut env = HashMap::new();
        assert_eq!(eval("x = 5", &mut env), Ok(5));
        assert_eq!(env["x"], "5");
        assert_eq!(eval("x += 3", &mut env), Ok(8));
        assert_eq!(eval("x <<= 2", &mut env), Ok(32));
        assert_eq!(env["x"], "32");
    }

    #[test]
    fn increment_and_decrement() {
        let mut env = HashMap::new();
        env.insert("i".to_owned(), "5".to_owned());
        assert_eq!(eval("i++", &mut env), Ok(5));
        assert_eq!(env["i"], "6");
        assert_eq!(eval("++i", &mut env), Ok(7));
        assert_eq!(eval("--i, i--", &mut env), Ok(6));
        assert_eq!(env["i"], "5");
    }

    #[test]
    fn short_circuit_suppresses_side_effects() {
        let mut env = HashMap::new();
        assert_eq!(eval("0 && (x = 1)", &mut env), Ok(0));
        assert_eq!(env.get("x"), None);
        assert_eq!(eval("1 || (x = 1)", &mut env), Ok(1));
        assert_eq!(env.get("x"), None);
        assert_eq!(eval("0 ? (x = 1) : 9", &mut env), Ok(9));
        assert_eq!(env.get("x"), None);
    }

    #[test]
    fn division_by_zero() {
        let mut env = HashMap::new();
        assert_matches!(
            eval("1 / 0", &mut env),
            Err(Error {
                cause: ErrorCause::DivisionByZero,
                ..
            })
        );
        assert_matches!(
            eval("1 % 0", &mut env),
            Err(Error {
                cause: ErrorCause::DivisionByZero,
                ..
            })
        );
    }

    #[test]
    fn overflow() {
        let mut env = HashMap::new();
        assert_matches!(
            eval("9223372036854775807 + 1", &mut env),
            Err(Error {
                cause: ErrorCause::Overflow,
                ..
            })
        );
    }

    #[test]
    fn assignment_to_non_variable() {
        let mut env = HashMap::new();
        assert_matches!(
            eval("1 = 2", &mut env),
            Err(Error {
                cause: ErrorCause::AssignmentToValue,
                ..
            })
        );
    }
}
