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

//! Evaluation of parsed expressions

use crate::ast::{Ast, BinaryOperator, PostfixOperator, PrefixOperator};
use crate::env::Env;
use crate::{Error, ErrorCause};
use std::ops::Range;

/// Looks up a variable and interprets its value as an integer.
///
/// An unset variable or an empty value counts as zero.
fn variable_value<E: Env>(
    env: &E,
    name: &str,
    location: &Range<usize>,
) -> Result<i64, Error<E::Error>> {
    let value = env.get_variable(name).map_err(|e| Error {
        cause: ErrorCause::Env(e),
        location: location.clone(),
    })?;
    match value {
        None => Ok(0),
        Some(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(0);
            }
            let (sign, digits) = match text.strip_prefix('-') {
                Some(rest) => (-1, rest),
                None => (1, text.strip_prefix('+').unwrap_or(text)),
            };
            match crate::token::parse_number(digits) {
                Some(number) => Ok(sign * number),
                None => Err(Error {
                    cause: ErrorCause::InvalidVariableValue(text.to_owned()),
                    location: location.clone(),
                }),
            }
        }
    }
}

/// Writes a computed value back to a variable.
fn assign<E: Env>(
    env: &mut E,
    name: &str,
    value: i64,
    location: &Range<usize>,
) -> Result<(), Error<E::Error>> {
    env.assign_variable(name, &value.to_string())
        .map_err(|e| Error {
            cause: ErrorCause::Env(e),
            location: location.clone(),
        })
}

/// Requires a node to be a variable reference.
fn require_lvalue<'a, E>(
    node: &'a Ast<'a>,
    operator_location: &Range<usize>,
) -> Result<(&'a str, &'a Range<usize>), Error<E>> {
    match node {
        Ast::Variable { name, location } => Ok((name, location)),
        _ => Err(Error {
            cause: ErrorCause::AssignmentToValue,
            location: operator_location.clone(),
        }),
    }
}

fn checked<E>(value: Option<i64>, location: &Range<usize>) -> Result<i64, Error<E>> {
    value.ok_or_else(|| Error {
        cause: ErrorCause::Overflow,
        location: location.clone(),
    })
}

fn apply_binary<E>(
    operator: BinaryOperator,
    lhs: i64,
    rhs: i64,
    location: &Range<usize>,
) -> Result<i64, Error<E>> {
    use BinaryOperator::*;
    let overflow = |value| checked(value, location);
    match operator {
        LogicalOr => Ok(((lhs != 0) || (rhs != 0)) as i64),
        LogicalAnd => Ok(((lhs != 0) && (rhs != 0)) as i64),
        BitwiseOr => Ok(lhs | rhs),
        BitwiseXor => Ok(lhs ^ rhs),
        BitwiseAnd => Ok(lhs & rhs),
        Equal => Ok((lhs == rhs) as i64),
        NotEqual => Ok((lhs != rhs) as i64),
        Less => Ok((lhs < rhs) as i64),
        LessEqual => Ok((lhs <= rhs) as i64),
        Greater => Ok((lhs > rhs) as i64),
        GreaterEqual => Ok((lhs >= rhs) as i64),
        ShiftLeft => overflow(u32::try_from(rhs).ok().and_then(|n| lhs.checked_shl(n))),
        ShiftRight => overflow(u32::try_from(rhs).ok().and_then(|n| lhs.checked_shr(n))),
        Add => overflow(lhs.checked_add(rhs)),
        Subtract => overflow(lhs.checked_sub(rhs)),
        Multiply => overflow(lhs.checked_mul(rhs)),
        Divide => {
            if rhs == 0 {
                return Err(Error {
                    cause: ErrorCause::DivisionByZero,
                    location: location.clone(),
                });
            }
            overflow(lhs.checked_div(rhs))
        }
        Remainder => {
            if rhs == 0 {
                return Err(Error {
                    cause: ErrorCause::DivisionByZero,
                    location: location.clone(),
                });
            }
            overflow(lhs.checked_rem(rhs))
        }
        Power => {
            if rhs < 0 {
                return Err(Error {
                    cause: ErrorCause::NegativeExponent,
                    location: location.clone(),
                });
            }
            overflow(
                u32::try_from(rhs)
                    .ok()
                    .and_then(|exponent| lhs.checked_pow(exponent)),
            )
        }
    }
}

/// Evaluates an expression tree.
///
/// Logical operators and the conditional operator short-circuit: side
/// effects in the untaken operand do not happen.
pub fn eval<E: Env>(ast: &Ast, env: &mut E) -> Result<i64, Error<E::Error>> {
    match ast {
        Ast::Number(number) => Ok(*number),

        Ast::Variable { name, location } => variable_value(env, name, location),

        Ast::Prefix {
            operator,
            operand,
            location,
        } => {
            use PrefixOperator::*;
            match operator {
                Plus => eval(operand, env),
                Negate => checked(eval(operand, env)?.checked_neg(), location),
                LogicalNot => Ok((eval(operand, env)? == 0) as i64),
                BitwiseNot => Ok(!eval(operand, env)?),
                Increment | Decrement => {
                    let (name, name_location) = require_lvalue(operand, location)?;
                    let old = variable_value(env, name, name_location)?;
                    let delta = if *operator == Increment { 1 } else { -1 };
                    let new = checked(old.checked_add(delta), location)?;
                    assign(env, name, new, location)?;
                    Ok(new)
                }
            }
        }

        Ast::Postfix {
            operator,
            operand,
            location,
        } => {
            let (name, name_location) = require_lvalue(operand, location)?;
            let old = variable_value(env, name, name_location)?;
            let delta = match operator {
                PostfixOperator::Increment => 1,
                PostfixOperator::Decrement => -1,
            };
            let new = checked(old.checked_add(delta), location)?;
            assign(env, name, new, location)?;
            Ok(old)
        }

        Ast::Binary {
            operator,
            lhs,
            rhs,
            location,
        } => match operator {
            BinaryOperator::LogicalOr => {
                if eval(lhs, env)? != 0 {
                    Ok(1)
                } else {
                    Ok((eval(rhs, env)? != 0) as i64)
                }
            }
            BinaryOperator::LogicalAnd => {
                if eval(lhs, env)? == 0 {
                    Ok(0)
                } else {
                    Ok((eval(rhs, env)? != 0) as i64)
                }
            }
            _ => {
                let lhs = eval(lhs, env)?;
                let rhs = eval(rhs, env)?;
                apply_binary(*operator, lhs, rhs, location)
            }
        },

        Ast::Assignment {
            operator,
            lhs,
            rhs,
            location,
        } => {
            let (name, name_location) = require_lvalue(lhs, location)?;
            let value = eval(rhs, env)?;
            let value = match operator {
                None => value,
                Some(operator) => {
                    let old = variable_value(env, name, name_location)?;
                    apply_binary(*operator, old, value, location)?
                }
            };
            assign(env, name, value, location)?;
            Ok(value)
        }

        Ast::Conditional {
            condition,
            then,
            otherwise,
        } => {
            if eval(condition, env)? != 0 {
                eval(then, env)
            } else {
                eval(otherwise, env)
            }
        }

        Ast::Comma { lhs, rhs } => {
            eval(lhs, env)?;
            eval(rhs, env)
        }
    }
}
