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

//! Parser error types

use crate::source::pretty::{Annotation, AnnotationType, MessageBase};
use crate::source::Location;
use std::borrow::Cow;
use thiserror::Error;

/// Syntax error cause
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{}", self.message())]
#[non_exhaustive]
pub enum SyntaxError {
    /// A single quotation lacks a closing `'`.
    UnclosedSingleQuote,
    /// A double quotation lacks a closing `"`.
    UnclosedDoubleQuote,
    /// A `$'` lacks a closing `'`.
    UnclosedDollarSingleQuote,
    /// A parameter expansion lacks a closing `}`.
    UnclosedParam,
    /// A parameter expansion lacks a name.
    EmptyParam,
    /// A parameter expansion has an invalid modifier.
    InvalidModifier,
    /// A `$(` lacks a closing `)`.
    UnclosedCommandSubstitution,
    /// A `` ` `` lacks a closing `` ` ``.
    UnclosedBackquote,
    /// A `$((` lacks a closing `))`.
    UnclosedArith,
    /// A here-document operator lacks its delimiter word.
    MissingHereDocDelimiter,
    /// A here-document content lacks its terminating delimiter line.
    UnclosedHereDocContent { delimiter: String },
    /// A redirection operator lacks its operand word.
    MissingRedirOperand,
    /// The file descriptor of a redirection is out of range.
    FdOutOfRange,
    /// A command begins with an unexpected keyword or operator.
    InvalidCommandToken,
    /// A token remains where a command separator is required.
    MissingSeparator,
    /// A subshell lacks a closing `)`.
    UnclosedSubshell,
    /// A subshell contains no commands.
    EmptySubshell,
    /// A brace group lacks a closing `}`.
    UnclosedGrouping,
    /// A brace group contains no commands.
    EmptyGrouping,
    /// A clause that requires commands has none.
    EmptyCommandList,
    /// An `if` clause lacks its `then`.
    MissingThen,
    /// An `if` construct lacks its `fi`.
    MissingFi,
    /// A loop lacks its `do`.
    MissingDo,
    /// A loop lacks its `done`.
    MissingDone,
    /// A `case` construct lacks its `in`.
    MissingIn,
    /// A `case` construct lacks its `esac`.
    MissingEsac,
    /// A `case` branch lacks its closing `)`.
    UnclosedPattern,
    /// A `for` loop lacks its variable name.
    MissingForName,
    /// The variable name of a `for` loop is not a valid identifier.
    InvalidForName,
    /// A `(( … ))` command lacks its closing `))`.
    UnclosedArithCommand,
    /// A `[[ … ]]` expression lacks its closing `]]`.
    UnclosedTest,
    /// A `[[ … ]]` expression is malformed.
    InvalidTestExpression,
    /// A function body is not a compound command.
    InvalidFunctionBody,
    /// The name of a function is not a valid word.
    InvalidFunctionName,
    /// An array assignment value lacks its closing `)`.
    UnclosedArrayValue,
}

impl SyntaxError {
    /// Returns a message describing the error.
    #[must_use]
    pub fn message(&self) -> &'static str {
        use SyntaxError::*;
        match self {
            UnclosedSingleQuote => "the single quote is not closed",
            UnclosedDoubleQuote => "the double quote is not closed",
            UnclosedDollarSingleQuote => "the $' quote is not closed",
            UnclosedParam => "the parameter expansion is not closed",
            EmptyParam => "the parameter name is missing",
            InvalidModifier => "the parameter expansion has an invalid modifier",
            UnclosedCommandSubstitution => "the command substitution is not closed",
            UnclosedBackquote => "the backquote is not closed",
            UnclosedArith => "the arithmetic expansion is not closed",
            MissingHereDocDelimiter => "the here-document operator is missing its delimiter",
            UnclosedHereDocContent { .. } => {
                "the here-document content is missing its delimiter line"
            }
            MissingRedirOperand => "the redirection operator is missing its operand",
            FdOutOfRange => "the file descriptor is too large",
            InvalidCommandToken => "a command cannot start with this token",
            MissingSeparator => "a `;` or newline is missing between commands",
            UnclosedSubshell => "the subshell is missing its closing `)`",
            EmptySubshell => "the subshell is missing its content",
            UnclosedGrouping => "the brace group is missing its closing `}`",
            EmptyGrouping => "the brace group is missing its content",
            EmptyCommandList => "one or more commands are required here",
            MissingThen => "the `then` clause is missing",
            MissingFi => "the `if` command is missing its `fi`",
            MissingDo => "the loop is missing its `do` clause",
            MissingDone => "the loop is missing its `done`",
            MissingIn => "the `case` command is missing its `in`",
            MissingEsac => "the `case` command is missing its `esac`",
            UnclosedPattern => "the case pattern is missing its closing `)`",
            MissingForName => "the `for` loop is missing its variable name",
            InvalidForName => "the `for` loop variable name is not a valid identifier",
            UnclosedArithCommand => "the `((` command is missing its closing `))`",
            UnclosedTest => "the `[[` expression is missing its closing `]]`",
            InvalidTestExpression => "the `[[ … ]]` expression is malformed",
            InvalidFunctionBody => "the function body must be a compound command",
            InvalidFunctionName => "the function name is not valid",
            UnclosedArrayValue => "the array assignment is missing its closing `)`",
        }
    }

    /// Returns true if the error may be resolved by reading more input.
    ///
    /// The interactive shell uses this to decide whether to prompt with
    /// `PS2` for a continuation line instead of reporting the error.
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        use SyntaxError::*;
        matches!(
            self,
            UnclosedSingleQuote
                | UnclosedDoubleQuote
                | UnclosedDollarSingleQuote
                | UnclosedParam
                | UnclosedCommandSubstitution
                | UnclosedBackquote
                | UnclosedArith
                | UnclosedHereDocContent { .. }
                | UnclosedSubshell
                | UnclosedGrouping
                | MissingThen
                | MissingFi
                | MissingDo
                | MissingDone
                | MissingIn
                | MissingEsac
                | UnclosedArithCommand
                | UnclosedTest
                | UnclosedArrayValue
        )
    }
}

/// Parser error with its location
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{cause}")]
pub struct Error {
    pub cause: SyntaxError,
    pub location: Location,
}

impl MessageBase for Error {
    fn message_title(&self) -> Cow<'_, str> {
        self.cause.message().into()
    }

    fn main_annotation(&self) -> Annotation<'_> {
        Annotation {
            r#type: AnnotationType::Error,
            label: self.cause.message().into(),
            location: &self.location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_classification() {
        assert!(SyntaxError::UnclosedSingleQuote.is_incomplete());
        assert!(SyntaxError::MissingFi.is_incomplete());
        assert!(!SyntaxError::InvalidCommandToken.is_incomplete());
        assert!(!SyntaxError::EmptyGrouping.is_incomplete());
    }
}
