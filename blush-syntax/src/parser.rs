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

//! Syntax parser
//!
//! The [`Parser`] reads tokens from a [`Lexer`](lex::Lexer) and builds the
//! abstract syntax tree defined in [`crate::syntax`] by recursive descent.
//! Keywords take effect only in command position; here-document contents
//! are attached when the newline after the containing command is
//! consumed; aliases are substituted for command words, with a guard
//! against recursion.

pub mod error;
pub mod lex;

mod command;
mod compound;
mod core;
mod list;
mod redir;

pub use self::core::Parser;
pub use self::error::{Error, SyntaxError};

/// Entry point: parses a whole program.
///
/// Returns the parsed list, which is empty for input that contains only
/// blanks, comments, and newlines.
pub fn parse_program(
    lexer: &mut lex::Lexer,
    aliases: &crate::alias::AliasSet,
) -> Result<crate::syntax::List, Error> {
    Parser::new(lexer, aliases).program()
}
