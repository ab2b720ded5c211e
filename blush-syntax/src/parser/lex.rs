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

//! Lexical analysis
//!
//! The [`Lexer`] produces whole-word [`Token`]s: adjacent fragments like
//! `pre${x}post` are glued into one token during word lexing, with the
//! quotation and expansion structure preserved in the word units. Context-
//! sensitive constructs (here-document contents, `[[ ]]` regex operands,
//! `(( ))` arithmetic text) are lexed through dedicated entry points that
//! the parser calls when its state requires them.

mod braced_param;
mod core;
mod dollar;
mod dollar_single;
mod heredoc;
pub mod keyword;
pub mod op;
pub mod tilde;
mod word;

pub use self::core::{is_blank, Lexer, Token, TokenId};
pub use self::keyword::Keyword;
pub use self::op::Operator;
