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

//! Semantics of the blush shell language.
//!
//! This crate implements the two execution-time halves of the shell: the
//! [expansion engine](expansion), which turns words into argument fields
//! at the moment a command runs, and the [executor](command), which walks
//! the syntax tree, forks pipelines and subshells, applies redirections,
//! and propagates `break`/`continue`/`return`/`exit` control flow.
//!
//! The [`runner`] module ties the parser and executor together for whole
//! scripts, `eval` strings, trap actions, and command substitutions.

pub mod assign;
pub mod command;
pub mod command_search;
pub mod expansion;
pub mod redir;
pub mod runner;
pub mod trap;
pub mod xtrace;

#[doc(no_inline)]
pub use command::Command;
#[doc(no_inline)]
pub use runner::{parse_and_execute, run_script};
