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

//! Type definitions for built-in utilities
//!
//! The implementations live in the `blush-builtin` crate and are
//! registered into [`Env::builtins`](crate::Env::builtins) at startup;
//! the executor only sees the function pointers stored here.

use crate::semantics::{Divert, ExitStatus};
use crate::Env;
use std::ops::ControlFlow;

/// Result of a built-in execution
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Result {
    /// Exit status of the built-in
    pub exit_status: ExitStatus,
    /// Control-flow divert requested by the built-in (`break`, `return`,
    /// `exit`, …)
    pub divert: ControlFlow<Divert>,
}

impl Result {
    /// Creates a result with the given exit status and no divert.
    #[must_use]
    pub const fn new(exit_status: ExitStatus) -> Self {
        Result {
            exit_status,
            divert: ControlFlow::Continue(()),
        }
    }

    /// Successful result
    pub const SUCCESS: Result = Result::new(ExitStatus::SUCCESS);
    /// Failed result
    pub const FAILURE: Result = Result::new(ExitStatus::FAILURE);
    /// Usage error result
    pub const ERROR: Result = Result::new(ExitStatus::ERROR);
}

impl From<ExitStatus> for Result {
    fn from(exit_status: ExitStatus) -> Self {
        Result::new(exit_status)
    }
}

/// Type of the function that implements a built-in
pub type Main = fn(&mut Env, Vec<crate::semantics::Field>) -> Result;

/// Built-in utility definition
#[derive(Clone, Copy, Debug)]
pub struct Builtin {
    /// Implementation
    pub execute: Main,
    /// Whether this is a POSIX special built-in
    ///
    /// Special built-ins are found before functions in command search,
    /// and their preceding assignments persist in the current shell.
    pub is_special: bool,
}
