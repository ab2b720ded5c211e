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

//! Type definitions for command execution

use blush_syntax::source::Location;
use std::ffi::c_int;
use std::ops::ControlFlow;
use std::process::{ExitCode, Termination};

/// Resultant string of word expansion
///
/// A field is a string together with the location of the word it came
/// from, kept for error messages that point back at the source.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Field {
    /// String value of the field
    pub value: String,
    /// Location of the originating word
    pub origin: Location,
}

impl Field {
    /// Creates a field with a dummy origin location.
    #[must_use]
    pub fn dummy<S: Into<String>>(value: S) -> Field {
        let value = value.into();
        let origin = Location::dummy(value.clone());
        Field { value, origin }
    }

    /// Creates fields with dummy origin locations.
    pub fn dummies<I, S>(values: I) -> Vec<Field>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        values.into_iter().map(Self::dummy).collect()
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.value.fmt(f)
    }
}

/// Number that summarizes the result of command execution
///
/// The special parameter `$?` expands to the exit status of the last
/// executed command.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ExitStatus(pub c_int);

impl ExitStatus {
    /// Exit status of 0: success
    pub const SUCCESS: ExitStatus = ExitStatus(0);
    /// Exit status of 1: failure
    pub const FAILURE: ExitStatus = ExitStatus(1);
    /// Exit status of 2: error severer than failure
    pub const ERROR: ExitStatus = ExitStatus(2);
    /// Exit status of 126: command found but not executable
    pub const NOEXEC: ExitStatus = ExitStatus(126);
    /// Exit status of 127: command not found
    pub const NOT_FOUND: ExitStatus = ExitStatus(127);

    /// Returns true if and only if the status is zero.
    #[must_use]
    pub const fn is_successful(&self) -> bool {
        self.0 == 0
    }

    /// Returns the exit status for a command killed by the given signal.
    #[must_use]
    pub const fn from_signal(signal: c_int) -> ExitStatus {
        ExitStatus(signal + 128)
    }
}

impl std::fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<c_int> for ExitStatus {
    fn from(value: c_int) -> ExitStatus {
        ExitStatus(value)
    }
}

impl From<ExitStatus> for c_int {
    fn from(exit_status: ExitStatus) -> c_int {
        exit_status.0
    }
}

impl Termination for ExitStatus {
    fn report(self) -> ExitCode {
        (self.0 as u8).into()
    }
}

/// Result of interrupted command execution
///
/// `Divert` values travel up the executor as the `Break` side of a
/// [`ControlFlow`] and are consumed by the syntactic construct they
/// target: loops consume `Continue` and `Break`, function invocations and
/// sourced scripts consume `Return`, and the read-eval loop consumes
/// `Interrupt` and `Exit`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Divert {
    /// Continue the current loop.
    Continue {
        /// Number of enclosing loops to skip first: `0` continues the
        /// innermost loop
        count: usize,
    },
    /// Break the current loop.
    Break {
        /// Number of enclosing loops to skip first: `0` breaks the
        /// innermost loop
        count: usize,
    },
    /// Return from the current function or sourced script.
    Return(Option<ExitStatus>),
    /// Abort the current command; an interactive shell resumes prompting,
    /// a non-interactive shell exits.
    Interrupt(Option<ExitStatus>),
    /// Exit the shell after running the EXIT trap.
    Exit(Option<ExitStatus>),
}

impl Divert {
    /// Returns the exit status the divert carries, if any.
    #[must_use]
    pub fn exit_status(&self) -> Option<ExitStatus> {
        use Divert::*;
        match self {
            Continue { .. } | Break { .. } => None,
            Return(status) | Interrupt(status) | Exit(status) => *status,
        }
    }
}

/// Result of command execution
///
/// Execution that was interrupted mid-way yields `Break(divert)`.
pub type Result<T = ()> = ControlFlow<Divert, T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_status_constants() {
        assert!(ExitStatus::SUCCESS.is_successful());
        assert!(!ExitStatus::FAILURE.is_successful());
        assert_eq!(ExitStatus::NOT_FOUND.0, 127);
    }

    #[test]
    fn signal_exit_status() {
        assert_eq!(ExitStatus::from_signal(2).0, 130);
        assert_eq!(ExitStatus::from_signal(15).0, 143);
    }

    #[test]
    fn divert_exit_status() {
        assert_eq!(Divert::Break { count: 0 }.exit_status(), None);
        assert_eq!(
            Divert::Exit(Some(ExitStatus(3))).exit_status(),
            Some(ExitStatus(3))
        );
    }
}
