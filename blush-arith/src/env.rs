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

//! Abstraction of the variable store accessed during evaluation

use std::collections::HashMap;
use std::convert::Infallible;

/// Variable store the evaluator reads and writes
///
/// The shell implements this trait on its runtime environment. The
/// associated error type surfaces failures like assigning to a read-only
/// variable or referencing an unset variable under `set -u`.
pub trait Env {
    /// Error raised when accessing a variable fails
    type Error;

    /// Returns the value of the named variable, or `None` if unset.
    fn get_variable(&self, name: &str) -> Result<Option<&str>, Self::Error>;

    /// Assigns a value to the named variable.
    fn assign_variable(&mut self, name: &str, value: &str) -> Result<(), Self::Error>;
}

/// Minimal in-memory implementation for tests and standalone use
impl Env for HashMap<String, String> {
    type Error = Infallible;

    fn get_variable(&self, name: &str) -> Result<Option<&str>, Infallible> {
        Ok(self.get(name).map(String::as_str))
    }

    fn assign_variable(&mut self, name: &str, value: &str) -> Result<(), Infallible> {
        self.insert(name.to_owned(), value.to_owned());
        Ok(())
    }
}
