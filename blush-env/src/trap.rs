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

//! Trap actions
//!
//! A trap registers a command string against a signal or one of the
//! pseudo-conditions `EXIT`, `DEBUG`, and `ERR`. Signal traps install a
//! catching disposition through the system layer; the executor drains the
//! caught-signal flags between commands and runs the registered actions.

use crate::signal;
use crate::system::{Disposition, Errno, RealSystem};
use std::collections::HashMap;
use std::ffi::c_int;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// Condition a trap action is registered against
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Condition {
    /// Shell exit
    Exit,
    /// Before every simple command
    Debug,
    /// After a command fails outside guarded positions
    Err,
    /// Receipt of a signal
    Signal(c_int),
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Exit => f.write_str("EXIT"),
            Condition::Debug => f.write_str("DEBUG"),
            Condition::Err => f.write_str("ERR"),
            Condition::Signal(number) => match signal::name_from_number(*number) {
                Some(name) => f.write_str(name),
                None => number.fmt(f),
            },
        }
    }
}

/// Error parsing a condition
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("no such signal or condition: {0}")]
pub struct ParseConditionError(pub String);

impl FromStr for Condition {
    type Err = ParseConditionError;
    fn from_str(s: &str) -> Result<Condition, ParseConditionError> {
        match s {
            "EXIT" | "exit" | "0" => Ok(Condition::Exit),
            "DEBUG" | "debug" => Ok(Condition::Debug),
            "ERR" | "err" => Ok(Condition::Err),
            _ => signal::number_from_name(s)
                .map(Condition::Signal)
                .ok_or_else(|| ParseConditionError(s.to_owned())),
        }
    }
}

/// Action taken when a condition occurs
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Action {
    /// Perform the default action (remove the trap).
    #[default]
    Default,
    /// Ignore the condition (`trap '' COND`).
    Ignore,
    /// Execute a command string.
    Command(Rc<str>),
}

/// Collection of trap actions
#[derive(Clone, Debug, Default)]
pub struct TrapSet {
    actions: HashMap<Condition, Action>,
}

impl TrapSet {
    /// Creates an empty trap set.
    #[must_use]
    pub fn new() -> TrapSet {
        Default::default()
    }

    /// Returns the action for a condition.
    #[must_use]
    pub fn get(&self, condition: Condition) -> &Action {
        self.actions.get(&condition).unwrap_or(&Action::Default)
    }

    /// Registers an action, updating the signal disposition.
    pub fn set_action(
        &mut self,
        system: &RealSystem,
        condition: Condition,
        action: Action,
    ) -> Result<(), Errno> {
        if let Condition::Signal(number) = condition {
            let disposition = match &action {
                Action::Default => Disposition::Default,
                Action::Ignore => Disposition::Ignore,
                Action::Command(_) => Disposition::Catch,
            };
            system.sigaction(number, disposition)?;
        }
        if action == Action::Default {
            self.actions.remove(&condition);
        } else {
            self.actions.insert(condition, action);
        }
        Ok(())
    }

    /// Iterates over the registered traps, sorted for listing.
    pub fn iter(&self) -> impl Iterator<Item = (Condition, &Action)> {
        let mut entries: Vec<_> = self
            .actions
            .iter()
            .map(|(&condition, action)| (condition, action))
            .collect();
        entries.sort_unstable_by_key(|&(condition, _)| match condition {
            Condition::Exit => (0, 0),
            Condition::Debug => (1, 0),
            Condition::Err => (2, 0),
            Condition::Signal(number) => (3, number),
        });
        entries.into_iter()
    }

    /// Removes command actions on entry to a subshell, per POSIX.
    ///
    /// Ignored conditions stay ignored.
    pub fn enter_subshell(&mut self, system: &RealSystem) {
        self.actions.retain(|condition, action| {
            if matches!(action, Action::Command(_)) {
                if let Condition::Signal(number) = condition {
                    let _ = system.sigaction(*number, Disposition::Default);
                }
                false
            } else {
                true
            }
        });
    }

    /// Returns the next caught signal that has a command action, with the
    /// action itself.
    #[must_use]
    pub fn take_caught_signal(&self) -> Option<(c_int, Rc<str>)> {
        if !signal::any_caught() {
            return None;
        }
        for number in signal::take_caught() {
            if let Action::Command(command) = self.get(Condition::Signal(number)) {
                return Some((number, Rc::clone(command)));
            }
        }
        None
    }
}
