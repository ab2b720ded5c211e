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

//! Shell options
//!
//! Options are set by `set -e`, `set -o errexit`, and the command line.
//! The [`OptionSet`] is an `enumset`-backed bit set.

use enumset::{EnumSet, EnumSetType};
use std::str::FromStr;
use thiserror::Error;

/// Shell option
#[derive(Debug, EnumSetType)]
pub enum ShellOption {
    /// Exit on a command failure outside guarded positions (`-e`)
    Errexit,
    /// Treat expansion of unset variables as an error (`-u`)
    Nounset,
    /// Print each command before executing it (`-x`)
    Xtrace,
    /// A pipeline's status is its rightmost non-zero status
    Pipefail,
    /// Disable pathname expansion (`-f`)
    Noglob,
    /// Echo input lines as they are read (`-v`)
    Verbose,
    /// The shell is interactive (`-i`)
    Interactive,
    /// Follow stricter POSIX behavior
    Posix,
    /// Enable job control (`-m`)
    Monitor,
    /// Refuse `>` redirection onto existing files (`-C`)
    Noclobber,
    /// Read commands but do not execute them (`-n`)
    NoExec,
    /// Recognize extended glob operators (`?(…)` and friends)
    Extglob,
}

impl ShellOption {
    /// Long name of the option, as used with `set -o`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        use ShellOption::*;
        match self {
            Errexit => "errexit",
            Nounset => "nounset",
            Xtrace => "xtrace",
            Pipefail => "pipefail",
            Noglob => "noglob",
            Verbose => "verbose",
            Interactive => "interactive",
            Posix => "posix",
            Monitor => "monitor",
            Noclobber => "noclobber",
            NoExec => "noexec",
            Extglob => "extglob",
        }
    }

    /// Single-letter flag of the option, if it has one.
    #[must_use]
    pub const fn short_flag(self) -> Option<char> {
        use ShellOption::*;
        match self {
            Errexit => Some('e'),
            Nounset => Some('u'),
            Xtrace => Some('x'),
            Noglob => Some('f'),
            Verbose => Some('v'),
            Interactive => Some('i'),
            Monitor => Some('m'),
            Noclobber => Some('C'),
            NoExec => Some('n'),
            Pipefail | Posix | Extglob => None,
        }
    }

    /// Finds the option for a single-letter flag.
    #[must_use]
    pub fn from_short_flag(flag: char) -> Option<ShellOption> {
        EnumSet::<ShellOption>::all()
            .iter()
            .find(|option| option.short_flag() == Some(flag))
    }
}

/// Error parsing an option name
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("no such option: {0}")]
pub struct UnknownOption(pub String);

impl FromStr for ShellOption {
    type Err = UnknownOption;
    fn from_str(s: &str) -> Result<ShellOption, UnknownOption> {
        EnumSet::<ShellOption>::all()
            .iter()
            .find(|option| option.name() == s)
            .ok_or_else(|| UnknownOption(s.to_owned()))
    }
}

/// Set of enabled shell options
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct OptionSet {
    set: EnumSet<ShellOption>,
}

impl OptionSet {
    /// Creates an empty option set.
    #[must_use]
    pub fn new() -> OptionSet {
        Default::default()
    }

    /// Returns true if the option is enabled.
    #[must_use]
    pub fn get(&self, option: ShellOption) -> bool {
        self.set.contains(option)
    }

    /// Enables or disables an option.
    pub fn set(&mut self, option: ShellOption, enabled: bool) {
        if enabled {
            self.set.insert(option);
        } else {
            self.set.remove(option);
        }
    }

    /// Iterates over the enabled options.
    pub fn iter_enabled(&self) -> impl Iterator<Item = ShellOption> + '_ {
        self.set.iter()
    }

    /// Renders the enabled single-letter flags, the value of `$-`.
    #[must_use]
    pub fn short_flags(&self) -> String {
        let mut flags: Vec<char> = self.set.iter().filter_map(ShellOption::short_flag).collect();
        flags.sort_unstable();
        flags.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_name_round_trip() {
        for option in EnumSet::<ShellOption>::all() {
            assert_eq!(option.name().parse(), Ok(option));
        }
        assert!("no-such".parse::<ShellOption>().is_err());
    }

    #[test]
    fn short_flags() {
        assert_eq!(ShellOption::from_short_flag('e'), Some(ShellOption::Errexit));
        assert_eq!(ShellOption::from_short_flag('z'), None);
    }

    #[test]
    fn set_and_get() {
        let mut options = OptionSet::new();
        assert!(!options.get(ShellOption::Errexit));
        options.set(ShellOption::Errexit, true);
        assert!(options.get(ShellOption::Errexit));
        options.set(ShellOption::Errexit, false);
        assert!(!options.get(ShellOption::Errexit));
    }

    #[test]
    fn dollar_hyphen_flags() {
        let mut options = OptionSet::new();
        options.set(ShellOption::Errexit, true);
        options.set(ShellOption::Xtrace, true);
        options.set(ShellOption::Pipefail, true);
        assert_eq!(options.short_flags(), "ex");
    }
}
