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

//! Helpers shared by the built-in implementations

use blush_env::builtin::Result;
use blush_env::semantics::ExitStatus;
use blush_env::Env;

/// Reports a runtime error of a built-in, with status 1.
pub fn failure(env: &mut Env, builtin: &str, message: &str) -> Result {
    env.print_error(&format!("{builtin}: {message}"));
    Result::FAILURE
}

/// Reports a usage error of a built-in, with status 2.
pub fn usage_error(env: &mut Env, builtin: &str, message: &str) -> Result {
    env.print_error(&format!("{builtin}: {message}"));
    Result::ERROR
}

/// Writes to standard output, reporting a write failure.
pub fn output(env: &mut Env, text: &str) -> Result {
    match env.print(text) {
        Ok(()) => Result::SUCCESS,
        Err(errno) => failure(env, "write", &errno.to_string()),
    }
}

/// Parses a `name=value` operand, as used by `export` and `local`.
///
/// Returns the name and the value, which is `None` when there is no `=`.
pub fn split_assignment(operand: &str) -> (&str, Option<&str>) {
    match operand.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (operand, None),
    }
}

/// Returns true if the string is a valid variable name.
pub fn is_name(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with(|c: char| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parses the optional numeric operand of `exit` and `return`.
pub fn parse_status(operand: &str) -> Option<ExitStatus> {
    operand
        .trim()
        .parse::<i64>()
        .ok()
        .map(|n| ExitStatus((n & 0xFF) as i32))
}
