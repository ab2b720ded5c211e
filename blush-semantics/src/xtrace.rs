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

//! Execution tracing (`set -x`)
//!
//! After a simple command is expanded, its fields are printed to standard
//! error prefixed with `$PS4` (default `+ `), quoted so the trace can be
//! pasted back into the shell.

use blush_env::option::ShellOption;
use blush_env::semantics::Field;
use blush_env::Env;
use blush_quote::quoted;
use itertools::Itertools;

/// Prints an execution trace for the expanded command if `xtrace` is on.
pub fn trace_command(env: &mut Env, assignments: &[(String, String)], fields: &[Field]) {
    if !env.options.get(ShellOption::Xtrace) {
        return;
    }
    let prefix = env
        .variables
        .get_scalar("PS4")
        .map(|s| s.into_owned())
        .unwrap_or_else(|| "+ ".to_owned());
    let assignments = assignments
        .iter()
        .map(|(name, value)| format!("{name}={}", quoted(value)));
    let words = fields.iter().map(|field| quoted(&field.value).into_owned());
    let line = assignments.chain(words).format(" ");
    let text = format!("{prefix}{line}\n");
    let _ = env
        .system
        .write_all(blush_syntax::syntax::Fd::STDERR.0, text.as_bytes());
}
