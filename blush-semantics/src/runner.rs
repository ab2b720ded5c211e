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

//! Parsing and executing source code
//!
//! The entry points here are used for whole scripts, `-c` strings,
//! `eval`, `source`, trap actions, and command substitutions. Parse
//! errors never execute a partial tree: the error is reported and the
//! conventional status 2 is set.

use crate::command::Command;
use blush_env::option::ShellOption;
use blush_env::semantics::{Divert, ExitStatus, Result};
use blush_env::Env;
use blush_syntax::parser::lex::Lexer;
use blush_syntax::parser::parse_program;
use blush_syntax::source::pretty::{render, Message};
use blush_syntax::source::Source;
use blush_syntax::syntax::Fd;
use std::ops::ControlFlow::{Break, Continue};
use std::rc::Rc;

/// Reports a parser error to standard error.
pub fn print_syntax_error(env: &mut Env, error: &blush_syntax::parser::Error) {
    let message = render(&Message::from(error));
    let _ = env.system.write_all(Fd::STDERR.0, message.as_bytes());
    let _ = env.system.write_all(Fd::STDERR.0, b"\n");
}

/// Parses a complete source string and executes it.
///
/// On a syntax error the status becomes 2 and nothing is executed; a
/// non-interactive shell additionally exits.
pub fn parse_and_execute(env: &mut Env, code: &str, source: Source) -> Result {
    if env.options.get(ShellOption::Verbose) {
        let _ = env.system.write_all(Fd::STDERR.0, code.as_bytes());
        let _ = env.system.write_all(Fd::STDERR.0, b"\n");
    }

    let aliases = Rc::clone(&env.aliases);
    let mut lexer = Lexer::with_source(code, source);
    let list = match parse_program(&mut lexer, &aliases) {
        Ok(list) => list,
        Err(error) => {
            print_syntax_error(env, &error);
            env.exit_status = ExitStatus::ERROR;
            return if env.is_interactive() {
                Break(Divert::Interrupt(None))
            } else {
                Break(Divert::Exit(Some(ExitStatus::ERROR)))
            };
        }
    };

    if list.0.is_empty() {
        return Continue(());
    }
    if env.options.get(ShellOption::NoExec) {
        return Continue(());
    }
    list.execute(env)
}

/// Runs a whole script, consuming `Exit` diverts into a final status.
///
/// This is the top-level entry for script files, `-c` strings, and
/// standard-input scripts.
pub fn run_script(env: &mut Env, code: &str, source: Source) -> ExitStatus {
    let result = parse_and_execute(env, code, source);
    let status = match result {
        Continue(()) => env.exit_status,
        Break(divert) => divert.exit_status().unwrap_or(env.exit_status),
    };
    env.exit_status = status;
    crate::trap::run_exit_trap(env);
    env.exit_status
}
