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

//! Environment initialization
//!
//! Imports the process environment into shell variables, sets the
//! standard maintained variables (`PWD`, `SHLVL`, prompt defaults), and
//! sources the rc file for interactive shells.

use crate::args::Invocation;
use blush_env::option::ShellOption;
use blush_env::stack::Frame;
use blush_env::variable::{Attr, Scope, Value};
use blush_env::Env;
use blush_syntax::source::Source;

/// Builds the shell environment from the process state and the parsed
/// command line.
pub fn prepare_env(invocation: &Invocation) -> Env {
    let mut env = Env::new();
    blush_builtin::register(&mut env);

    // Import the process environment as exported variables
    for (name, value) in std::env::vars() {
        if env.variables.assign(&name, Value::Scalar(value)).is_ok() {
            env.variables.get_or_new(&name, Scope::Global).attrs |= Attr::Export;
        }
    }

    // Maintained variables
    let shlvl = env
        .variables
        .get_scalar("SHLVL")
        .and_then(|value| value.parse::<i64>().ok())
        .unwrap_or(0)
        + 1;
    let _ = env
        .variables
        .assign("SHLVL", Value::Scalar(shlvl.to_string()));
    env.variables.get_or_new("SHLVL", Scope::Global).attrs |= Attr::Export;

    if let Ok(pwd) = env.system.getcwd() {
        let _ = env.variables.assign("PWD", Value::Scalar(pwd));
        env.variables.get_or_new("PWD", Scope::Global).attrs |= Attr::Export;
    }

    for (name, default) in [
        ("IFS", " \t\n"),
        ("PS1", "$ "),
        ("PS2", "> "),
        ("PS4", "+ "),
    ] {
        if env.variables.get(name).is_none() {
            let _ = env.variables.assign(name, Value::Scalar(default.to_owned()));
        }
    }

    if let Some(arg0) = &invocation.arg0 {
        env.arg0 = arg0.clone();
    } else if let Some(arg0) = std::env::args().next() {
        env.arg0 = arg0;
    }
    env.variables.positional_params_mut().values = invocation.params.clone();

    for &(option, enable) in &invocation.option_changes {
        env.options.set(option, enable);
    }
    env
}

/// Marks the shell interactive and installs the interactive signal
/// dispositions.
pub fn enter_interactive_mode(env: &mut Env) {
    env.options.set(ShellOption::Interactive, true);
    env.options.set(ShellOption::Monitor, true);
    let system = env.system;
    // SIGINT aborts the current line; the shell itself must survive it
    let _ = system.sigaction(libc::SIGINT, blush_env::system::Disposition::Catch);
    let _ = system.sigaction(libc::SIGQUIT, blush_env::system::Disposition::Ignore);
    let _ = system.sigaction(libc::SIGTTOU, blush_env::system::Disposition::Ignore);
}

/// Sources the startup file of an interactive shell.
pub fn run_rc_file(env: &mut Env, invocation: &Invocation) {
    if invocation.norc {
        return;
    }
    let path = match &invocation.rcfile {
        Some(path) => path.clone(),
        None => {
            let Some(home) = env.variables.get_scalar("HOME") else {
                return;
            };
            format!("{home}/.blushrc")
        }
    };
    source_file(env, &path);

    // POSIX-style $ENV, also honored when set
    if let Some(env_file) = env.variables.get_scalar("ENV") {
        let env_file = env_file.into_owned();
        source_file(env, &env_file);
    }
}

fn source_file(env: &mut Env, path: &str) {
    let Ok(code) = std::fs::read_to_string(path) else {
        return;
    };
    let mut guard = env.push_frame(Frame::DotScript);
    let _ = blush_semantics::parse_and_execute(
        &mut guard,
        &code,
        Source::DotScript {
            path: path.to_owned(),
        },
    );
}
