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

//! Simple command execution
//!
//! Expansion happens in source order: assignment values, redirection
//! targets (inside the guard), then command words. Without a command
//! word, the assignments persist in the current shell; with one, they go
//! to a temporary exported context visible only to the executed command.
//! Command search resolves functions, built-ins, and externals; externals
//! run in a forked child where the applied redirections need no
//! restoration.

use super::{wait_for_child, Command};
use crate::assign::{perform_assignment, AssignMode};
use crate::command_search::{search, Target};
use crate::expansion;
use crate::redir::{report_redir_error, RedirGuard};
use crate::trap::run_debug_trap;
use crate::xtrace::trace_command;
use blush_env::builtin::Builtin;
use blush_env::function::Function;
use blush_env::semantics::{Divert, ExitStatus, Field, Result};
use blush_env::stack::Frame;
use blush_env::system::{Disposition, ForkResult};
use blush_env::variable::{Context, PositionalParams};
use blush_env::Env;
use blush_syntax::syntax::{self, Redir};
use std::ffi::CString;
use std::ops::ControlFlow::{Break, Continue};
use std::rc::Rc;

impl Command for syntax::SimpleCommand {
    fn execute(&self, env: &mut Env) -> Result {
        run_debug_trap(env)?;
        update_lineno(env, self);

        // Without a command word, assignments affect the current shell
        if self.words.is_empty() {
            return execute_assignments_only(env, self);
        }

        // Temporary context for per-command assignments
        env.variables.push_context(Context::Volatile);
        let result = execute_with_words(env, self);
        env.variables.pop_context();
        result
    }
}

fn update_lineno(env: &Env, command: &syntax::SimpleCommand) {
    let location = command
        .words
        .first()
        .map(|word| &word.location)
        .or_else(|| command.assigns.first().map(|assign| &assign.location));
    if let Some(location) = location {
        env.line_number.set(location.line_column().0);
    }
}

fn execute_assignments_only(env: &mut Env, command: &syntax::SimpleCommand) -> Result {
    // The status of a command substitution in the values becomes the
    // status of the command
    env.exit_status = ExitStatus::SUCCESS;
    let mut traced = Vec::new();
    for assign in command.assigns.iter() {
        match perform_assignment(env, assign, AssignMode::Normal) {
            Ok(()) => {
                if let Some(value) = env.variables.get_scalar(&assign.name) {
                    traced.push((assign.name.clone(), value.into_owned()));
                }
            }
            Err(error) => return expansion::report_error(env, &error),
        }
    }
    trace_command(env, &traced, &[]);

    if !command.redirs.is_empty() {
        let mut guard = RedirGuard::new(env);
        if let Err(error) = guard.perform_redirs(&command.redirs) {
            let location = &command.redirs[0].body.operand().location;
            let location = location.clone();
            drop(guard);
            report_redir_error(env, &error, &location);
            return Continue(());
        }
    }
    Continue(())
}

fn execute_with_words(env: &mut Env, command: &syntax::SimpleCommand) -> Result {
    // 1. Assignment values
    let mut traced_assigns = Vec::new();
    for assign in command.assigns.iter() {
        match perform_assignment(env, assign, AssignMode::Volatile) {
            Ok(()) => {
                if let Some(value) = env.variables.get_scalar(&assign.name) {
                    traced_assigns.push((assign.name.clone(), value.into_owned()));
                }
            }
            Err(error) => return expansion::report_error(env, &error),
        }
    }

    // 2. Command words
    let fields = match expansion::expand_words(env, &command.words) {
        Ok(fields) => fields,
        Err(error) => return expansion::report_error(env, &error),
    };
    trace_command(env, &traced_assigns, &fields);

    let Some(name) = fields.first() else {
        // All words expanded away; nothing to run
        env.exit_status = ExitStatus::SUCCESS;
        return Continue(());
    };

    match search(env, &name.value) {
        Target::Builtin(builtin) => execute_builtin(env, builtin, &command.redirs, fields),
        Target::Function(function) => {
            execute_function(env, function, &command.redirs, fields)
        }
        Target::External(path) => execute_external(env, &path, &command.redirs, fields),
        Target::NotFound => {
            env.print_error(&format!("{}: command not found", name.value));
            env.exit_status = ExitStatus::NOT_FOUND;
            Continue(())
        }
    }
}

fn execute_builtin(
    env: &mut Env,
    builtin: Builtin,
    redirs: &[Redir],
    mut fields: Vec<Field>,
) -> Result {
    let mut guard = RedirGuard::new(env);
    if let Err(error) = guard.perform_redirs(redirs) {
        let location = redirs
            .first()
            .map(|redir| redir.body.operand().location.clone());
        drop(guard);
        if let Some(location) = location {
            report_redir_error(env, &error, &location);
        }
        return Continue(());
    }

    fields.remove(0);
    let result = (builtin.execute)(&mut guard, fields);
    drop(guard);
    env.exit_status = result.exit_status;
    result.divert
}

fn execute_function(
    env: &mut Env,
    function: Rc<Function>,
    redirs: &[Redir],
    mut fields: Vec<Field>,
) -> Result {
    let mut guard = RedirGuard::new(env);
    if let Err(error) = guard.perform_redirs(redirs) {
        let location = redirs
            .first()
            .map(|redir| redir.body.operand().location.clone());
        drop(guard);
        if let Some(location) = location {
            report_redir_error(env, &error, &location);
        }
        return Continue(());
    }

    fields.remove(0);
    let params = PositionalParams {
        values: fields.into_iter().map(|field| field.value).collect(),
    };
    guard.variables.push_context(Context::Regular {
        positional_params: params,
    });

    let result = {
        let mut frame = guard.push_frame(Frame::FunctionBody);
        function.body.execute(&mut frame)
    };

    guard.variables.pop_context();
    drop(guard);

    // `return` stops here
    match result {
        Break(Divert::Return(status)) => {
            if let Some(status) = status {
                env.exit_status = status;
            }
            Continue(())
        }
        other => other,
    }
}

fn execute_external(env: &mut Env, path: &str, redirs: &[Redir], fields: Vec<Field>) -> Result {
    let system = env.system;
    let location = fields[0].origin.clone();

    match system.fork() {
        Err(errno) => {
            env.print_error(&format!("cannot fork: {errno}"));
            env.exit_status = ExitStatus::FAILURE;
            Continue(())
        }
        Ok(ForkResult::Parent { child }) => {
            let ignorer = super::ForegroundSignalGuard::new(env);
            let status = wait_for_child(env, child);
            drop(ignorer);
            env.exit_status = status;
            let _ = location;
            Continue(())
        }
        Ok(ForkResult::Child) => {
            // Signals caught for traps revert to their defaults
            env.traps.enter_subshell(&system);
            let _ = system.sigaction(libc::SIGINT, Disposition::Default);
            let _ = system.sigaction(libc::SIGQUIT, Disposition::Default);

            let mut guard = RedirGuard::new(env);
            if let Err(error) = guard.perform_redirs(redirs) {
                drop(guard);
                env.print_error(&format!("{error}"));
                system.exit_process(ExitStatus::FAILURE);
            }
            guard.disarm();

            let status = exec_or_report(env, path, &fields);
            system.exit_process(status)
        }
    }
}

/// Executes the external command image; returns only on failure, with
/// the conventional status.
fn exec_or_report(env: &mut Env, path: &str, fields: &[Field]) -> ExitStatus {
    let Ok(c_path) = CString::new(path) else {
        env.print_error(&format!("{path}: invalid command path"));
        return ExitStatus::NOT_FOUND;
    };
    let args: Vec<CString> = fields
        .iter()
        .filter_map(|field| CString::new(field.value.as_str()).ok())
        .collect();
    let envs = env.variables.environ();

    let errno = env.system.execve(&c_path, &args, &envs);
    let status = match errno.0 {
        libc::ENOENT | libc::ENOTDIR => ExitStatus::NOT_FOUND,
        _ => ExitStatus::NOEXEC,
    };
    env.print_error(&format!("{path}: {errno}"));
    status
}
