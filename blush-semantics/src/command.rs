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

//! Command execution
//!
//! The [`Command`] trait is implemented on every AST node; execution
//! walks the tree, records each command's exit status in
//! [`Env::exit_status`], and propagates control-flow diverts
//! (`break`/`continue`/`return`/`exit`) as the `Break` side of the
//! returned [`Result`].

pub mod compound_command;
pub mod simple_command;

use crate::trap::{run_err_trap, run_traps_for_caught_signals};
use blush_env::option::ShellOption;
use blush_env::semantics::{Divert, ExitStatus, Result};
use blush_env::stack::Frame;
use blush_env::system::{Disposition, ForkResult, Pid, WaitOutcome};
use blush_env::trap::{Action, Condition};
use blush_env::Env;
use blush_syntax::syntax;
use std::ops::ControlFlow::{Break, Continue};
use std::rc::Rc;

/// Syntactic construct that can be executed
pub trait Command {
    /// Executes this command, updating `env.exit_status`.
    fn execute(&self, env: &mut Env) -> Result;
}

/// Executes each item in sequence, stopping on a divert.
impl Command for syntax::List {
    fn execute(&self, env: &mut Env) -> Result {
        for item in &self.0 {
            item.execute(env)?;
        }
        Continue(())
    }
}

impl Command for syntax::Item {
    fn execute(&self, env: &mut Env) -> Result {
        match &self.async_flag {
            None => {
                let result = self.and_or.execute(env);
                run_traps_for_caught_signals(env)?;
                result
            }
            Some(_) => start_async(env, &self.and_or),
        }
    }
}

/// Starts an and-or list as an asynchronous job.
fn start_async(env: &mut Env, and_or: &Rc<syntax::AndOrList>) -> Result {
    let system = env.system;
    match system.fork() {
        Err(errno) => {
            env.print_error(&format!("cannot fork: {errno}"));
            env.exit_status = ExitStatus::FAILURE;
            Continue(())
        }
        Ok(ForkResult::Child) => {
            env.traps.enter_subshell(&system);
            // An asynchronous command ignores SIGINT and SIGQUIT and
            // reads from /dev/null unless job control is active
            if !env.options.get(ShellOption::Monitor) {
                let _ = system.sigaction(libc::SIGINT, Disposition::Ignore);
                let _ = system.sigaction(libc::SIGQUIT, Disposition::Ignore);
            }
            let result = {
                let mut guard = env.push_frame(Frame::Subshell);
                and_or.execute(&mut guard)
            };
            let status = match result {
                Continue(()) => env.exit_status,
                Break(divert) => divert.exit_status().unwrap_or(env.exit_status),
            };
            system.exit_process(status)
        }
        Ok(ForkResult::Parent { child }) => {
            env.last_async_pid = child;
            env.jobs.add(child, and_or.to_string());
            env.exit_status = ExitStatus::SUCCESS;
            Continue(())
        }
    }
}

impl Command for syntax::AndOrList {
    fn execute(&self, env: &mut Env) -> Result {
        let total = 1 + self.rest.len();
        for index in 0..total {
            let (connector, pipeline) = if index == 0 {
                (None, &self.first)
            } else {
                let (and_or, pipeline) = &self.rest[index - 1];
                (Some(*and_or), pipeline)
            };

            if let Some(connector) = connector {
                let previous = env.exit_status.is_successful();
                let run = match connector {
                    syntax::AndOr::AndThen => previous,
                    syntax::AndOr::OrElse => !previous,
                };
                if !run {
                    continue;
                }
            }

            // Every pipeline but the last is a guarded position
            let guarded = index + 1 < total;
            if guarded {
                let mut guard = env.push_frame(Frame::Condition);
                pipeline.execute(&mut guard)?;
            } else {
                pipeline.execute(env)?;
                check_errexit(env)?;
            }
        }
        Continue(())
    }
}

/// Applies `set -e` and the ERR trap after an unguarded command.
pub fn check_errexit(env: &mut Env) -> Result {
    if env.exit_status.is_successful() || env.stack.in_condition() {
        return Continue(());
    }
    run_err_trap(env)?;
    if env.options.get(ShellOption::Errexit) {
        return Break(Divert::Exit(None));
    }
    Continue(())
}

impl Command for syntax::Pipeline {
    fn execute(&self, env: &mut Env) -> Result {
        if self.commands.is_empty() {
            return Continue(());
        }

        let result = if self.negation {
            let mut guard = env.push_frame(Frame::Condition);
            let result = run_pipeline(&mut guard, &self.commands);
            drop(guard);
            env.exit_status = if env.exit_status.is_successful() {
                ExitStatus::FAILURE
            } else {
                ExitStatus::SUCCESS
            };
            result
        } else {
            run_pipeline(env, &self.commands)
        };
        result
    }
}

fn run_pipeline(env: &mut Env, commands: &[Rc<syntax::Command>]) -> Result {
    if commands.len() == 1 {
        return commands[0].execute(env);
    }

    let system = env.system;
    let count = commands.len();

    // One pipe per adjacent pair
    let mut pipes = Vec::with_capacity(count - 1);
    for _ in 1..count {
        match system.pipe() {
            Ok(pipe) => pipes.push(pipe),
            Err(errno) => {
                for (reader, writer) in pipes {
                    let _ = system.close(reader);
                    let _ = system.close(writer);
                }
                env.print_error(&format!("cannot create pipe: {errno}"));
                env.exit_status = ExitStatus::FAILURE;
                return Continue(());
            }
        }
    }

    let mut children: Vec<Pid> = Vec::with_capacity(count);
    let job_control = env.options.get(ShellOption::Monitor) && env.is_interactive();

    for (index, command) in commands.iter().enumerate() {
        match system.fork() {
            Err(errno) => {
                env.print_error(&format!("cannot fork: {errno}"));
                break;
            }
            Ok(ForkResult::Child) => {
                if job_control {
                    let pgid = children.first().copied().unwrap_or(0);
                    let _ = system.setpgid(0, pgid);
                }
                if index > 0 {
                    let _ = system.dup2(pipes[index - 1].0, 0);
                }
                if index + 1 < count {
                    let _ = system.dup2(pipes[index].1, 1);
                }
                // Close every pipe descriptor the child does not use
                for (reader, writer) in &pipes {
                    let _ = system.close(*reader);
                    let _ = system.close(*writer);
                }

                env.traps.enter_subshell(&system);
                let result = {
                    let mut guard = env.push_frame(Frame::Subshell);
                    command.execute(&mut guard)
                };
                let status = match result {
                    Continue(()) => env.exit_status,
                    Break(divert) => divert.exit_status().unwrap_or(env.exit_status),
                };
                system.exit_process(status)
            }
            Ok(ForkResult::Parent { child }) => {
                if job_control {
                    let pgid = children.first().copied().unwrap_or(child);
                    let _ = system.setpgid(child, pgid);
                }
                children.push(child);
            }
        }
    }

    // The parent consumes no pipe end
    for (reader, writer) in pipes {
        let _ = system.close(reader);
        let _ = system.close(writer);
    }

    if job_control {
        if let Some(&pgid) = children.first() {
            let _ = system.tcsetpgrp(0, pgid);
        }
    }

    let ignorer = ForegroundSignalGuard::new(env);
    let mut last_status = ExitStatus::FAILURE;
    let mut rightmost_failure = None;
    for &child in &children {
        let status = wait_for_child_raw(&system, child);
        if !status.is_successful() {
            rightmost_failure = Some(status);
        }
        last_status = status;
    }
    drop(ignorer);

    if job_control {
        let _ = system.tcsetpgrp(0, system.getpgrp());
    }

    env.exit_status = if env.options.get(ShellOption::Pipefail) {
        rightmost_failure.unwrap_or(last_status)
    } else {
        last_status
    };
    Continue(())
}

/// Ignores SIGINT and SIGQUIT in the shell while a foreground pipeline
/// runs, restoring the previous dispositions afterwards.
pub(crate) struct ForegroundSignalGuard {
    system: blush_env::system::RealSystem,
    restore: Vec<(libc::c_int, Disposition)>,
}

impl ForegroundSignalGuard {
    pub(crate) fn new(env: &Env) -> Self {
        let system = env.system;
        let mut restore = Vec::new();
        for signal in [libc::SIGINT, libc::SIGQUIT] {
            let previous = match env.traps.get(Condition::Signal(signal)) {
                Action::Command(_) => Disposition::Catch,
                Action::Ignore => Disposition::Ignore,
                // The interactive shell catches SIGINT to survive it even
                // without a trap
                Action::Default if signal == libc::SIGINT && env.is_interactive() => {
                    Disposition::Catch
                }
                Action::Default => Disposition::Default,
            };
            if previous != Disposition::Ignore {
                let _ = system.sigaction(signal, Disposition::Ignore);
                restore.push((signal, previous));
            }
        }
        ForegroundSignalGuard { system, restore }
    }
}

impl Drop for ForegroundSignalGuard {
    fn drop(&mut self) {
        for &(signal, disposition) in &self.restore {
            let _ = self.system.sigaction(signal, disposition);
        }
    }
}

/// Waits for a child and converts its wait status to an exit status.
fn wait_for_child_raw(system: &blush_env::system::RealSystem, child: Pid) -> ExitStatus {
    loop {
        match system.wait(child) {
            Ok(WaitOutcome::Exited(_, status)) => return status,
            Ok(WaitOutcome::Signaled(_, signal)) => return ExitStatus::from_signal(signal),
            Ok(WaitOutcome::Stopped(_, _)) => {
                // Without full job-control UI, resume the child so the
                // shell does not hang on it
                let _ = system.kill(child, libc::SIGCONT);
            }
            Ok(WaitOutcome::Continued(_)) => {}
            Err(_) => return ExitStatus::FAILURE,
        }
    }
}

/// Waits for a child process of the current shell.
pub fn wait_for_child(env: &mut Env, child: Pid) -> ExitStatus {
    wait_for_child_raw(&env.system, child)
}

impl Command for syntax::Command {
    fn execute(&self, env: &mut Env) -> Result {
        let result = match self {
            syntax::Command::Simple(command) => command.execute(env),
            syntax::Command::Compound(command) => command.execute(env),
            syntax::Command::Function(definition) => definition.execute(env),
        };
        close_process_substs(env);
        result
    }
}

/// Closes process-substitution descriptors opened for the finished
/// command and reaps the substituted processes.
fn close_process_substs(env: &mut Env) {
    let system = env.system;
    for (fd, pid) in std::mem::take(&mut env.process_substs) {
        let _ = system.close(fd);
        let _ = wait_for_child_raw(&system, pid);
    }
}

impl Command for syntax::FunctionDefinition {
    fn execute(&self, env: &mut Env) -> Result {
        let name = match crate::expansion::expand_word(env, &self.name) {
            Ok(field) => field.value,
            Err(error) => return crate::expansion::report_error(env, &error),
        };
        env.functions.define(blush_env::function::Function {
            name,
            body: Rc::clone(&self.body),
            origin: self.name.location.clone(),
        });
        env.exit_status = ExitStatus::SUCCESS;
        Continue(())
    }
}
