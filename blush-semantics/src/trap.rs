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

//! Trap execution
//!
//! Trap actions run between commands: the signal handler only records
//! caught signals, and the executor calls
//! [`run_traps_for_caught_signals`] at synchronization points. Actions
//! re-enter the full parse-and-execute pipeline; they are not reentrant
//! (a trap body does not run traps).

use crate::runner;
use blush_env::semantics::Result;
use blush_env::stack::Frame;
use blush_env::trap::{Action, Condition};
use blush_env::Env;
use blush_syntax::source::Source;
use std::ops::ControlFlow::Continue;
use std::rc::Rc;

/// Runs the actions for all signals caught since the last check.
pub fn run_traps_for_caught_signals(env: &mut Env) -> Result {
    while let Some((signal, action)) = env.traps.take_caught_signal() {
        let condition = Condition::Signal(signal);
        run_trap_action(env, condition, action)?;
    }
    Continue(())
}

/// Runs the EXIT trap, once, while the shell is exiting.
pub fn run_exit_trap(env: &mut Env) {
    let Action::Command(action) = env.traps.get(Condition::Exit) else {
        return;
    };
    let action = Rc::clone(action);
    // Remove the trap first so an exit inside the trap cannot recurse
    let system = env.system;
    let _ = env.traps.set_action(&system, Condition::Exit, Action::Default);
    let _ = run_trap_action(env, Condition::Exit, action);
}

/// Runs the DEBUG trap before a simple command.
pub fn run_debug_trap(env: &mut Env) -> Result {
    let Action::Command(action) = env.traps.get(Condition::Debug) else {
        return Continue(());
    };
    let action = Rc::clone(action);
    run_trap_action(env, Condition::Debug, action)
}

/// Runs the ERR trap after an unguarded failure.
pub fn run_err_trap(env: &mut Env) -> Result {
    let Action::Command(action) = env.traps.get(Condition::Err) else {
        return Continue(());
    };
    let action = Rc::clone(action);
    run_trap_action(env, Condition::Err, action)
}

fn run_trap_action(env: &mut Env, condition: Condition, action: Rc<str>) -> Result {
    if env.stack.in_trap() {
        // Trap actions do not nest
        return Continue(());
    }
    // `$?` is preserved across the trap body
    let saved_status = env.exit_status;
    let result = {
        let mut guard = env.push_frame(Frame::Trap);
        runner::parse_and_execute(
            &mut guard,
            &action,
            Source::Trap {
                condition: condition.to_string(),
            },
        )
    };
    env.exit_status = saved_status;
    result
}
