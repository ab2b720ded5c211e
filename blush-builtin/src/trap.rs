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

//! The `trap` built-in

use crate::common::{failure, output};
use blush_env::builtin::Result;
use blush_env::semantics::Field;
use blush_env::trap::{Action, Condition};
use blush_env::Env;
use blush_quote::quoted;
use std::fmt::Write as _;

/// Entry point of the `trap` built-in.
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let mut args = args.as_slice();
    if let Some(first) = args.first() {
        if first.value == "-p" {
            return list_traps(env);
        }
        if first.value == "--" {
            args = &args[1..];
        }
    }
    let Some((action_field, condition_fields)) = args.split_first() else {
        return list_traps(env);
    };
    if condition_fields.is_empty() {
        return failure(env, "trap", "condition operand is missing");
    }

    let action = match action_field.value.as_str() {
        "-" => Action::Default,
        "" => Action::Ignore,
        command => Action::Command(command.into()),
    };

    let system = env.system;
    for field in condition_fields {
        let condition: Condition = match field.value.parse() {
            Ok(condition) => condition,
            Err(error) => return failure(env, "trap", &error.to_string()),
        };
        if let Err(errno) = env.traps.set_action(&system, condition, action.clone()) {
            return failure(env, "trap", &format!("{}: {errno}", field.value));
        }
    }
    Result::SUCCESS
}

fn list_traps(env: &mut Env) -> Result {
    let mut text = String::new();
    for (condition, action) in env.traps.iter() {
        let rendered = match action {
            Action::Default => continue,
            Action::Ignore => String::new(),
            Action::Command(command) => command.to_string(),
        };
        let _ = writeln!(text, "trap -- {} {condition}", quoted(&rendered));
    }
    output(env, &text)
}

#[cfg(test)]
mod tests {
    use crate::tests::{run_and_capture, test_env};
    use blush_env::trap::{Action, Condition};

    #[test]
    fn trap_registers_and_lists_actions() {
        let mut env = test_env();
        let output = run_and_capture(&mut env, "trap 'echo bye' EXIT INT\ntrap");
        assert!(output.contains("trap -- 'echo bye' EXIT"), "{output}");
        assert!(output.contains("trap -- 'echo bye' INT"), "{output}");
    }

    #[test]
    fn trap_reset_and_ignore() {
        let mut env = test_env();
        run_and_capture(&mut env, "trap 'echo x' TERM\ntrap - TERM\ntrap '' USR1");
        assert_eq!(*env.traps.get(Condition::Signal(libc::SIGTERM)), Action::Default);
        assert_eq!(*env.traps.get(Condition::Signal(libc::SIGUSR1)), Action::Ignore);
    }

    #[test]
    fn unknown_condition_fails() {
        let mut env = test_env();
        run_and_capture(&mut env, "trap 'x' NOSUCHSIG");
        assert!(!env.exit_status.is_successful());
    }

    #[test]
    fn signal_trap_runs_between_commands() {
        let mut env = test_env();
        let output = run_and_capture(
            &mut env,
            "trap 'echo trapped' USR1\nsh -c 'kill -USR1 $PPID'\n:",
        );
        assert!(output.contains("trapped"), "{output}");
    }
}
