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

//! The `return` built-in

use crate::common::{failure, parse_status, usage_error};
use blush_env::builtin::Result;
use blush_env::semantics::{Divert, Field};
use blush_env::Env;
use std::ops::ControlFlow::Break;

/// Entry point of the `return` built-in.
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    if !env.stack.can_return() {
        return failure(
            env,
            "return",
            "can only be used in a function or sourced script",
        );
    }
    let status = match args.first() {
        None => env.exit_status,
        Some(field) => match parse_status(&field.value) {
            Some(status) => status,
            None => {
                return usage_error(
                    env,
                    "return",
                    &format!("{}: numeric argument required", field.value),
                )
            }
        },
    };
    Result {
        exit_status: status,
        divert: Break(Divert::Return(Some(status))),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests::{run_and_capture, test_env};
    use blush_env::semantics::ExitStatus;

    #[test]
    fn return_stops_function_with_status() {
        let mut env = test_env();
        let output = run_and_capture(
            &mut env,
            "f() { echo before; return 7; echo after; }\nf\necho status:$?",
        );
        assert_eq!(output, "before\nstatus:7\n");
    }

    #[test]
    fn return_without_operand_keeps_last_status() {
        let mut env = test_env();
        let output = run_and_capture(&mut env, "f() { false; return; }\nf\necho $?");
        assert_eq!(output, "1\n");
    }

    #[test]
    fn return_outside_function_is_an_error() {
        let mut env = test_env();
        run_and_capture(&mut env, "return");
        assert_eq!(env.exit_status, ExitStatus::FAILURE);
    }
}
