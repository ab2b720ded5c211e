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

//! The `break` built-in

use crate::common::{failure, usage_error};
use blush_env::builtin::Result;
use blush_env::semantics::{Divert, ExitStatus, Field};
use blush_env::Env;
use std::ops::ControlFlow::Break;

/// Parses the loop count operand shared by `break` and `continue`.
pub(crate) fn parse_count(env: &mut Env, builtin: &str, args: &[Field]) -> std::result::Result<usize, Result> {
    let count = match args.first() {
        None => 1,
        Some(field) => match field.value.parse::<usize>() {
            Ok(count) if count > 0 => count,
            _ => {
                return Err(usage_error(
                    env,
                    builtin,
                    &format!("{}: loop count must be a positive integer", field.value),
                ))
            }
        },
    };
    let loops = env.stack.loop_count();
    if loops == 0 {
        return Err(failure(env, builtin, "only meaningful in a loop"));
    }
    // A count larger than the nesting addresses the outermost loop
    Ok(count.min(loops))
}

/// Entry point of the `break` built-in.
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    match parse_count(env, "break", &args) {
        Ok(count) => Result {
            exit_status: ExitStatus::SUCCESS,
            divert: Break(Divert::Break { count: count - 1 }),
        },
        Err(result) => result,
    }
}

#[cfg(test)]
mod tests {
    use crate::tests::{run_and_capture, test_env};

    #[test]
    fn break_leaves_innermost_loop() {
        let mut env = test_env();
        let output = run_and_capture(
            &mut env,
            "for x in 1 2 3; do echo $x; break; done\necho after",
        );
        assert_eq!(output, "1\nafter\n");
    }

    #[test]
    fn break_outside_loop_is_an_error() {
        let mut env = test_env();
        run_and_capture(&mut env, "break");
        assert!(!env.exit_status.is_successful());
    }

    #[test]
    fn break_with_excess_count_leaves_all_loops() {
        let mut env = test_env();
        let output = run_and_capture(
            &mut env,
            "for a in 1 2; do for b in 3 4; do break 9; done; echo $a; done\necho out",
        );
        assert_eq!(output, "out\n");
    }
}
