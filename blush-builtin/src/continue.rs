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

//! The `continue` built-in

use crate::r#break::parse_count;
use blush_env::builtin::Result;
use blush_env::semantics::{Divert, ExitStatus, Field};
use blush_env::Env;
use std::ops::ControlFlow::Break;

/// Entry point of the `continue` built-in.
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    match parse_count(env, "continue", &args) {
        Ok(count) => Result {
            exit_status: ExitStatus::SUCCESS,
            divert: Break(Divert::Continue { count: count - 1 }),
        },
        Err(result) => result,
    }
}

#[cfg(test)]
mod tests {
    use crate::tests::{run_and_capture, test_env};

    #[test]
    fn continue_skips_rest_of_iteration() {
        let mut env = test_env();
        let output = run_and_capture(
            &mut env,
            "for x in 1 2 3; do if [[ $x == 2 ]]; then continue; fi; echo $x; done",
        );
        assert_eq!(output, "1\n3\n");
    }

    #[test]
    fn continue_n_restarts_outer_loop() {
        let mut env = test_env();
        let output = run_and_capture(
            &mut env,
            "for a in 1 2; do for b in x y; do continue 2; done; echo skipped; done\necho done",
        );
        assert_eq!(output, "done\n");
    }

    #[test]
    fn continue_outside_loop_is_an_error() {
        let mut env = test_env();
        run_and_capture(&mut env, "continue");
        assert!(!env.exit_status.is_successful());
    }
}
