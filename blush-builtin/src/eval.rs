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

//! The `eval` built-in

use blush_env::builtin::Result;
use blush_env::semantics::Field;
use blush_env::Env;
use blush_syntax::source::Source;
use itertools::Itertools;

/// Entry point of the `eval` built-in.
///
/// The operands are joined with spaces and the resulting string runs
/// through the full parse-and-execute pipeline in the current
/// environment.
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let code = args.iter().map(|field| &field.value).format(" ").to_string();
    if code.trim().is_empty() {
        return Result::SUCCESS;
    }
    let divert = blush_semantics::parse_and_execute(env, &code, Source::Eval);
    Result {
        exit_status: env.exit_status,
        divert,
    }
}

#[cfg(test)]
mod tests {
    use crate::tests::{run_and_capture, test_env};

    #[test]
    fn eval_executes_joined_operands() {
        let mut env = test_env();
        let output = run_and_capture(&mut env, "eval echo a b");
        assert_eq!(output, "a b\n");
    }

    #[test]
    fn eval_sees_current_variables_and_sets_them() {
        let mut env = test_env();
        let output = run_and_capture(&mut env, "x=1\neval 'y=$((x + 1))'\necho $y");
        assert_eq!(output, "2\n");
    }

    #[test]
    fn eval_propagates_break() {
        let mut env = test_env();
        let output = run_and_capture(
            &mut env,
            "for x in 1 2; do eval break; echo $x; done\necho after",
        );
        assert_eq!(output, "after\n");
    }

    #[test]
    fn eval_reports_syntax_errors() {
        let mut env = test_env();
        env.options
            .set(blush_env::option::ShellOption::Interactive, true);
        run_and_capture(&mut env, "eval '('");
        assert_eq!(env.exit_status, blush_env::semantics::ExitStatus::ERROR);
    }
}
