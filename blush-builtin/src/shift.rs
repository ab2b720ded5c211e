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

//! The `shift` built-in

use crate::common::{failure, usage_error};
use blush_env::builtin::Result;
use blush_env::semantics::Field;
use blush_env::Env;

/// Entry point of the `shift` built-in.
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let count = match args.first() {
        None => 1,
        Some(field) => match field.value.parse::<usize>() {
            Ok(count) => count,
            Err(_) => {
                return usage_error(
                    env,
                    "shift",
                    &format!("{}: numeric argument required", field.value),
                )
            }
        },
    };
    let params = &mut env.variables.positional_params_mut().values;
    if count > params.len() {
        return failure(env, "shift", "shift count out of range");
    }
    params.drain(..count);
    Result::SUCCESS
}

#[cfg(test)]
mod tests {
    use crate::tests::{run_and_capture, test_env};

    #[test]
    fn shift_drops_leading_params() {
        let mut env = test_env();
        env.variables.positional_params_mut().values =
            vec!["a".into(), "b".into(), "c".into()];
        let output = run_and_capture(&mut env, "shift\necho $1 $2");
        assert_eq!(output, "b c\n");
    }

    #[test]
    fn shift_more_than_count_fails() {
        let mut env = test_env();
        env.variables.positional_params_mut().values = vec!["a".into()];
        run_and_capture(&mut env, "shift 5");
        assert!(!env.exit_status.is_successful());
    }
}
