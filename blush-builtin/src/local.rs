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

//! The `local` built-in
//!
//! Valid only inside a function, including when the function was called
//! from a sourced script; `local` at the top level of a sourced script is
//! an error.

use crate::common::{failure, is_name, split_assignment};
use blush_env::builtin::Result;
use blush_env::semantics::Field;
use blush_env::stack::Frame;
use blush_env::variable::{Scope, Value};
use blush_env::Env;

/// Entry point of the `local` built-in.
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    if !env.stack.contains(&Frame::FunctionBody) {
        return failure(env, "local", "can only be used in a function");
    }

    for field in &args {
        let (name, value) = split_assignment(&field.value);
        if !is_name(name) {
            return failure(env, "local", &format!("{name}: not a valid identifier"));
        }
        match value {
            Some(value) => {
                if let Err(error) = env.variables.assign_scoped(
                    name,
                    Value::Scalar(value.to_owned()),
                    Scope::Local,
                ) {
                    return failure(env, "local", &error.to_string());
                }
            }
            None => {
                // Declare without a value, shadowing any outer variable
                env.variables.get_or_new(name, Scope::Local);
            }
        }
    }
    Result::SUCCESS
}

#[cfg(test)]
mod tests {
    use crate::tests::{run_and_capture, test_env};

    #[test]
    fn local_variable_shadows_and_unshadows() {
        let mut env = test_env();
        let output = run_and_capture(
            &mut env,
            "x=outer\nf() { local x=inner; echo $x; }\nf\necho $x",
        );
        assert_eq!(output, "inner\nouter\n");
    }

    #[test]
    fn local_without_value_shadows_with_unset() {
        let mut env = test_env();
        let output = run_and_capture(
            &mut env,
            "x=outer\nf() { local x; echo [$x]; }\nf\necho $x",
        );
        assert_eq!(output, "[]\nouter\n");
    }

    #[test]
    fn local_outside_function_is_an_error() {
        let mut env = test_env();
        run_and_capture(&mut env, "local x=1");
        assert!(!env.exit_status.is_successful());
    }

    #[test]
    fn local_at_top_level_of_sourced_script_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("lib.sh");
        std::fs::write(&path, "local x=1\n").unwrap();
        let mut env = test_env();
        run_and_capture(&mut env, &format!("source {}\necho $?", path.display()));
        assert!(env.variables.get("x").is_none());
    }

    #[test]
    fn assignment_in_function_without_local_is_global() {
        let mut env = test_env();
        let output = run_and_capture(&mut env, "f() { x=set_inside; }\nf\necho $x");
        assert_eq!(output, "set_inside\n");
    }
}
