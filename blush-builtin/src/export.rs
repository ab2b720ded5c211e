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

//! The `export` and `readonly` built-ins

use crate::common::{failure, is_name, output, split_assignment};
use blush_env::builtin::Result;
use blush_env::semantics::Field;
use blush_env::variable::{Attr, Scope, Value};
use blush_env::Env;
use blush_quote::quoted;
use std::fmt::Write as _;

/// Entry point of the `export` built-in.
pub fn export_main(env: &mut Env, args: Vec<Field>) -> Result {
    attribute_main(env, args, "export", Attr::Export)
}

/// Entry point of the `readonly` built-in.
pub fn readonly_main(env: &mut Env, args: Vec<Field>) -> Result {
    attribute_main(env, args, "readonly", Attr::ReadOnly)
}

fn attribute_main(env: &mut Env, args: Vec<Field>, builtin: &str, attr: Attr) -> Result {
    let mut operands = args.as_slice();
    let mut unexport = false;
    while let Some(first) = operands.first() {
        match first.value.as_str() {
            "-p" => return list(env, builtin, attr),
            "-n" if attr == Attr::Export => {
                unexport = true;
                operands = &operands[1..];
            }
            "--" => operands = &operands[1..],
            _ => break,
        }
    }
    if operands.is_empty() {
        return list(env, builtin, attr);
    }

    for field in operands {
        let (name, value) = split_assignment(&field.value);
        if !is_name(name) {
            return failure(env, builtin, &format!("{name}: not a valid identifier"));
        }
        if let Some(value) = value {
            if let Err(error) = env
                .variables
                .assign(name, Value::Scalar(value.to_owned()))
            {
                return failure(env, builtin, &error.to_string());
            }
        }
        let variable = env.variables.get_or_new(name, Scope::Global);
        if unexport {
            variable.attrs.remove(attr);
        } else {
            variable.attrs.insert(attr);
        }
    }
    Result::SUCCESS
}

fn list(env: &mut Env, builtin: &str, attr: Attr) -> Result {
    let mut text = String::new();
    for (name, variable) in env.variables.iter_visible() {
        if !variable.attrs.contains(attr) {
            continue;
        }
        match &variable.value {
            Some(Value::Scalar(value)) => {
                let _ = writeln!(text, "{builtin} {name}={}", quoted(value));
            }
            _ => {
                let _ = writeln!(text, "{builtin} {name}");
            }
        }
    }
    output(env, &text)
}

#[cfg(test)]
mod tests {
    use crate::tests::{run_and_capture, test_env};
    use blush_env::variable::Attr;

    #[test]
    fn export_marks_variable() {
        let mut env = test_env();
        run_and_capture(&mut env, "export x=1 y");
        assert!(env.variables.get("x").unwrap().attrs.contains(Attr::Export));
        assert!(env.variables.get("y").unwrap().attrs.contains(Attr::Export));
    }

    #[test]
    fn exported_variable_reaches_children() {
        let mut env = test_env();
        let output = run_and_capture(
            &mut env,
            "export greeting=hello\nsh -c 'echo $greeting'",
        );
        assert_eq!(output, "hello\n");
    }

    #[test]
    fn unexported_variable_does_not_reach_children() {
        let mut env = test_env();
        let output = run_and_capture(&mut env, "plain=secret\nsh -c 'echo [$plain]'");
        assert_eq!(output, "[]\n");
    }

    #[test]
    fn export_n_removes_the_flag() {
        let mut env = test_env();
        run_and_capture(&mut env, "export x=1\nexport -n x");
        assert!(!env.variables.get("x").unwrap().attrs.contains(Attr::Export));
    }

    #[test]
    fn readonly_rejects_later_assignment() {
        let mut env = test_env();
        run_and_capture(&mut env, "readonly fixed=1");
        run_and_capture(&mut env, "fixed=2");
        assert!(!env.exit_status.is_successful());
        assert_eq!(env.variables.get_scalar("fixed").unwrap(), "1");
    }

    #[test]
    fn listing_contains_exports() {
        let mut env = test_env();
        let output = run_and_capture(&mut env, "export z=3\nexport -p");
        assert!(output.contains("export z=3"), "{output}");
    }
}
