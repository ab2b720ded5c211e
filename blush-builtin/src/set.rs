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

//! The `set` built-in
//!
//! `set -e`, `set +x`, `set -o errexit`, `set -o` listings, and
//! replacement of the positional parameters. Without arguments, the
//! visible variables are listed in a form that can be sourced again.

use crate::common::usage_error;
use blush_env::builtin::Result;
use blush_env::option::ShellOption;
use blush_env::semantics::Field;
use blush_env::variable::Value;
use blush_env::Env;
use blush_quote::quoted;
use std::fmt::Write as _;

/// Entry point of the `set` built-in.
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    if args.is_empty() {
        return list_variables(env);
    }

    let mut operands = Vec::new();
    let mut args = args.into_iter();
    let mut saw_separator = false;
    while let Some(field) = args.next() {
        let arg = field.value;
        if saw_separator {
            operands.push(arg);
            continue;
        }
        match arg.as_str() {
            "--" => {
                saw_separator = true;
                // `set --` with no operands clears the parameters
                operands.extend(args.by_ref().map(|f| f.value));
            }
            "-o" | "+o" => match args.next() {
                Some(name) => {
                    let enable = arg.starts_with('-');
                    match name.value.parse::<ShellOption>() {
                        Ok(option) => env.options.set(option, enable),
                        Err(error) => return usage_error(env, "set", &error.to_string()),
                    }
                }
                None => return list_options(env),
            },
            _ if arg.starts_with('-') || arg.starts_with('+') => {
                let enable = arg.starts_with('-');
                for flag in arg[1..].chars() {
                    match ShellOption::from_short_flag(flag) {
                        Some(option) => env.options.set(option, enable),
                        None => {
                            return usage_error(env, "set", &format!("-{flag}: unknown option"))
                        }
                    }
                }
            }
            _ => {
                operands.push(arg);
                operands.extend(args.by_ref().map(|f| f.value));
            }
        }
    }

    if saw_separator || !operands.is_empty() {
        env.variables.positional_params_mut().values = operands;
    }
    Result::SUCCESS
}

fn list_variables(env: &mut Env) -> Result {
    let mut text = String::new();
    for (name, variable) in env.variables.iter_visible() {
        match &variable.value {
            Some(Value::Scalar(value)) => {
                let _ = writeln!(text, "{name}={}", quoted(value));
            }
            Some(Value::Array(values)) => {
                let rendered: Vec<String> =
                    values.iter().map(|v| quoted(v).into_owned()).collect();
                let _ = writeln!(text, "{name}=({})", rendered.join(" "));
            }
            Some(Value::Assoc(map)) => {
                let rendered: Vec<String> = map
                    .iter()
                    .map(|(k, v)| format!("[{}]={}", quoted(k), quoted(v)))
                    .collect();
                let _ = writeln!(text, "{name}=({})", rendered.join(" "));
            }
            None => {}
        }
    }
    crate::common::output(env, &text)
}

fn list_options(env: &mut Env) -> Result {
    let mut text = String::new();
    for option in enumset::EnumSet::<ShellOption>::all() {
        let state = if env.options.get(option) { "on" } else { "off" };
        let _ = writeln!(text, "{:15} {state}", option.name());
    }
    crate::common::output(env, &text)
}
