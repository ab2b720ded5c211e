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

//! The `declare` (`typeset`) built-in

use crate::common::{failure, is_name, output, split_assignment, usage_error};
use blush_env::builtin::Result;
use blush_env::semantics::Field;
use blush_env::stack::Frame;
use blush_env::variable::{Attr, Scope, Value, Variable};
use blush_env::Env;
use blush_quote::quoted;
use std::collections::BTreeMap;
use std::fmt::Write as _;

#[derive(Clone, Copy, Debug, Default)]
struct Flags {
    indexed: bool,
    assoc: bool,
    print: bool,
    functions: bool,
    global: bool,
    /// Attribute changes: `Some(true)` sets, `Some(false)` clears
    integer: Option<bool>,
    lower: Option<bool>,
    upper: Option<bool>,
    export: Option<bool>,
    readonly: Option<bool>,
}

fn parse_flags(env: &mut Env, args: &[Field]) -> std::result::Result<(Flags, usize), Result> {
    let mut flags = Flags::default();
    let mut index = 0;
    while let Some(field) = args.get(index) {
        let arg = &field.value;
        let set = match arg.chars().next() {
            Some('-') => true,
            Some('+') => false,
            _ => break,
        };
        if arg == "--" {
            index += 1;
            break;
        }
        for c in arg[1..].chars() {
            match c {
                'a' => flags.indexed = set,
                'A' => flags.assoc = set,
                'p' => flags.print = set,
                'f' => flags.functions = set,
                'g' => flags.global = set,
                'i' => flags.integer = Some(set),
                'l' => flags.lower = Some(set),
                'u' => flags.upper = Some(set),
                'x' => flags.export = Some(set),
                'r' => flags.readonly = Some(set),
                _ => {
                    return Err(usage_error(
                        env,
                        "declare",
                        &format!("-{c}: unknown option"),
                    ))
                }
            }
        }
        index += 1;
    }
    Ok((flags, index))
}

/// Entry point of the `declare` built-in.
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let (flags, first_operand) = match parse_flags(env, &args) {
        Ok(parsed) => parsed,
        Err(result) => return result,
    };
    let operands = &args[first_operand..];

    if flags.functions {
        return print_functions(env, operands);
    }
    if flags.print || operands.is_empty() {
        return print_variables(env, operands);
    }

    let scope = if env.stack.contains(&Frame::FunctionBody) && !flags.global {
        Scope::Local
    } else {
        Scope::Global
    };

    for operand in operands {
        let (name, value) = split_assignment(&operand.value);
        if !is_name(name) {
            return failure(env, "declare", &format!("{name}: not a valid identifier"));
        }

        {
            let variable = env.variables.get_or_new(name, scope);
            apply_attr(variable, Attr::Integer, flags.integer);
            apply_attr(variable, Attr::Lower, flags.lower);
            apply_attr(variable, Attr::Upper, flags.upper);
            apply_attr(variable, Attr::Export, flags.export);
            if flags.assoc && variable.value.is_none() {
                variable.value = Some(Value::Assoc(BTreeMap::new()));
            } else if flags.indexed && variable.value.is_none() {
                variable.value = Some(Value::Array(Vec::new()));
            }
        }

        if let Some(value) = value {
            let integer = env
                .variables
                .get(name)
                .is_some_and(|v| v.attrs.contains(Attr::Integer));
            let value = if integer {
                match eval_integer(env, value) {
                    Ok(evaluated) => evaluated,
                    Err(message) => return failure(env, "declare", &message),
                }
            } else {
                value.to_owned()
            };
            if let Err(error) = env
                .variables
                .assign_scoped(name, Value::Scalar(value), scope)
            {
                return failure(env, "declare", &error.to_string());
            }
        }

        // Readonly comes last so the value assignment above still works
        if let Some(readonly) = flags.readonly {
            let variable = env.variables.get_or_new(name, scope);
            apply_attr(variable, Attr::ReadOnly, Some(readonly));
        }
    }
    Result::SUCCESS
}

fn apply_attr(variable: &mut Variable, attr: Attr, change: Option<bool>) {
    match change {
        Some(true) => {
            variable.attrs.insert(attr);
        }
        Some(false) => {
            variable.attrs.remove(attr);
        }
        None => {}
    }
}

/// Evaluates an integer-attribute assignment value.
fn eval_integer(env: &mut Env, expression: &str) -> std::result::Result<String, String> {
    struct Adapter<'a> {
        env: &'a mut Env,
    }
    impl blush_arith::Env for Adapter<'_> {
        type Error = std::convert::Infallible;
        fn get_variable(&self, name: &str) -> std::result::Result<Option<&str>, Self::Error> {
            Ok(self.env.variables.get(name).and_then(|v| {
                v.value.as_ref().and_then(|value| match value {
                    Value::Scalar(s) => Some(s.as_str()),
                    Value::Array(values) => values.first().map(String::as_str),
                    Value::Assoc(map) => map.get("0").map(String::as_str),
                })
            }))
        }
        fn assign_variable(
            &mut self,
            name: &str,
            value: &str,
        ) -> std::result::Result<(), Self::Error> {
            let _ = self
                .env
                .variables
                .assign(name, Value::Scalar(value.to_owned()));
            Ok(())
        }
    }
    let mut adapter = Adapter { env };
    blush_arith::eval(expression, &mut adapter)
        .map(|value| value.to_string())
        .map_err(|error| error.to_string())
}

fn attr_flags(variable: &Variable) -> String {
    let mut flags = String::new();
    match &variable.value {
        Some(Value::Array(_)) => flags.push('a'),
        Some(Value::Assoc(_)) => flags.push('A'),
        _ => {}
    }
    if variable.attrs.contains(Attr::Integer) {
        flags.push('i');
    }
    if variable.attrs.contains(Attr::Lower) {
        flags.push('l');
    }
    if variable.attrs.contains(Attr::ReadOnly) {
        flags.push('r');
    }
    if variable.attrs.contains(Attr::Upper) {
        flags.push('u');
    }
    if variable.attrs.contains(Attr::Export) {
        flags.push('x');
    }
    if flags.is_empty() {
        flags.push('-');
    }
    flags
}

fn render_variable(name: &str, variable: &Variable) -> String {
    let mut line = format!("declare -{} {name}", attr_flags(variable));
    match &variable.value {
        None => {}
        Some(Value::Scalar(value)) => {
            let _ = write!(line, "={}", quoted(value));
        }
        Some(Value::Array(values)) => {
            let rendered: Vec<String> = values
                .iter()
                .enumerate()
                .map(|(i, v)| format!("[{i}]={}", quoted(v)))
                .collect();
            let _ = write!(line, "=({})", rendered.join(" "));
        }
        Some(Value::Assoc(map)) => {
            let rendered: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("[{}]={}", quoted(k), quoted(v)))
                .collect();
            let _ = write!(line, "=({})", rendered.join(" "));
        }
    }
    line.push('\n');
    line
}

fn print_variables(env: &mut Env, operands: &[Field]) -> Result {
    let mut text = String::new();
    if operands.is_empty() {
        for (name, variable) in env.variables.iter_visible() {
            text.push_str(&render_variable(name, variable));
        }
    } else {
        let mut missing = Vec::new();
        for operand in operands {
            let (name, _) = split_assignment(&operand.value);
            match env.variables.get(name) {
                Some(variable) => text.push_str(&render_variable(name, variable)),
                None => missing.push(name.to_owned()),
            }
        }
        if !missing.is_empty() {
            for name in &missing {
                env.print_error(&format!("declare: {name}: not found"));
            }
            let _ = env.print(&text);
            return Result::FAILURE;
        }
    }
    output(env, &text)
}

fn print_functions(env: &mut Env, operands: &[Field]) -> Result {
    let mut text = String::new();
    if operands.is_empty() {
        for function in env.functions.iter_sorted() {
            let _ = writeln!(text, "{}() {}", function.name, function.body);
        }
    } else {
        for operand in operands {
            match env.functions.get(&operand.value) {
                Some(function) => {
                    let _ = writeln!(text, "{}() {}", function.name, function.body);
                }
                None => return failure(env, "declare", &format!("{}: not found", operand.value)),
            }
        }
    }
    output(env, &text)
}
