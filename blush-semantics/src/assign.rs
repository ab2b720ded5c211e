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

//! Assignment execution
//!
//! Performs `name=value`, `name+=value`, `name[index]=value`, and array
//! literal assignments, including the `integer`, `upper`/`lower` case,
//! and `readonly` attribute behaviors. Assigning `PATH` drops the command
//! location cache.

use crate::expansion::{self, Error, ErrorCause};
use blush_env::variable::{Attr, Scope, Value};
use blush_env::Env;
use blush_syntax::syntax::Assign;

/// Where an assignment takes effect
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AssignMode {
    /// Ordinary assignment: the nearest declaring context, else global
    Normal,
    /// Temporary per-command assignment, exported to the command
    Volatile,
}

/// Performs one assignment.
pub fn perform_assignment(
    env: &mut Env,
    assign: &Assign,
    mode: AssignMode,
) -> expansion::Result<()> {
    let new_value = expand_value(env, assign)?;
    let name = assign.name.as_str();

    let read_only_error = |name: &str| Error {
        cause: ErrorCause::ReadOnlyVariable {
            name: name.to_owned(),
        },
        location: assign.location.clone(),
    };

    // Integer attribute: evaluate scalars as arithmetic
    let integer = env
        .variables
        .get(name)
        .is_some_and(|v| v.attrs.contains(Attr::Integer));
    let new_value = if integer {
        match new_value {
            Value::Scalar(text) => {
                let evaluated = crate::expansion::initial::eval_arith_string(
                    env,
                    &text,
                    &assign.location,
                )?;
                Value::Scalar(evaluated.to_string())
            }
            other => other,
        }
    } else {
        new_value
    };

    let old_value = env.variables.get(name).and_then(|v| v.value.clone());

    // An array literal assigned to an associative variable supplies
    // `[key]=value` elements
    let new_value = match (&old_value, new_value) {
        (Some(Value::Assoc(_)), Value::Array(elements)) => {
            let mut map = std::collections::BTreeMap::new();
            for element in elements {
                match element
                    .strip_prefix('[')
                    .and_then(|rest| rest.split_once("]="))
                {
                    Some((key, value)) => {
                        map.insert(key.to_owned(), value.to_owned());
                    }
                    None => {
                        return Err(Error {
                            cause: ErrorCause::BadSubscript(element),
                            location: assign.location.clone(),
                        })
                    }
                }
            }
            Value::Assoc(map)
        }
        (_, value) => value,
    };

    let merged = merge(env, assign, old_value, new_value, &assign.location)?;

    let result = match mode {
        AssignMode::Normal => env.variables.assign(name, merged),
        AssignMode::Volatile => {
            let result = env.variables.assign_scoped(name, merged, Scope::Volatile);
            if result.is_ok() {
                env.variables.get_or_new(name, Scope::Volatile).attrs |= Attr::Export;
            }
            result
        }
    };
    result.map_err(|error| read_only_error(&error.name))?;

    if name == "PATH" {
        env.hashed_commands.clear();
    }
    Ok(())
}

/// Expands the value side of an assignment.
fn expand_value(env: &mut Env, assign: &Assign) -> expansion::Result<Value> {
    match &assign.value {
        blush_syntax::syntax::Scalar(word) => {
            let field = expansion::expand_word(env, word)?;
            Ok(Value::Scalar(field.value))
        }
        blush_syntax::syntax::Array(words) => {
            // Array elements undergo the full expansion including
            // splitting and pathname expansion
            let fields = expansion::expand_words(env, words)?;
            Ok(Value::Array(
                fields.into_iter().map(|field| field.value).collect(),
            ))
        }
    }
}

/// Combines the old and new values according to subscript and append.
fn merge(
    env: &mut Env,
    assign: &Assign,
    old: Option<Value>,
    new: Value,
    location: &blush_syntax::source::Location,
) -> expansion::Result<Value> {
    // Subscripted assignment: `a[i]=v`
    if let Some(subscript) = &assign.subscript {
        let key = expansion::expand_word(env, subscript)?.value;
        let new_scalar = match new {
            Value::Scalar(s) => s,
            _ => {
                return Err(Error {
                    cause: ErrorCause::BadSubscript(key),
                    location: location.clone(),
                })
            }
        };
        return match old {
            Some(Value::Assoc(mut map)) => {
                let merged = if assign.append {
                    format!("{}{}", map.get(&key).map(String::as_str).unwrap_or(""), new_scalar)
                } else {
                    new_scalar
                };
                map.insert(key, merged);
                Ok(Value::Assoc(map))
            }
            old => {
                let index = crate::expansion::initial::eval_arith_string(env, &key, location)?;
                let mut values = match old {
                    Some(Value::Array(values)) => values,
                    Some(Value::Scalar(s)) => vec![s],
                    _ => Vec::new(),
                };
                let index = if index < 0 {
                    index + values.len() as i64
                } else {
                    index
                };
                let index = usize::try_from(index).map_err(|_| Error {
                    cause: ErrorCause::BadSubscript(key),
                    location: location.clone(),
                })?;
                if index >= values.len() {
                    values.resize(index + 1, String::new());
                }
                if assign.append {
                    values[index].push_str(&new_scalar);
                } else {
                    values[index] = new_scalar;
                }
                Ok(Value::Array(values))
            }
        };
    }

    if !assign.append {
        return Ok(new);
    }

    // `name+=value`
    Ok(match (old, new) {
        (None, new) => new,
        (Some(Value::Scalar(mut old)), Value::Scalar(new)) => {
            old.push_str(&new);
            Value::Scalar(old)
        }
        (Some(Value::Array(mut old)), Value::Array(new)) => {
            old.extend(new);
            Value::Array(old)
        }
        (Some(Value::Array(mut old)), Value::Scalar(new)) => {
            // `arr+=x` appends to the first element
            match old.first_mut() {
                Some(first) => first.push_str(&new),
                None => old.push(new),
            }
            Value::Array(old)
        }
        (Some(Value::Scalar(old)), Value::Array(mut new)) => {
            let mut values = vec![old];
            values.append(&mut new);
            Value::Array(values)
        }
        (Some(Value::Assoc(mut old)), Value::Assoc(new)) => {
            old.extend(new);
            Value::Assoc(old)
        }
        (Some(Value::Assoc(map)), _) => Value::Assoc(map),
        // `new` is only ever `Value::Assoc` when `old` is already
        // `Value::Assoc` (see the array-literal-to-assoc conversion
        // above), so these combinations cannot occur.
        (Some(Value::Scalar(_)), Value::Assoc(_)) | (Some(Value::Array(_)), Value::Assoc(_)) => {
            unreachable!("Value::Assoc only appears as `new` when `old` is also Value::Assoc")
        }
    })
}
