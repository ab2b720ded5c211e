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

//! Parameter expansion

use super::super::attr::{soft_chars, Origin};
use super::super::phrase::{AttrField, Phrase};
use super::super::split;
use super::super::{Error, ErrorCause, Result};
use super::expand_word_attr;
use blush_env::option::ShellOption;
use blush_env::variable::Value;
use blush_env::Env;
use blush_fnmatch::{Config, Pattern, PatternChar};
use blush_syntax::source::Location;
use blush_syntax::syntax::*;

/// Resolved value of a parameter, before modifiers apply
#[derive(Clone, Debug, Eq, PartialEq)]
enum ParamValue {
    /// The parameter is not set.
    Unset,
    /// Single string value
    Scalar(String),
    /// Multiple values that expand to separate fields when quoted
    /// (`"$@"`, `"${arr[@]}"`)
    Fields(Vec<String>),
    /// Multiple values that join on the first IFS character when quoted
    /// (`"$*"`, `"${arr[*]}"`)
    Joined(Vec<String>),
}

/// Expands an unbraced parameter (`$var`, `$1`, `$?`).
pub fn expand_raw(
    env: &mut Env,
    param: &Param,
    quoted: bool,
    location: &Location,
) -> Result<Phrase> {
    let value = resolve(env, param, None, location)?;
    let value = check_nounset(env, value, &param.id, location)?;
    Ok(into_phrase(env, value, quoted))
}

/// Expands a braced parameter with its subscript and modifier.
pub fn expand_braced(env: &mut Env, braced: &BracedParam, quoted: bool) -> Result<Phrase> {
    let location = &braced.location;

    match &braced.modifier {
        Modifier::Indirect => {
            let value = resolve(env, &braced.param, braced.subscript.as_ref(), location)?;
            let name = scalar_view(&value);
            let target = Param::from_id(name.into_owned());
            let value = resolve(env, &target, None, location)?;
            let value = check_nounset(env, value, &target.id, location)?;
            return Ok(into_phrase(env, value, quoted));
        }
        Modifier::Names => {
            let prefix = &braced.param.id;
            let names: Vec<String> = env
                .variables
                .iter_visible()
                .map(|(name, _)| name.to_owned())
                .filter(|name| name.starts_with(prefix.as_str()))
                .collect();
            return Ok(into_phrase(env, ParamValue::Fields(names), quoted));
        }
        Modifier::Keys => {
            let keys = match lookup_variable(env, &braced.param.id) {
                Some(Value::Array(values)) => {
                    (0..values.len()).map(|index| index.to_string()).collect()
                }
                Some(Value::Assoc(map)) => map.keys().cloned().collect(),
                Some(Value::Scalar(_)) => vec!["0".to_owned()],
                None => Vec::new(),
            };
            return Ok(into_phrase(env, ParamValue::Fields(keys), quoted));
        }
        _ => {}
    }

    let value = resolve(env, &braced.param, braced.subscript.as_ref(), location)?;

    match &braced.modifier {
        Modifier::None => {
            let value = check_nounset(env, value, &braced.param.id, location)?;
            Ok(into_phrase(env, value, quoted))
        }

        Modifier::Length => {
            let length = match value {
                ParamValue::Unset => 0,
                ParamValue::Scalar(s) => s.chars().count(),
                ParamValue::Fields(values) | ParamValue::Joined(values) => values.len(),
            };
            Ok(Phrase::from_chars(
                soft_chars(&length.to_string(), quoted),
                false,
            ))
        }

        Modifier::Switch(switch) => expand_switch(env, switch, value, &braced.param, location, quoted),

        Modifier::Trim(trim) => {
            let value = check_nounset(env, value, &braced.param.id, location)?;
            let pattern = word_pattern(env, &trim.pattern)?;
            let value = map_values(value, |s| apply_trim(&s, &pattern, trim.side, trim.length));
            Ok(into_phrase(env, value, quoted))
        }

        Modifier::Subst(subst) => {
            let value = check_nounset(env, value, &braced.param.id, location)?;
            let pattern = word_pattern(env, &subst.pattern)?;
            let replacement = match &subst.replacement {
                Some(word) => expand_word_to_string(env, word)?,
                None => String::new(),
            };
            let value = map_values(value, |s| {
                apply_subst(&s, &pattern, &replacement, subst.anchor, subst.global)
            });
            Ok(into_phrase(env, value, quoted))
        }

        Modifier::Case(conversion) => {
            let value = check_nounset(env, value, &braced.param.id, location)?;
            let pattern = match &conversion.pattern {
                Some(word) => Some(word_pattern(env, word)?),
                None => None,
            };
            let value = map_values(value, |s| {
                apply_case(&s, pattern.as_ref(), conversion.direction, conversion.all)
            });
            Ok(into_phrase(env, value, quoted))
        }

        Modifier::Slice(slice) => {
            let offset = eval_arith_text(env, &slice.offset, location)?;
            let length = match &slice.length {
                Some(text) => Some(eval_arith_text(env, text, location)?),
                None => None,
            };
            let value = apply_slice(value, offset, length);
            Ok(into_phrase(env, value, quoted))
        }

        Modifier::Indirect | Modifier::Names | Modifier::Keys => unreachable!(),
    }
}

/// Looks up the value of a named variable, applying the computed quirks
/// for `RANDOM`, `LINENO`, and `SECONDS`.
fn lookup_variable(env: &Env, name: &str) -> Option<Value> {
    if env.variables.get(name).is_none() {
        match name {
            "RANDOM" => return Some(Value::Scalar(env.next_random().to_string())),
            "LINENO" => return Some(Value::Scalar(env.line_number.get().to_string())),
            "SECONDS" => {
                let elapsed = env.seconds_base.get().elapsed().as_secs();
                return Some(Value::Scalar(elapsed.to_string()));
            }
            _ => {}
        }
    }
    env.variables.get(name).map(|variable| {
        variable
            .value
            .clone()
            .unwrap_or(Value::Scalar(String::new()))
    })
}

/// Resolves a parameter (with optional subscript) to its raw value.
fn resolve(
    env: &mut Env,
    param: &Param,
    subscript: Option<&Subscript>,
    location: &Location,
) -> Result<ParamValue> {
    use SpecialParam::*;
    let positional = |env: &Env| env.variables.positional_params().values.clone();

    let value = match param.r#type {
        ParamType::Special(At) => ParamValue::Fields(positional(env)),
        ParamType::Special(Asterisk) => ParamValue::Joined(positional(env)),
        ParamType::Special(Number) => {
            ParamValue::Scalar(positional(env).len().to_string())
        }
        ParamType::Special(Question) => ParamValue::Scalar(env.exit_status.to_string()),
        ParamType::Special(Hyphen) => ParamValue::Scalar(env.options.short_flags()),
        ParamType::Special(Dollar) => ParamValue::Scalar(env.system.getpid().to_string()),
        ParamType::Special(Exclamation) => {
            ParamValue::Scalar(env.last_async_pid.to_string())
        }
        ParamType::Special(Zero) => ParamValue::Scalar(env.arg0.clone()),
        ParamType::Positional(index) => {
            match index.checked_sub(1).and_then(|i| positional(env).get(i).cloned()) {
                Some(value) => ParamValue::Scalar(value),
                None => ParamValue::Unset,
            }
        }
        ParamType::Variable => {
            let value = lookup_variable(env, &param.id);
            match (value, subscript) {
                (None, _) => ParamValue::Unset,
                (Some(value), None) => match value {
                    Value::Scalar(s) => ParamValue::Scalar(s),
                    // `$arr` is the first element
                    other => match other.as_scalar() {
                        Some(s) => ParamValue::Scalar(s.into_owned()),
                        None => ParamValue::Unset,
                    },
                },
                (Some(value), Some(subscript)) => {
                    subscripted(env, value, subscript, location)?
                }
            }
        }
    };
    Ok(value)
}

fn subscripted(
    env: &mut Env,
    value: Value,
    subscript: &Subscript,
    location: &Location,
) -> Result<ParamValue> {
    let elements = |value: &Value| match value {
        Value::Scalar(s) => vec![s.clone()],
        Value::Array(values) => values.clone(),
        Value::Assoc(map) => map.values().cloned().collect(),
    };
    Ok(match subscript {
        Subscript::At => ParamValue::Fields(elements(&value)),
        Subscript::Star => ParamValue::Joined(elements(&value)),
        Subscript::Index(text) => {
            let key = super::super::expand_text(env, text, location)?;
            match value {
                Value::Assoc(map) => match map.get(&key) {
                    Some(element) => ParamValue::Scalar(element.clone()),
                    None => ParamValue::Unset,
                },
                Value::Scalar(s) => {
                    let index = eval_index(env, &key, location)?;
                    if index == 0 {
                        ParamValue::Scalar(s)
                    } else {
                        ParamValue::Unset
                    }
                }
                Value::Array(values) => {
                    let index = eval_index(env, &key, location)?;
                    let index = if index < 0 {
                        index + values.len() as i64
                    } else {
                        index
                    };
                    match usize::try_from(index).ok().and_then(|i| values.get(i)) {
                        Some(element) => ParamValue::Scalar(element.clone()),
                        None => ParamValue::Unset,
                    }
                }
            }
        }
    })
}

/// Evaluates an already-expanded subscript string as arithmetic.
fn eval_index(env: &mut Env, key: &str, location: &Location) -> Result<i64> {
    let mut arith_env = super::arith::VarEnv { env };
    blush_arith::eval(key, &mut arith_env).map_err(|error| Error {
        cause: ErrorCause::BadSubscript(error.to_string()),
        location: location.clone(),
    })
}

/// Evaluates a text as an arithmetic expression (slice offsets).
fn eval_arith_text(env: &mut Env, text: &Text, location: &Location) -> Result<i64> {
    let expression = super::super::expand_text(env, text, location)?;
    let mut arith_env = super::arith::VarEnv { env };
    blush_arith::eval(&expression, &mut arith_env).map_err(|error| Error {
        cause: ErrorCause::Arith(error.to_string()),
        location: location.clone(),
    })
}

fn check_nounset(
    env: &Env,
    value: ParamValue,
    name: &str,
    location: &Location,
) -> Result<ParamValue> {
    if value == ParamValue::Unset && env.options.get(ShellOption::Nounset) {
        return Err(Error {
            cause: ErrorCause::UnsetParameter {
                name: name.to_owned(),
            },
            location: location.clone(),
        });
    }
    Ok(value)
}

fn scalar_view(value: &ParamValue) -> std::borrow::Cow<'_, str> {
    match value {
        ParamValue::Unset => "".into(),
        ParamValue::Scalar(s) => s.as_str().into(),
        ParamValue::Fields(values) | ParamValue::Joined(values) => values.join(" ").into(),
    }
}

fn map_values(value: ParamValue, f: impl Fn(String) -> String) -> ParamValue {
    match value {
        ParamValue::Unset => ParamValue::Scalar(f(String::new())),
        ParamValue::Scalar(s) => ParamValue::Scalar(f(s)),
        ParamValue::Fields(values) => {
            ParamValue::Fields(values.into_iter().map(f).collect())
        }
        ParamValue::Joined(values) => {
            ParamValue::Joined(values.into_iter().map(f).collect())
        }
    }
}

/// Converts a resolved value into a phrase.
fn into_phrase(env: &Env, value: ParamValue, quoted: bool) -> Phrase {
    match value {
        ParamValue::Unset => Phrase::from_chars(Vec::new(), false),
        ParamValue::Scalar(s) => Phrase::from_chars(soft_chars(&s, quoted), false),
        ParamValue::Joined(values) if quoted => {
            let ifs = split::ifs(env);
            let separator = ifs.chars().next().map(String::from).unwrap_or_default();
            Phrase::from_chars(soft_chars(&values.join(&separator), quoted), false)
        }
        ParamValue::Fields(values) | ParamValue::Joined(values) => Phrase(
            values
                .into_iter()
                .map(|value| AttrField {
                    chars: soft_chars(&value, quoted),
                    quoted: false,
                })
                .collect(),
        ),
    }
}

fn expand_switch(
    env: &mut Env,
    switch: &Switch,
    value: ParamValue,
    param: &Param,
    location: &Location,
    quoted: bool,
) -> Result<Phrase> {
    let triggered = match switch.condition {
        SwitchCondition::Unset => value == ParamValue::Unset,
        SwitchCondition::UnsetOrEmpty => match &value {
            ParamValue::Unset => true,
            ParamValue::Scalar(s) => s.is_empty(),
            ParamValue::Fields(values) | ParamValue::Joined(values) => values.is_empty(),
        },
    };

    match switch.r#type {
        SwitchType::Alter => {
            if triggered {
                Ok(Phrase::zero())
            } else {
                expand_word_softened(env, &switch.word)
            }
        }
        SwitchType::Default => {
            if triggered {
                expand_word_softened(env, &switch.word)
            } else {
                Ok(into_phrase(env, value, quoted))
            }
        }
        SwitchType::Assign => {
            if triggered {
                let new_value = expand_word_to_string(env, &switch.word)?;
                env.variables
                    .assign(&param.id, Value::Scalar(new_value.clone()))
                    .map_err(|error| Error {
                        cause: ErrorCause::ReadOnlyVariable { name: error.name },
                        location: location.clone(),
                    })?;
                Ok(Phrase::from_chars(soft_chars(&new_value, quoted), false))
            } else {
                Ok(into_phrase(env, value, quoted))
            }
        }
        SwitchType::Error => {
            if triggered {
                let message = match expand_word_to_string(env, &switch.word) {
                    Ok(message) if !message.is_empty() => message,
                    _ => "parameter null or not set".to_owned(),
                };
                Err(Error {
                    cause: ErrorCause::EmptyExpansion {
                        name: param.id.clone(),
                        message,
                    },
                    location: location.clone(),
                })
            } else {
                Ok(into_phrase(env, value, quoted))
            }
        }
    }
}

/// Expands a modifier word, marking its unquoted characters as soft so
/// that the surrounding splitting rules treat them as expansion results.
fn expand_word_softened(env: &mut Env, word: &Word) -> Result<Phrase> {
    let mut phrase = expand_word_attr(env, word)?;
    for field in &mut phrase.0 {
        for c in &mut field.chars {
            if !c.is_quoted && c.origin == Origin::Literal {
                c.origin = Origin::SoftExpansion;
            }
        }
    }
    Ok(phrase)
}

fn expand_word_to_string(env: &mut Env, word: &Word) -> Result<String> {
    let phrase = expand_word_attr(env, word)?;
    Ok(phrase
        .0
        .iter()
        .map(AttrField::to_string_value)
        .collect::<Vec<_>>()
        .join(" "))
}

/// Compiles a pattern word, honoring per-character quoting.
fn word_pattern(env: &mut Env, word: &Word) -> Result<Pattern> {
    let phrase = expand_word_attr(env, word)?;
    let chars: Vec<PatternChar> = phrase
        .0
        .iter()
        .flat_map(|field| &field.chars)
        .map(|c| {
            if c.is_pattern_char() {
                PatternChar::Normal(c.value)
            } else {
                PatternChar::Literal(c.value)
            }
        })
        .collect();
    let config = Config {
        extglob: env.options.get(ShellOption::Extglob),
        literal_period: false,
    };
    Pattern::parse(chars, &config).map_err(|error| Error {
        cause: ErrorCause::InvalidPattern(error.to_string()),
        location: word.location.clone(),
    })
}

fn char_boundaries(s: &str) -> Vec<usize> {
    let mut boundaries: Vec<usize> = s.char_indices().map(|(index, _)| index).collect();
    boundaries.push(s.len());
    boundaries
}

fn apply_trim(s: &str, pattern: &Pattern, side: TrimSide, length: TrimLength) -> String {
    let boundaries = char_boundaries(s);
    match side {
        TrimSide::Prefix => {
            let positions: Vec<usize> = match length {
                TrimLength::Shortest => boundaries.clone(),
                TrimLength::Longest => boundaries.iter().rev().copied().collect(),
            };
            for end in positions {
                if pattern.is_match(&s[..end]) {
                    return s[end..].to_owned();
                }
            }
            s.to_owned()
        }
        TrimSide::Suffix => {
            let positions: Vec<usize> = match length {
                TrimLength::Shortest => boundaries.iter().rev().copied().collect(),
                TrimLength::Longest => boundaries.clone(),
            };
            for start in positions {
                if pattern.is_match(&s[start..]) {
                    return s[..start].to_owned();
                }
            }
            s.to_owned()
        }
    }
}

fn apply_subst(
    s: &str,
    pattern: &Pattern,
    replacement: &str,
    anchor: Option<SubstAnchor>,
    global: bool,
) -> String {
    match anchor {
        Some(SubstAnchor::Front) => match pattern.prefix_match_len(s) {
            Some(length) => format!("{replacement}{}", &s[length..]),
            None => s.to_owned(),
        },
        Some(SubstAnchor::Back) => {
            for start in char_boundaries(s) {
                if pattern.is_match(&s[start..]) {
                    return format!("{}{replacement}", &s[..start]);
                }
            }
            s.to_owned()
        }
        None => {
            let mut result = String::new();
            let mut index = 0;
            let mut replaced = false;
            while index < s.len() {
                if !replaced || global {
                    if let Some(length) = pattern.prefix_match_len(&s[index..]) {
                        if length > 0 {
                            result.push_str(replacement);
                            index += length;
                            replaced = true;
                            continue;
                        }
                    }
                }
                let c = s[index..].chars().next().unwrap();
                result.push(c);
                index += c.len_utf8();
            }
            result
        }
    }
}

fn apply_case(
    s: &str,
    pattern: Option<&Pattern>,
    direction: CaseDirection,
    all: bool,
) -> String {
    let convert = |c: char| {
        let matched = match pattern {
            None => true,
            Some(pattern) => pattern.is_match(&c.to_string()),
        };
        if matched {
            match direction {
                CaseDirection::Upper => c.to_uppercase().collect::<String>(),
                CaseDirection::Lower => c.to_lowercase().collect::<String>(),
            }
        } else {
            c.to_string()
        }
    };
    if all {
        s.chars().map(convert).collect()
    } else {
        let mut chars = s.chars();
        match chars.next() {
            None => String::new(),
            Some(first) => convert(first) + chars.as_str(),
        }
    }
}

fn apply_slice(value: ParamValue, offset: i64, length: Option<i64>) -> ParamValue {
    fn slice_list(values: Vec<String>, offset: i64, length: Option<i64>) -> Vec<String> {
        let count = values.len() as i64;
        let start = if offset < 0 {
            (count + offset).max(0)
        } else {
            offset.min(count)
        };
        let end = match length {
            None => count,
            Some(length) if length < 0 => (count + length).max(start),
            Some(length) => (start + length).min(count),
        };
        values[start as usize..end as usize].to_vec()
    }

    match value {
        ParamValue::Unset => ParamValue::Unset,
        ParamValue::Scalar(s) => {
            let chars: Vec<char> = s.chars().collect();
            let sliced = slice_list(
                chars.iter().map(char::to_string).collect(),
                offset,
                length,
            );
            ParamValue::Scalar(sliced.concat())
        }
        ParamValue::Fields(values) => ParamValue::Fields(slice_list(values, offset, length)),
        ParamValue::Joined(values) => ParamValue::Joined(slice_list(values, offset, length)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use blush_syntax::source::Source;
    use std::collections::BTreeMap;

    fn expand(env: &mut Env, input: &str) -> Vec<String> {
        let word = blush_syntax::parser::lex::Lexer::with_source(input, Source::Unknown)
            .word()
            .unwrap();
        expand_word_attr(env, &word)
            .unwrap()
            .0
            .iter()
            .map(AttrField::to_string_value)
            .collect()
    }

    fn expand_one(env: &mut Env, input: &str) -> String {
        let fields = expand(env, input);
        assert_eq!(fields.len(), 1, "{input}: {fields:?}");
        fields.into_iter().next().unwrap()
    }

    fn set(env: &mut Env, name: &str, value: &str) {
        env.variables
            .assign(name, Value::Scalar(value.into()))
            .unwrap();
    }

    fn set_array(env: &mut Env, name: &str, values: &[&str]) {
        env.variables
            .assign(
                name,
                Value::Array(values.iter().map(|s| s.to_string()).collect()),
            )
            .unwrap();
    }

    #[test]
    fn switches() {
        let mut env = Env::new();
        assert_eq!(expand_one(&mut env, "${unset:-default}"), "default");
        assert_eq!(expand_one(&mut env, "${unset-default}"), "default");
        set(&mut env, "empty", "");
        assert_eq!(expand_one(&mut env, "${empty:-default}"), "default");
        assert_eq!(expand_one(&mut env, "${empty-default}"), "");
        set(&mut env, "full", "value");
        assert_eq!(expand_one(&mut env, "${full:-default}"), "value");
        assert_eq!(expand_one(&mut env, "${full:+alt}"), "alt");
        assert_eq!(expand(&mut env, "${unset:+alt}"), Vec::<String>::new());
    }

    #[test]
    fn assign_switch_sets_variable() {
        let mut env = Env::new();
        assert_eq!(expand_one(&mut env, "${x:=new}"), "new");
        assert_eq!(env.variables.get_scalar("x").unwrap(), "new");
    }

    #[test]
    fn error_switch() {
        let mut env = Env::new();
        let word = blush_syntax::parser::lex::Lexer::with_source(
            "${x:?custom message}",
            Source::Unknown,
        )
        .word()
        .unwrap();
        let error = expand_word_attr(&mut env, &word).unwrap_err();
        assert_matches!(error.cause, ErrorCause::EmptyExpansion { name, message } => {
            assert_eq!(name, "x");
            assert_eq!(message, "custom message");
        });
    }

    #[test]
    fn length() {
        let mut env = Env::new();
        set(&mut env, "s", "hello");
        assert_eq!(expand_one(&mut env, "${#s}"), "5");
        set_array(&mut env, "arr", &["a", "b", "c"]);
        assert_eq!(expand_one(&mut env, "${#arr[@]}"), "3");
    }

    #[test]
    fn trims() {
        let mut env = Env::new();
        set(&mut env, "path", "/usr/local/bin");
        assert_eq!(expand_one(&mut env, "${path#*/}"), "usr/local/bin");
        assert_eq!(expand_one(&mut env, "${path##*/}"), "bin");
        set(&mut env, "file", "archive.tar.gz");
        assert_eq!(expand_one(&mut env, "${file%.*}"), "archive.tar");
        assert_eq!(expand_one(&mut env, "${file%%.*}"), "archive");
    }

    #[test]
    fn substitutions() {
        let mut env = Env::new();
        set(&mut env, "s", "HeLlo, WorLd");
        set(&mut env, "t", "banana");
        assert_eq!(expand_one(&mut env, "${t/an/AN}"), "bANana");
        assert_eq!(expand_one(&mut env, "${t//an/AN}"), "bANANa");
        assert_eq!(expand_one(&mut env, "${t/#ban/BAN}"), "BANana");
        assert_eq!(expand_one(&mut env, "${t/%na/NA}"), "banaNA");
        assert_eq!(expand_one(&mut env, "${t/xyz/q}"), "banana");
        assert_eq!(expand_one(&mut env, "${t//an}"), "ba");
    }

    #[test]
    fn case_conversions() {
        let mut env = Env::new();
        set(&mut env, "s", "hello, world");
        assert_eq!(expand_one(&mut env, "${s^^}"), "HELLO, WORLD");
        assert_eq!(expand_one(&mut env, "${s^}"), "Hello, world");
        set(&mut env, "u", "HELLO");
        assert_eq!(expand_one(&mut env, "${u,,}"), "hello");
        assert_eq!(expand_one(&mut env, "${u,}"), "hELLO");
    }

    #[test]
    fn slices() {
        let mut env = Env::new();
        set(&mut env, "s", "Hello, World");
        assert_eq!(expand_one(&mut env, "${s:7:5}"), "World");
        assert_eq!(expand_one(&mut env, "${s:7}"), "World");
        assert_eq!(expand_one(&mut env, "${s: -5}"), "World");
        assert_eq!(expand_one(&mut env, "${s:0:5}"), "Hello");
        assert_eq!(expand_one(&mut env, "${s:3:-3}"), "lo, Wo");
    }

    #[test]
    fn array_expansion() {
        let mut env = Env::new();
        set_array(&mut env, "arr", &["a b", "c"]);
        assert_eq!(expand(&mut env, "\"${arr[@]}\""), ["a b", "c"]);
        assert_eq!(expand_one(&mut env, "\"${arr[*]}\""), "a b c");
        assert_eq!(expand_one(&mut env, "${arr[0]}"), "a b");
        assert_eq!(expand_one(&mut env, "${arr[1]}"), "c");
        assert_eq!(expand_one(&mut env, "${arr[-1]}"), "c");
        assert_eq!(expand_one(&mut env, "$arr"), "a b");
    }

    #[test]
    fn array_index_arithmetic() {
        let mut env = Env::new();
        set_array(&mut env, "arr", &["x", "y", "z"]);
        set(&mut env, "i", "1");
        assert_eq!(expand_one(&mut env, "${arr[i+1]}"), "z");
        assert_eq!(expand_one(&mut env, "${arr[$i]}"), "y");
    }

    #[test]
    fn assoc_expansion() {
        let mut env = Env::new();
        let mut map = BTreeMap::new();
        map.insert("key".to_owned(), "value".to_owned());
        env.variables
            .assign("assoc", Value::Assoc(map))
            .unwrap();
        assert_eq!(expand_one(&mut env, "${assoc[key]}"), "value");
        assert_eq!(expand_one(&mut env, "${!assoc[@]}"), "key");
    }

    #[test]
    fn keys_of_indexed_array() {
        let mut env = Env::new();
        set_array(&mut env, "arr", &["a", "b"]);
        assert_eq!(expand(&mut env, "${!arr[@]}"), ["0", "1"]);
    }

    #[test]
    fn indirection() {
        let mut env = Env::new();
        set(&mut env, "ref", "target");
        set(&mut env, "target", "indirect value");
        assert_eq!(expand_one(&mut env, "${!ref}"), "indirect value");
    }

    #[test]
    fn names_by_prefix() {
        let mut env = Env::new();
        set(&mut env, "pre_one", "1");
        set(&mut env, "pre_two", "2");
        set(&mut env, "other", "3");
        let mut names = expand(&mut env, "${!pre*}");
        names.sort();
        assert_eq!(names, ["pre_one", "pre_two"]);
    }

    #[test]
    fn nounset_error() {
        let mut env = Env::new();
        env.options.set(ShellOption::Nounset, true);
        let word = blush_syntax::parser::lex::Lexer::with_source("$nope", Source::Unknown)
            .word()
            .unwrap();
        let error = expand_word_attr(&mut env, &word).unwrap_err();
        assert_matches!(error.cause, ErrorCause::UnsetParameter { name } => {
            assert_eq!(name, "nope");
        });
    }

    #[test]
    fn special_params() {
        let mut env = Env::new();
        env.exit_status = blush_env::semantics::ExitStatus(7);
        assert_eq!(expand_one(&mut env, "$?"), "7");
        env.variables.positional_params_mut().values =
            vec!["one".into(), "two".into()];
        assert_eq!(expand_one(&mut env, "$#"), "2");
        assert_eq!(expand_one(&mut env, "$1"), "one");
        assert_eq!(expand(&mut env, "$nine9"), [""]);
    }
}
