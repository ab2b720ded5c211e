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

//! Initial expansion: word units to attributed fields
//!
//! The initial expansion resolves tildes, parameters, command
//! substitutions, and arithmetic, producing a [`Phrase`] whose characters
//! remember their origin and quotation for the later splitting and
//! pathname stages.

mod arith;
mod command_subst;
pub mod param;

pub(crate) use arith::eval_expression as eval_arith_string;
pub(crate) use command_subst::{command_substitution, process_substitution};

use super::attr::{hard_chars, literal_chars, soft_chars, AttrChar, Origin};
use super::phrase::{AttrField, Phrase};
use super::Result;
use blush_env::Env;
use blush_syntax::syntax::*;

/// Expands a word into a phrase.
pub fn expand_word_attr(env: &mut Env, word: &Word) -> Result<Phrase> {
    let mut phrase = Phrase::zero();
    for unit in &word.units {
        phrase.append(expand_unit(env, unit)?);
    }
    Ok(phrase)
}

/// Expands a text into a phrase.
///
/// `quoted` tells whether the text is inside double quotes.
pub fn expand_text_attr(env: &mut Env, text: &Text, quoted: bool) -> Result<Phrase> {
    let mut phrase = Phrase::zero();
    for unit in &text.0 {
        phrase.append(expand_text_unit(env, unit, quoted)?);
    }
    Ok(phrase)
}

fn expand_unit(env: &mut Env, unit: &WordUnit) -> Result<Phrase> {
    match unit {
        Unquoted(text_unit) => expand_text_unit(env, text_unit, false),

        SingleQuote(value) => Ok(Phrase::one(AttrField {
            chars: literal_chars(value, true),
            quoted: true,
        })),

        DollarSingleQuote(value) => {
            let chars = value
                .0
                .iter()
                .map(|unit| AttrChar {
                    value: unit.char_value(),
                    origin: Origin::Literal,
                    is_quoted: true,
                })
                .collect();
            Ok(Phrase::one(AttrField {
                chars,
                quoted: true,
            }))
        }

        DoubleQuote(text) => {
            if text.0.is_empty() {
                return Ok(Phrase::one(AttrField {
                    chars: Vec::new(),
                    quoted: true,
                }));
            }
            let mut phrase = expand_text_attr(env, text, true)?;
            for field in &mut phrase.0 {
                field.quoted = true;
            }
            Ok(phrase)
        }

        Tilde(name) => expand_tilde(env, name),

        ProcessSubst {
            direction,
            content,
            location,
        } => {
            let path = process_substitution(env, *direction, content, location)?;
            Ok(Phrase::from_chars(hard_chars(&path), false))
        }
    }
}

pub(crate) fn expand_text_unit(env: &mut Env, unit: &TextUnit, quoted: bool) -> Result<Phrase> {
    match unit {
        Literal(c) => Ok(Phrase::from_chars(
            vec![AttrChar {
                value: *c,
                origin: Origin::Literal,
                is_quoted: quoted,
            }],
            false,
        )),

        Backslashed(c) => Ok(Phrase::from_chars(
            vec![AttrChar {
                value: *c,
                origin: Origin::Literal,
                is_quoted: true,
            }],
            true,
        )),

        RawParam { param, location } => param::expand_raw(env, param, quoted, location),

        TextUnit::BracedParam(braced) => param::expand_braced(env, braced, quoted),

        CommandSubst { content, location } => {
            let output = command_substitution(env, content, location)?;
            Ok(Phrase::from_chars(soft_chars(&output, quoted), false))
        }

        Backquote { content, location } => {
            let mut script = String::new();
            for unit in content {
                match unit {
                    BackquoteUnit::Literal(c) => script.push(*c),
                    BackquoteUnit::Backslashed(c) => script.push(*c),
                }
            }
            let output = command_substitution(env, &script, location)?;
            Ok(Phrase::from_chars(soft_chars(&output, quoted), false))
        }

        Arith { content, location } => arith::expand_arith(env, content, quoted, location),
    }
}

fn expand_tilde(env: &mut Env, name: &str) -> Result<Phrase> {
    let home = if name.is_empty() {
        match env.variables.get_scalar("HOME") {
            Some(home) => Some(home.into_owned()),
            None => env.system.home_dir(""),
        }
    } else {
        env.system.home_dir(name)
    };
    Ok(match home {
        Some(home) => Phrase::from_chars(hard_chars(&home), false),
        // An unknown user leaves the tilde prefix in place
        None => Phrase::from_chars(literal_chars(&format!("~{name}"), false), false),
    })
}
