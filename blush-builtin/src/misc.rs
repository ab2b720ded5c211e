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

//! The trivial built-ins: `:`, `true`, `false`, and `echo`

use crate::common::output;
use blush_env::builtin::Result;
use blush_env::semantics::Field;
use blush_env::Env;

/// Entry point of the `:` built-in.
pub fn colon_main(_env: &mut Env, _args: Vec<Field>) -> Result {
    Result::SUCCESS
}

/// Entry point of the `true` built-in.
pub fn true_main(_env: &mut Env, _args: Vec<Field>) -> Result {
    Result::SUCCESS
}

/// Entry point of the `false` built-in.
pub fn false_main(_env: &mut Env, _args: Vec<Field>) -> Result {
    Result::FAILURE
}

/// Entry point of the `echo` built-in.
///
/// Supports `-n` (no trailing newline), `-e` (interpret escapes), and
/// `-E` (the default: no escape interpretation).
pub fn echo_main(env: &mut Env, args: Vec<Field>) -> Result {
    let mut newline = true;
    let mut escapes = false;
    let mut operands = args.as_slice();
    while let Some(first) = operands.first() {
        match first.value.as_str() {
            "-n" => newline = false,
            "-e" => escapes = true,
            "-E" => escapes = false,
            _ => break,
        }
        operands = &operands[1..];
    }

    let mut text = String::new();
    for (index, field) in operands.iter().enumerate() {
        if index > 0 {
            text.push(' ');
        }
        if escapes {
            match append_escaped(&mut text, &field.value) {
                EscapeOutcome::Stop => return output(env, &text),
                EscapeOutcome::Done => {}
            }
        } else {
            text.push_str(&field.value);
        }
    }
    if newline {
        text.push('\n');
    }
    output(env, &text)
}

enum EscapeOutcome {
    Done,
    /// `\c` suppresses all further output including the newline
    Stop,
}

fn append_escaped(text: &mut String, value: &str) -> EscapeOutcome {
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            text.push(c);
            continue;
        }
        match chars.next() {
            None => text.push('\\'),
            Some('a') => text.push('\u{7}'),
            Some('b') => text.push('\u{8}'),
            Some('c') => return EscapeOutcome::Stop,
            Some('e') | Some('E') => text.push('\u{1B}'),
            Some('f') => text.push('\u{C}'),
            Some('n') => text.push('\n'),
            Some('r') => text.push('\r'),
            Some('t') => text.push('\t'),
            Some('v') => text.push('\u{B}'),
            Some('\\') => text.push('\\'),
            Some('0') => {
                let mut value = 0u32;
                for _ in 0..3 {
                    match chars.clone().next().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            chars.next();
                            value = value * 8 + digit;
                        }
                        None => break,
                    }
                }
                if let Some(c) = char::from_u32(value) {
                    text.push(c);
                }
            }
            Some('x') => {
                let mut value = 0u32;
                let mut any = false;
                for _ in 0..2 {
                    match chars.clone().next().and_then(|c| c.to_digit(16)) {
                        Some(digit) => {
                            chars.next();
                            value = value * 16 + digit;
                            any = true;
                        }
                        None => break,
                    }
                }
                if any {
                    if let Some(c) = char::from_u32(value) {
                        text.push(c);
                    }
                } else {
                    text.push_str("\\x");
                }
            }
            Some(other) => {
                text.push('\\');
                text.push(other);
            }
        }
    }
    EscapeOutcome::Done
}
