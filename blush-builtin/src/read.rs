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

//! The `read` built-in
//!
//! Reads one line from standard input, splits it on `$IFS`, and assigns
//! the fields to the named variables (`REPLY` by default). The last
//! variable receives the remainder of the line. Without `-r`, a
//! backslash escapes the next character and a backslash-newline continues
//! the line.

use crate::common::{failure, is_name, usage_error};
use blush_env::builtin::Result;
use blush_env::semantics::{ExitStatus, Field};
use blush_env::variable::Value;
use blush_env::Env;

/// Entry point of the `read` built-in.
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let mut raw = false;
    let mut names = Vec::new();
    for field in &args {
        match field.value.as_str() {
            "-r" => raw = true,
            "--" => {}
            arg if arg.starts_with('-') && arg.len() > 1 => {
                return usage_error(env, "read", &format!("{arg}: unknown option"));
            }
            name => {
                if !is_name(name) {
                    return failure(env, "read", &format!("{name}: not a valid identifier"));
                }
                names.push(name.to_owned());
            }
        }
    }
    if names.is_empty() {
        names.push("REPLY".to_owned());
    }

    let (line, eof) = match read_line(env, raw) {
        Some(result) => result,
        None => {
            // Immediate end of input: variables are cleared
            for name in &names {
                let _ = env.variables.assign(name, Value::Scalar(String::new()));
            }
            return Result::FAILURE;
        }
    };

    let ifs = ifs_chars(env);
    let fields = split_fields(&line, &ifs, names.len());
    for (index, name) in names.iter().enumerate() {
        let value = fields.get(index).cloned().unwrap_or_default();
        if let Err(error) = env.variables.assign(name, Value::Scalar(value)) {
            return failure(env, "read", &error.to_string());
        }
    }

    Result::new(if eof {
        ExitStatus::FAILURE
    } else {
        ExitStatus::SUCCESS
    })
}

fn ifs_chars(env: &Env) -> String {
    env.variables
        .get_scalar("IFS")
        .map(|s| s.into_owned())
        .unwrap_or_else(|| " \t\n".to_owned())
}

/// Reads one logical line. Returns `None` at immediate end of input;
/// otherwise the line and whether it ended at end of input rather than a
/// newline.
fn read_line(env: &mut Env, raw: bool) -> Option<(String, bool)> {
    let system = env.system;
    let mut bytes = Vec::new();
    let mut byte = [0];
    let mut escaped = false;
    loop {
        match system.read(0, &mut byte) {
            Ok(0) => {
                if bytes.is_empty() && !escaped {
                    return None;
                }
                let line = String::from_utf8_lossy(&bytes).into_owned();
                return Some((line, true));
            }
            Ok(_) => {
                let c = byte[0];
                if escaped {
                    escaped = false;
                    if c != b'\n' {
                        bytes.push(c);
                    }
                    continue;
                }
                match c {
                    b'\\' if !raw => escaped = true,
                    b'\n' => {
                        let line = String::from_utf8_lossy(&bytes).into_owned();
                        return Some((line, false));
                    }
                    c => bytes.push(c),
                }
            }
            Err(errno) if errno.0 == libc::EINTR => continue,
            Err(_) => return None,
        }
    }
}

/// Splits the line into at most `count` fields; the last field takes the
/// remainder.
fn split_fields(line: &str, ifs: &str, count: usize) -> Vec<String> {
    let is_sep = |c: char| ifs.contains(c);
    let is_ws_sep = |c: char| is_sep(c) && c.is_whitespace();

    let trimmed = line.trim_matches(is_ws_sep);
    if count <= 1 {
        return vec![trimmed.to_owned()];
    }

    let mut fields = Vec::new();
    let mut rest = trimmed;
    while fields.len() + 1 < count {
        match rest.find(is_sep) {
            None => break,
            Some(index) => {
                fields.push(rest[..index].to_owned());
                rest = rest[index..].trim_start_matches(is_ws_sep);
                // One non-whitespace separator is consumed along with its
                // surrounding whitespace
                if let Some(c) = rest.chars().next() {
                    if is_sep(c) && !c.is_whitespace() {
                        rest = rest[c.len_utf8()..].trim_start_matches(is_ws_sep);
                    }
                }
            }
        }
    }
    fields.push(rest.trim_end_matches(is_ws_sep).to_owned());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{run_and_capture, test_env};

    #[test]
    fn split_basic() {
        assert_eq!(split_fields("a b c", " \t\n", 2), ["a", "b c"]);
        assert_eq!(split_fields("  a  b  ", " \t\n", 3), ["a", "b"]);
        assert_eq!(split_fields("one", " \t\n", 1), ["one"]);
    }

    #[test]
    fn read_from_redirected_stdin() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("input");
        std::fs::write(&path, "first second third\n").unwrap();
        let mut env = test_env();
        let output = run_and_capture(
            &mut env,
            &format!("read a b < {}\necho a=$a\necho b=$b", path.display()),
        );
        assert_eq!(output, "a=first\nb=second third\n");
    }

    #[test]
    fn read_default_variable_is_reply() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("input");
        std::fs::write(&path, "whole line here\n").unwrap();
        let mut env = test_env();
        let output = run_and_capture(
            &mut env,
            &format!("read < {}\necho \"$REPLY\"", path.display()),
        );
        assert_eq!(output, "whole line here\n");
    }

    #[test]
    fn read_at_eof_fails() {
        let mut env = test_env();
        run_and_capture(&mut env, "read x < /dev/null");
        assert!(!env.exit_status.is_successful());
    }

    #[test]
    fn backslash_escapes_separator_unless_raw() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("input");
        std::fs::write(&path, "a\\ b c\n").unwrap();
        let mut env = test_env();
        let output = run_and_capture(
            &mut env,
            &format!("read x y < {}\necho \"$x|$y\"", path.display()),
        );
        assert_eq!(output, "a b|c\n");
    }

    #[test]
    fn while_read_loop() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("input");
        std::fs::write(&path, "one\ntwo\n").unwrap();
        let mut env = test_env();
        let output = run_and_capture(
            &mut env,
            &format!(
                "while read line; do echo got:$line; done < {}",
                path.display()
            ),
        );
        assert_eq!(output, "got:one\ngot:two\n");
    }
}
