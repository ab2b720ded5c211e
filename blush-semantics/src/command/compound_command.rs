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

//! Compound command execution
//!
//! Loops consume `break`/`continue` diverts at their boundary,
//! decrementing the level count for outer loops. Conditions run under a
//! `Condition` frame so `errexit` ignores their failures. A subshell
//! forks; a brace group does not.

use super::{wait_for_child, Command};
use crate::expansion::{self, expand_word, expand_words};
use crate::redir::{report_redir_error, RedirGuard};
use blush_env::option::ShellOption;
use blush_env::semantics::{Divert, ExitStatus, Field, Result};
use blush_env::stack::Frame;
use blush_env::system::ForkResult;
use blush_env::variable::Value;
use blush_env::Env;
use blush_fnmatch::{Config, Pattern, PatternChar};
use blush_syntax::source::Location;
use blush_syntax::syntax::{self, CaseContinuation, CompoundCommand, TestExpr};
use std::ops::ControlFlow::{Break, Continue};

impl Command for syntax::FullCompoundCommand {
    fn execute(&self, env: &mut Env) -> Result {
        if self.redirs.is_empty() {
            return self.command.execute(env);
        }
        let mut guard = RedirGuard::new(env);
        if let Err(error) = guard.perform_redirs(&self.redirs) {
            let location = self.redirs[0].body.operand().location.clone();
            drop(guard);
            report_redir_error(env, &error, &location);
            return Continue(());
        }
        self.command.execute(&mut guard)
    }
}

impl Command for CompoundCommand {
    fn execute(&self, env: &mut Env) -> Result {
        use CompoundCommand::*;
        match self {
            Grouping(body) => body.execute(env),
            Subshell { body, location } => execute_subshell(env, body, location),
            For { name, values, body } => execute_for(env, name, values.as_deref(), body),
            CFor {
                init,
                condition,
                update,
                body,
            } => execute_cfor(env, init, condition, update, body),
            While { condition, body } => execute_loop(env, condition, body, false),
            Until { condition, body } => execute_loop(env, condition, body, true),
            If {
                condition,
                body,
                elifs,
                r#else,
            } => execute_if(env, condition, body, elifs, r#else.as_ref()),
            Case { subject, items } => execute_case(env, subject, items),
            Select { name, values, body } => execute_select(env, name, values.as_deref(), body),
            Arith { expression, location } => execute_arith(env, expression, location),
            Test { expression, location } => execute_test(env, expression, location),
        }
    }
}

fn execute_subshell(env: &mut Env, body: &syntax::List, location: &Location) -> Result {
    let system = env.system;
    match system.fork() {
        Err(errno) => {
            let (line, _) = location.line_column();
            env.print_error(&format!("line {line}: cannot fork: {errno}"));
            env.exit_status = ExitStatus::FAILURE;
            Continue(())
        }
        Ok(ForkResult::Child) => {
            env.traps.enter_subshell(&system);
            let result = {
                let mut guard = env.push_frame(Frame::Subshell);
                body.execute(&mut guard)
            };
            let status = match result {
                Continue(()) => env.exit_status,
                Break(divert) => divert.exit_status().unwrap_or(env.exit_status),
            };
            system.exit_process(status)
        }
        Ok(ForkResult::Parent { child }) => {
            let status = wait_for_child(env, child);
            env.exit_status = status;
            Continue(())
        }
    }
}

/// Runs one loop iteration body, translating `break` and `continue`.
///
/// Returns `Break(flow)` when the enclosing loop must stop; the inner
/// value is then the result of the whole loop.
fn loop_body(env: &mut Env, body: &syntax::List) -> std::ops::ControlFlow<Result> {
    let result = {
        let mut guard = env.push_frame(Frame::Loop);
        body.execute(&mut guard)
    };
    match result {
        Continue(()) => std::ops::ControlFlow::Continue(()),
        Break(Divert::Break { count: 0 }) => std::ops::ControlFlow::Break(Continue(())),
        Break(Divert::Break { count }) => {
            std::ops::ControlFlow::Break(Break(Divert::Break { count: count - 1 }))
        }
        Break(Divert::Continue { count: 0 }) => std::ops::ControlFlow::Continue(()),
        Break(Divert::Continue { count }) => {
            std::ops::ControlFlow::Break(Break(Divert::Continue { count: count - 1 }))
        }
        Break(divert) => std::ops::ControlFlow::Break(Break(divert)),
    }
}

fn execute_for(
    env: &mut Env,
    name: &syntax::Word,
    values: Option<&[syntax::Word]>,
    body: &syntax::List,
) -> Result {
    let name = match expand_word(env, name) {
        Ok(field) => field.value,
        Err(error) => return expansion::report_error(env, &error),
    };
    let fields = match values {
        Some(words) => match expand_words(env, words) {
            Ok(fields) => fields,
            Err(error) => return expansion::report_error(env, &error),
        },
        // A missing `in` clause iterates over "$@"
        None => env
            .variables
            .positional_params()
            .values
            .iter()
            .map(Field::dummy)
            .collect(),
    };

    if fields.is_empty() {
        env.exit_status = ExitStatus::SUCCESS;
        return Continue(());
    }

    for field in fields {
        if let Err(error) = env.variables.assign(&name, Value::Scalar(field.value)) {
            env.print_error(&error.to_string());
            env.exit_status = ExitStatus::FAILURE;
            return Continue(());
        }
        if let std::ops::ControlFlow::Break(result) = loop_body(env, body) {
            return result;
        }
    }
    Continue(())
}

fn execute_cfor(
    env: &mut Env,
    init: &syntax::Text,
    condition: &syntax::Text,
    update: &syntax::Text,
    body: &syntax::List,
) -> Result {
    let eval = |env: &mut Env, text: &syntax::Text| -> expansion::Result<i64> {
        let location = Location::dummy(text.to_string());
        let expression = expansion::expand_text(env, text, &location)?;
        expansion::initial::eval_arith_string(env, &expression, &location)
    };

    if let Err(error) = eval(env, init) {
        return expansion::report_error(env, &error);
    }
    loop {
        match eval(env, condition) {
            // An empty condition is true
            Ok(value) => {
                let empty = condition.to_string_if_literal().is_some_and(|s| s.trim().is_empty());
                if value == 0 && !empty {
                    break;
                }
            }
            Err(error) => return expansion::report_error(env, &error),
        }
        if let std::ops::ControlFlow::Break(result) = loop_body(env, body) {
            return result;
        }
        if let Err(error) = eval(env, update) {
            return expansion::report_error(env, &error);
        }
    }
    env.exit_status = ExitStatus::SUCCESS;
    Continue(())
}

fn execute_loop(
    env: &mut Env,
    condition: &syntax::List,
    body: &syntax::List,
    until: bool,
) -> Result {
    let mut status = ExitStatus::SUCCESS;
    loop {
        let condition_met = {
            let mut guard = env.push_frame(Frame::Condition);
            condition.execute(&mut guard)?;
            guard.exit_status.is_successful() != until
        };
        if !condition_met {
            break;
        }
        if let std::ops::ControlFlow::Break(result) = loop_body(env, body) {
            return result;
        }
        status = env.exit_status;
    }
    env.exit_status = status;
    Continue(())
}

fn execute_if(
    env: &mut Env,
    condition: &syntax::List,
    body: &syntax::List,
    elifs: &[syntax::ElifThen],
    r#else: Option<&syntax::List>,
) -> Result {
    let test = |env: &mut Env, condition: &syntax::List| -> Result<bool> {
        let mut guard = env.push_frame(Frame::Condition);
        condition.execute(&mut guard)?;
        Continue(guard.exit_status.is_successful())
    };

    if test(env, condition)? {
        return body.execute(env);
    }
    for elif in elifs {
        if test(env, &elif.condition)? {
            return elif.body.execute(env);
        }
    }
    match r#else {
        Some(body) => body.execute(env),
        None => {
            env.exit_status = ExitStatus::SUCCESS;
            Continue(())
        }
    }
}

/// Compiles a case or `[[ == ]]` pattern word.
fn compile_pattern(env: &mut Env, word: &syntax::Word) -> expansion::Result<Pattern> {
    let phrase = expansion::initial::expand_word_attr(env, word)?;
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
    Pattern::parse(chars, &config).map_err(|error| expansion::Error {
        cause: expansion::ErrorCause::InvalidPattern(error.to_string()),
        location: word.location.clone(),
    })
}

fn execute_case(env: &mut Env, subject: &syntax::Word, items: &[syntax::CaseItem]) -> Result {
    let subject = match expand_word(env, subject) {
        Ok(field) => field.value,
        Err(error) => return expansion::report_error(env, &error),
    };

    env.exit_status = ExitStatus::SUCCESS;
    let mut fall_through = false;
    for (index, item) in items.iter().enumerate() {
        let matched = fall_through
            || 'matching: {
                for pattern in &item.patterns {
                    match compile_pattern(env, pattern) {
                        Ok(pattern) => {
                            if pattern.is_match(&subject) {
                                break 'matching true;
                            }
                        }
                        Err(error) => return expansion::report_error(env, &error),
                    }
                }
                false
            };
        if !matched {
            continue;
        }

        item.body.execute(env)?;
        match item.continuation {
            CaseContinuation::Break => return Continue(()),
            CaseContinuation::FallThrough => {
                fall_through = true;
                if index + 1 == items.len() {
                    return Continue(());
                }
            }
            CaseContinuation::Continue => {
                fall_through = false;
            }
        }
    }
    Continue(())
}

fn execute_select(
    env: &mut Env,
    name: &syntax::Word,
    values: Option<&[syntax::Word]>,
    body: &syntax::List,
) -> Result {
    let name = match expand_word(env, name) {
        Ok(field) => field.value,
        Err(error) => return expansion::report_error(env, &error),
    };
    let fields = match values {
        Some(words) => match expand_words(env, words) {
            Ok(fields) => fields,
            Err(error) => return expansion::report_error(env, &error),
        },
        None => env
            .variables
            .positional_params()
            .values
            .iter()
            .map(Field::dummy)
            .collect(),
    };
    if fields.is_empty() {
        env.exit_status = ExitStatus::SUCCESS;
        return Continue(());
    }

    loop {
        // The menu and prompt go to standard error
        let mut menu = String::new();
        for (index, field) in fields.iter().enumerate() {
            menu.push_str(&format!("{}) {}\n", index + 1, field.value));
        }
        let prompt = env
            .variables
            .get_scalar("PS3")
            .map(|s| s.into_owned())
            .unwrap_or_else(|| "#? ".to_owned());
        menu.push_str(&prompt);
        let _ = env.system.write_all(2, menu.as_bytes());

        let Some(line) = read_line(env) else {
            env.exit_status = ExitStatus::SUCCESS;
            return Continue(());
        };
        let line = line.trim().to_owned();
        let _ = env
            .variables
            .assign("REPLY", Value::Scalar(line.clone()));

        let chosen = line
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| fields.get(i))
            .map(|field| field.value.clone())
            .unwrap_or_default();
        if let Err(error) = env.variables.assign(&name, Value::Scalar(chosen)) {
            env.print_error(&error.to_string());
            env.exit_status = ExitStatus::FAILURE;
            return Continue(());
        }

        if let std::ops::ControlFlow::Break(result) = loop_body(env, body) {
            return result;
        }
    }
}

/// Reads one line from standard input.
fn read_line(env: &mut Env) -> Option<String> {
    let mut line = Vec::new();
    let mut byte = [0];
    loop {
        match env.system.read(0, &mut byte) {
            Ok(0) => {
                if line.is_empty() {
                    return None;
                }
                break;
            }
            Ok(_) => {
                if byte[0] == b'\n' {
                    break;
                }
                line.push(byte[0]);
            }
            Err(errno) if errno.0 == libc::EINTR => continue,
            Err(_) => return None,
        }
    }
    Some(String::from_utf8_lossy(&line).into_owned())
}

fn execute_arith(env: &mut Env, expression: &syntax::Text, location: &Location) -> Result {
    let text = match expansion::expand_text(env, expression, location) {
        Ok(text) => text,
        Err(error) => return expansion::report_error(env, &error),
    };
    match expansion::initial::eval_arith_string(env, &text, location) {
        Ok(value) => {
            env.exit_status = if value != 0 {
                ExitStatus::SUCCESS
            } else {
                ExitStatus::FAILURE
            };
            Continue(())
        }
        Err(error) => expansion::report_error(env, &error),
    }
}

fn execute_test(env: &mut Env, expression: &TestExpr, location: &Location) -> Result {
    match eval_test(env, expression) {
        Ok(value) => {
            env.exit_status = if value {
                ExitStatus::SUCCESS
            } else {
                ExitStatus::FAILURE
            };
            Continue(())
        }
        Err(TestError::Expansion(error)) => expansion::report_error(env, &error),
        Err(TestError::Message(message)) => {
            let (line, _) = location.line_column();
            env.print_error(&format!("line {line}: {message}"));
            env.exit_status = ExitStatus::ERROR;
            Continue(())
        }
    }
}

enum TestError {
    Expansion(expansion::Error),
    Message(String),
}

impl From<expansion::Error> for TestError {
    fn from(error: expansion::Error) -> Self {
        TestError::Expansion(error)
    }
}

fn eval_test(env: &mut Env, expression: &TestExpr) -> std::result::Result<bool, TestError> {
    use blush_syntax::syntax::{BinaryTestOp::*, UnaryTestOp::*};
    Ok(match expression {
        TestExpr::Word(word) => !expand_word(env, word)?.value.is_empty(),

        TestExpr::Not(inner) => !eval_test(env, inner)?,
        TestExpr::And(lhs, rhs) => eval_test(env, lhs)? && eval_test(env, rhs)?,
        TestExpr::Or(lhs, rhs) => eval_test(env, lhs)? || eval_test(env, rhs)?,

        TestExpr::Unary { operator, operand } => {
            let value = expand_word(env, operand)?.value;
            let metadata = || std::fs::symlink_metadata(&value);
            match operator {
                NonEmpty => !value.is_empty(),
                Empty => value.is_empty(),
                Exists => std::fs::metadata(&value).is_ok(),
                IsFile => std::fs::metadata(&value).is_ok_and(|m| m.is_file()),
                IsDir => std::fs::metadata(&value).is_ok_and(|m| m.is_dir()),
                Symlink => metadata().is_ok_and(|m| m.file_type().is_symlink()),
                NonEmptyFile => std::fs::metadata(&value).is_ok_and(|m| m.len() > 0),
                Readable => unix_access(&value, libc::R_OK),
                Writable => unix_access(&value, libc::W_OK),
                Executable => unix_access(&value, libc::X_OK),
                Terminal => value
                    .parse::<i32>()
                    .is_ok_and(|fd| env.system.isatty(fd)),
                VarSet => env.variables.get(&value).is_some(),
            }
        }

        TestExpr::Binary { operator, lhs, rhs } => {
            let left = expand_word(env, lhs)?.value;
            match operator {
                Match | NoMatch => {
                    let pattern = compile_pattern(env, rhs)
                        .map_err(TestError::Expansion)?;
                    pattern.is_match(&left) == (*operator == Match)
                }
                RegexMatch => {
                    let pattern = expand_word(env, rhs)?.value;
                    let regex = regex::Regex::new(&pattern)
                        .map_err(|error| TestError::Message(error.to_string()))?;
                    regex.is_match(&left)
                }
                StrLess => left < expand_word(env, rhs)?.value,
                StrGreater => left > expand_word(env, rhs)?.value,
                Eq | Ne | Lt | Le | Gt | Ge => {
                    let right = expand_word(env, rhs)?.value;
                    let left: i64 = left
                        .trim()
                        .parse()
                        .map_err(|_| TestError::Message(format!("{left}: integer expected")))?;
                    let right: i64 = right
                        .trim()
                        .parse()
                        .map_err(|_| TestError::Message(format!("{right}: integer expected")))?;
                    match operator {
                        Eq => left == right,
                        Ne => left != right,
                        Lt => left < right,
                        Le => left <= right,
                        Gt => left > right,
                        Ge => left >= right,
                        _ => unreachable!(),
                    }
                }
                NewerThan | OlderThan | SameFile => {
                    let right = expand_word(env, rhs)?.value;
                    compare_files(&left, &right, *operator)
                }
            }
        }
    })
}

fn unix_access(path: &str, mode: libc::c_int) -> bool {
    match std::ffi::CString::new(path) {
        Ok(c_path) => unsafe { libc::access(c_path.as_ptr(), mode) == 0 },
        Err(_) => false,
    }
}

fn compare_files(left: &str, right: &str, operator: blush_syntax::syntax::BinaryTestOp) -> bool {
    use blush_syntax::syntax::BinaryTestOp::*;
    use std::os::unix::fs::MetadataExt;
    let (Ok(left), Ok(right)) = (std::fs::metadata(left), std::fs::metadata(right)) else {
        return false;
    };
    match operator {
        NewerThan => left.mtime() > right.mtime(),
        OlderThan => left.mtime() < right.mtime(),
        SameFile => left.dev() == right.dev() && left.ino() == right.ino(),
        _ => unreachable!(),
    }
}
