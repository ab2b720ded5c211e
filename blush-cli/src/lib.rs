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

//! Entry point of the blush shell.
//!
//! This crate wires the other crates together: it parses the command
//! line, prepares the environment, and either runs a script / `-c`
//! string through [`blush_semantics::run_script`] or drives the
//! interactive read-eval loop with history and `PS2` continuation.

pub mod args;
pub mod history;
pub mod startup;

use crate::args::{ArgsError, Invocation, Mode};
use crate::history::History;
use blush_env::job::JobState;
use blush_env::semantics::{Divert, ExitStatus};
use blush_env::{signal, Env};
use blush_semantics::Command as _;
use blush_syntax::parser::lex::Lexer;
use blush_syntax::parser::parse_program;
use blush_syntax::source::Source;
use std::ops::ControlFlow::{Break, Continue};
use std::path::PathBuf;
use std::rc::Rc;

const USAGE: &str = "\
usage: blush [OPTIONS] [SCRIPT [ARG...]]
       blush -c COMMAND [NAME [ARG...]]
       blush -s [ARG...]
";

/// Runs the shell: the body of `main`.
pub fn bin_main() -> ExitStatus {
    let invocation = match args::parse(std::env::args().skip(1)) {
        Ok(invocation) => invocation,
        Err(error) => {
            eprintln!("blush: {error}");
            eprint!("{USAGE}");
            return ExitStatus::ERROR;
        }
    };
    run(&invocation)
}

/// Runs the shell for a parsed invocation.
pub fn run(invocation: &Invocation) -> ExitStatus {
    if invocation.version {
        println!("blush {}", env!("CARGO_PKG_VERSION"));
        return ExitStatus::SUCCESS;
    }
    if invocation.help {
        print!("{USAGE}");
        return ExitStatus::SUCCESS;
    }

    let mut env = startup::prepare_env(invocation);

    match &invocation.mode {
        Some(Mode::Command { command }) => {
            blush_semantics::run_script(&mut env, command, Source::CommandString)
        }
        Some(Mode::Script { path }) => match std::fs::read_to_string(path) {
            Ok(code) => blush_semantics::run_script(
                &mut env,
                &code,
                Source::Script { path: path.clone() },
            ),
            Err(error) => {
                env.print_error(&format!("{path}: {error}"));
                ExitStatus::NOT_FOUND
            }
        },
        Some(Mode::Stdin) | None => {
            let interactive = invocation.force_interactive
                || (invocation.mode.is_none()
                    && env.system.isatty(0)
                    && env.system.isatty(2));
            if interactive {
                interactive_main(&mut env, invocation)
            } else {
                let mut code = String::new();
                use std::io::Read as _;
                if std::io::stdin().read_to_string(&mut code).is_err() {
                    env.print_error("cannot read standard input");
                    return ExitStatus::FAILURE;
                }
                blush_semantics::run_script(&mut env, &code, Source::Stdin)
            }
        }
    }
}

fn history_path(env: &Env) -> Option<PathBuf> {
    let home = env.variables.get_scalar("HOME")?;
    Some(PathBuf::from(format!("{home}/.blush_history")))
}

fn interactive_main(env: &mut Env, invocation: &Invocation) -> ExitStatus {
    startup::enter_interactive_mode(env);
    startup::run_rc_file(env, invocation);

    let mut history = match history_path(env) {
        Some(path) => History::load(path),
        None => History::in_memory(),
    };
    let status = read_eval_loop(env, &mut history);
    history.save();
    env.exit_status = status;
    blush_semantics::trap::run_exit_trap(env);
    env.exit_status
}

/// Result of reading one input line
enum Line {
    Text(String),
    EndOfInput,
    Interrupted,
}

/// Reads one line from standard input, handling traps on interruption.
fn read_line(env: &mut Env) -> Line {
    let system = env.system;
    let mut bytes = Vec::new();
    let mut byte = [0];
    loop {
        match system.read(0, &mut byte) {
            Ok(0) => {
                return if bytes.is_empty() {
                    Line::EndOfInput
                } else {
                    Line::Text(String::from_utf8_lossy(&bytes).into_owned())
                }
            }
            Ok(_) => {
                if byte[0] == b'\n' {
                    return Line::Text(String::from_utf8_lossy(&bytes).into_owned());
                }
                bytes.push(byte[0]);
            }
            Err(errno) if errno.0 == libc::EINTR => {
                if signal::take_one(libc::SIGINT) {
                    return Line::Interrupted;
                }
                let _ = blush_semantics::trap::run_traps_for_caught_signals(env);
            }
            Err(_) => return Line::EndOfInput,
        }
    }
}

fn prompt(env: &mut Env, variable: &str, fallback: &str) {
    let text = env
        .variables
        .get_scalar(variable)
        .map(|s| s.into_owned())
        .unwrap_or_else(|| fallback.to_owned());
    let _ = env.system.write_all(2, text.as_bytes());
}

/// Reports jobs that finished since the last prompt.
fn report_finished_jobs(env: &mut Env) {
    let system = env.system;
    env.jobs.poll(&system);
    for (number, job) in env.jobs.take_finished() {
        let status = match job.state {
            JobState::Done(status) => status,
            _ => continue,
        };
        let summary = if status.is_successful() {
            "Done".to_owned()
        } else {
            format!("Exit {status}")
        };
        let line = format!("[{number}] {summary}\t{}\n", job.command);
        let _ = system.write_all(2, line.as_bytes());
    }
}

fn read_eval_loop(env: &mut Env, history: &mut History) -> ExitStatus {
    loop {
        report_finished_jobs(env);
        if let Break(Divert::Exit(status)) =
            blush_semantics::trap::run_traps_for_caught_signals(env)
        {
            return status.unwrap_or(env.exit_status);
        }

        prompt(env, "PS1", "$ ");
        let mut buffer = match read_line(env) {
            Line::EndOfInput => return env.exit_status,
            Line::Interrupted => {
                let _ = env.system.write_all(2, b"\n");
                continue;
            }
            Line::Text(line) => line,
        };

        // History expansion happens before tokenization
        match history.expand(&buffer) {
            Err(message) => {
                env.print_error(&message);
                env.exit_status = ExitStatus::FAILURE;
                continue;
            }
            Ok((expanded, changed)) => {
                if changed {
                    let _ = env.system.write_all(2, expanded.as_bytes());
                    let _ = env.system.write_all(2, b"\n");
                }
                buffer = expanded;
            }
        }

        // Accumulate lines until the input parses or is hopeless
        let list = loop {
            let aliases = Rc::clone(&env.aliases);
            let mut lexer = Lexer::with_source(&buffer, Source::CommandLine);
            match parse_program(&mut lexer, &aliases) {
                Ok(list) => break Some(list),
                Err(error) if error.cause.is_incomplete() => {
                    prompt(env, "PS2", "> ");
                    match read_line(env) {
                        Line::Text(line) => {
                            buffer.push('\n');
                            buffer.push_str(&line);
                        }
                        Line::Interrupted => {
                            let _ = env.system.write_all(2, b"\n");
                            break None;
                        }
                        Line::EndOfInput => {
                            blush_semantics::runner::print_syntax_error(env, &error);
                            env.exit_status = ExitStatus::ERROR;
                            break None;
                        }
                    }
                }
                Err(error) => {
                    blush_semantics::runner::print_syntax_error(env, &error);
                    env.exit_status = ExitStatus::ERROR;
                    break None;
                }
            }
        };
        let Some(list) = list else { continue };

        if list.0.is_empty() {
            env.exit_status = ExitStatus::SUCCESS;
            continue;
        }
        history.push(&buffer);

        match list.execute(env) {
            Continue(()) => {}
            Break(Divert::Exit(status)) => {
                return status.unwrap_or(env.exit_status);
            }
            Break(Divert::Interrupt(status)) => {
                if let Some(status) = status {
                    env.exit_status = status;
                }
            }
            Break(Divert::Return(status)) => {
                if let Some(status) = status {
                    env.exit_status = status;
                }
            }
            Break(Divert::Break { .. } | Divert::Continue { .. }) => {
                // Already reported by the builtin
            }
        }
    }
}
