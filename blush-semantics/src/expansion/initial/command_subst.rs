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

//! Command substitution and process substitution
//!
//! Both fork a subshell that shares the parent's state by copy. A
//! command substitution captures the child's output through a pipe and
//! strips trailing newlines; variable changes inside it (including `IFS`)
//! are discarded when the subshell exits. A process substitution instead
//! leaves one pipe end open in the shell and expands to its `/dev/fd`
//! path; the descriptor and the child are cleaned up after the command
//! that consumed the path finishes.

use super::super::{Error, ErrorCause, Result};
use crate::runner;
use blush_env::semantics::Divert;
use blush_env::stack::Frame;
use blush_env::system::{Errno, ForkResult};
use blush_env::Env;
use blush_syntax::source::{Location, Source};
use blush_syntax::syntax::{Fd, SubstDirection};
use std::ops::ControlFlow;

fn system_error(errno: Errno, location: &Location) -> Error {
    Error {
        cause: ErrorCause::SubstitutionSystem(errno),
        location: location.clone(),
    }
}

/// Runs a subshell body in a forked child and never returns.
fn run_subshell_child(env: &mut Env, content: &str, source: Source) -> ! {
    let system = env.system;
    env.traps.enter_subshell(&system);
    env.options
        .set(blush_env::option::ShellOption::Interactive, false);
    let result = {
        let mut guard = env.push_frame(Frame::Subshell);
        runner::parse_and_execute(&mut guard, content, source)
    };
    let status = match result {
        ControlFlow::Continue(()) => env.exit_status,
        ControlFlow::Break(divert) => match divert {
            Divert::Exit(status) | Divert::Return(status) | Divert::Interrupt(status) => {
                status.unwrap_or(env.exit_status)
            }
            Divert::Break { .. } | Divert::Continue { .. } => env.exit_status,
        },
    };
    system.exit_process(status)
}

/// Performs a command substitution, returning the captured output.
pub fn command_substitution(
    env: &mut Env,
    content: &str,
    location: &Location,
) -> Result<String> {
    let system = env.system;
    let (reader, writer) = system.pipe().map_err(|e| system_error(e, location))?;

    match system.fork().map_err(|e| system_error(e, location))? {
        ForkResult::Child => {
            let _ = system.dup2(writer, Fd::STDOUT.0);
            let _ = system.close(writer);
            let _ = system.close(reader);
            run_subshell_child(env, content, Source::CommandSubst)
        }
        ForkResult::Parent { child } => {
            let _ = system.close(writer);
            let mut output = Vec::new();
            let mut buffer = [0; 4096];
            loop {
                match system.read(reader, &mut buffer) {
                    Ok(0) => break,
                    Ok(count) => output.extend_from_slice(&buffer[..count]),
                    Err(errno) if errno.0 == libc::EINTR => continue,
                    Err(_) => break,
                }
            }
            let _ = system.close(reader);

            let status = crate::command::wait_for_child(env, child);
            env.exit_status = status;

            let mut output = String::from_utf8_lossy(&output).into_owned();
            while output.ends_with('\n') {
                output.pop();
            }
            Ok(output)
        }
    }
}

/// Performs a process substitution, returning the `/dev/fd` path that
/// the command consumes as an argument.
pub fn process_substitution(
    env: &mut Env,
    direction: SubstDirection,
    content: &str,
    location: &Location,
) -> Result<String> {
    let system = env.system;
    let (reader, writer) = system.pipe().map_err(|e| system_error(e, location))?;

    match system.fork().map_err(|e| system_error(e, location))? {
        ForkResult::Child => {
            // The shell-side end stays close-on-exec in the child so it
            // cannot leak through the substituted command's exec
            match direction {
                SubstDirection::In => {
                    let _ = system.dup2(writer, Fd::STDOUT.0);
                }
                SubstDirection::Out => {
                    let _ = system.dup2(reader, Fd::STDIN.0);
                }
            }
            let _ = system.close(reader);
            let _ = system.close(writer);
            run_subshell_child(env, content, Source::CommandSubst)
        }
        ForkResult::Parent { child } => {
            let keep = match direction {
                SubstDirection::In => {
                    let _ = system.close(writer);
                    reader
                }
                SubstDirection::Out => {
                    let _ = system.close(reader);
                    writer
                }
            };
            // The kept end must survive the exec of the consuming command
            system
                .clear_cloexec(keep)
                .map_err(|e| system_error(e, location))?;
            env.process_substs.push((keep, child));
            Ok(format!("/dev/fd/{keep}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blush_syntax::source::Location;

    #[test]
    fn captures_output_and_strips_trailing_newlines() {
        let mut env = crate::tests::test_env();
        let output =
            command_substitution(&mut env, "echo hello", &Location::dummy("")).unwrap();
        assert_eq!(output, "hello");
    }

    #[test]
    fn inner_newlines_are_kept() {
        let mut env = crate::tests::test_env();
        let output =
            command_substitution(&mut env, "echo a; echo b", &Location::dummy("")).unwrap();
        assert_eq!(output, "a\nb");
    }

    #[test]
    fn exit_status_is_propagated() {
        let mut env = crate::tests::test_env();
        let _ = command_substitution(&mut env, "false", &Location::dummy("")).unwrap();
        assert_eq!(env.exit_status, blush_env::semantics::ExitStatus::FAILURE);
    }

    #[test]
    fn variable_changes_are_discarded() {
        let mut env = crate::tests::test_env();
        env.variables
            .assign("IFS", blush_env::variable::Value::Scalar(":".into()))
            .unwrap();
        let _ = command_substitution(&mut env, "IFS=,; x=inner", &Location::dummy(""))
            .unwrap();
        assert_eq!(env.variables.get_scalar("IFS").unwrap(), ":");
        assert_eq!(env.variables.get("x"), None);
    }
}
