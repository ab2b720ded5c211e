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

//! Redirection
//!
//! Redirections are prepared (targets expanded) in source order, then
//! applied through a [`RedirGuard`] that saves the prior descriptor of
//! every affected fd with a close-on-exec duplicate and restores the
//! whole set in reverse order on every exit path, including diverts and
//! errors. Commands executed in a forked child skip the restoration by
//! forgetting the guard before `execve`.

use crate::expansion;
use blush_env::option::ShellOption;
use blush_env::system::{Errno, ForkResult};
use blush_env::Env;
use blush_syntax::source::Location;
use blush_syntax::syntax::{Fd, Redir, RedirBody, RedirOp};
use std::ffi::CString;
use std::ops::{Deref, DerefMut};
use std::os::unix::io::RawFd;
use thiserror::Error;

/// Error applying a redirection
#[derive(Clone, Debug, Error)]
pub enum RedirError {
    /// Expansion of the target word failed.
    #[error(transparent)]
    Expansion(#[from] expansion::Error),
    /// The target file could not be opened.
    #[error("{path}: {errno}")]
    Open { path: String, errno: Errno },
    /// A file exists and `noclobber` is set.
    #[error("{path}: cannot overwrite existing file")]
    Clobber { path: String },
    /// The operand of `<&`/`>&` is not a file descriptor or `-`.
    #[error("{operand}: not a valid file descriptor")]
    BadFdOperand { operand: String },
    /// A system call failed.
    #[error("redirection error: {0}")]
    System(Errno),
}

/// Redirection with its target expanded
#[derive(Debug)]
struct Prepared {
    fd: RawFd,
    action: Action,
}

#[derive(Debug)]
enum Action {
    /// Open a file with the given flags.
    Open { path: String, flags: i32 },
    /// Open a file and also duplicate it onto stderr (`&>`).
    OpenBoth { path: String, flags: i32 },
    /// Duplicate another descriptor.
    Dup { from: RawFd },
    /// Close the descriptor.
    Close,
    /// Feed a string through a pipe (here-documents, here-strings).
    Here { body: String },
}

/// Expands and interprets redirections, in source order.
fn prepare(env: &mut Env, redirs: &[Redir]) -> Result<Vec<Prepared>, RedirError> {
    let noclobber = env.options.get(ShellOption::Noclobber);
    let mut prepared = Vec::with_capacity(redirs.len());
    for redir in redirs {
        let fd = redir.fd_or_default().0;
        let action = match &redir.body {
            RedirBody::HereDoc(here_doc) => {
                let content = here_doc
                    .content
                    .get()
                    .expect("here-doc content is filled by the parser");
                let location = &here_doc.delimiter.location;
                let body = expansion::expand_text(env, content, location)
                    .map_err(RedirError::Expansion)?;
                Action::Here { body }
            }
            RedirBody::Normal { operator, operand } => {
                let target = expansion::expand_word(env, operand)?;
                use RedirOp::*;
                match operator {
                    FileIn => Action::Open {
                        path: target.value,
                        flags: libc::O_RDONLY,
                    },
                    FileInOut => Action::Open {
                        path: target.value,
                        flags: libc::O_RDWR | libc::O_CREAT,
                    },
                    FileOut => Action::Open {
                        path: target.value,
                        flags: if noclobber {
                            libc::O_WRONLY | libc::O_CREAT | libc::O_EXCL
                        } else {
                            libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC
                        },
                    },
                    FileClobber => Action::Open {
                        path: target.value,
                        flags: libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC,
                    },
                    FileAppend => Action::Open {
                        path: target.value,
                        flags: libc::O_WRONLY | libc::O_CREAT | libc::O_APPEND,
                    },
                    OutErr => Action::OpenBoth {
                        path: target.value,
                        flags: libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC,
                    },
                    AppendOutErr => Action::OpenBoth {
                        path: target.value,
                        flags: libc::O_WRONLY | libc::O_CREAT | libc::O_APPEND,
                    },
                    FdIn | FdOut => {
                        if target.value == "-" {
                            Action::Close
                        } else {
                            match target.value.parse::<RawFd>() {
                                Ok(from) if from >= 0 => Action::Dup { from },
                                _ => {
                                    return Err(RedirError::BadFdOperand {
                                        operand: target.value,
                                    })
                                }
                            }
                        }
                    }
                    HereString => Action::Here {
                        body: format!("{}\n", target.value),
                    },
                }
            }
        };
        prepared.push(Prepared { fd, action });
    }
    Ok(prepared)
}

/// Applies redirections and restores the descriptor table on drop
#[derive(Debug)]
pub struct RedirGuard<'e> {
    env: &'e mut Env,
    /// Affected fds with their saved duplicates, in application order
    saved: Vec<(RawFd, Option<RawFd>)>,
}

impl<'e> RedirGuard<'e> {
    /// Creates a guard that has not applied anything yet.
    pub fn new(env: &'e mut Env) -> Self {
        RedirGuard {
            env,
            saved: Vec::new(),
        }
    }

    /// Expands and applies the given redirections.
    pub fn perform_redirs(&mut self, redirs: &[Redir]) -> Result<(), RedirError> {
        let prepared = prepare(self.env, redirs)?;
        for prepared in prepared {
            self.apply(prepared)?;
        }
        Ok(())
    }

    fn save(&mut self, fd: RawFd) {
        let saved = self.env.system.dup_save(fd).ok();
        self.saved.push((fd, saved));
    }

    fn apply(&mut self, prepared: Prepared) -> Result<(), RedirError> {
        let system = self.env.system;
        let fd = prepared.fd;
        match prepared.action {
            Action::Open { path, flags } => {
                self.save(fd);
                let opened = open_file(self.env, &path, flags)?;
                move_fd(self.env, opened, fd)?;
            }
            Action::OpenBoth { path, flags } => {
                self.save(Fd::STDOUT.0);
                self.save(Fd::STDERR.0);
                let opened = open_file(self.env, &path, flags)?;
                move_fd(self.env, opened, Fd::STDOUT.0)?;
                system
                    .dup2(Fd::STDOUT.0, Fd::STDERR.0)
                    .map_err(RedirError::System)?;
            }
            Action::Dup { from } => {
                self.save(fd);
                system.dup2(from, fd).map_err(RedirError::System)?;
            }
            Action::Close => {
                self.save(fd);
                let _ = system.close(fd);
            }
            Action::Here { body } => {
                self.save(fd);
                let reader = here_pipe(self.env, body.as_bytes())?;
                move_fd(self.env, reader, fd)?;
            }
        }
        Ok(())
    }

    /// Skips restoration; used in forked children about to exec.
    pub fn disarm(mut self) {
        self.saved.clear();
    }
}

impl Deref for RedirGuard<'_> {
    type Target = Env;
    fn deref(&self) -> &Env {
        self.env
    }
}

impl DerefMut for RedirGuard<'_> {
    fn deref_mut(&mut self) -> &mut Env {
        self.env
    }
}

impl Drop for RedirGuard<'_> {
    fn drop(&mut self) {
        let system = self.env.system;
        for (fd, saved) in self.saved.drain(..).rev() {
            match saved {
                Some(copy) => {
                    let _ = system.dup2(copy, fd);
                    let _ = system.close(copy);
                }
                None => {
                    let _ = system.close(fd);
                }
            }
        }
    }
}

fn open_file(env: &Env, path: &str, flags: i32) -> Result<RawFd, RedirError> {
    let c_path = CString::new(path).map_err(|_| RedirError::Open {
        path: path.to_owned(),
        errno: Errno(libc::EINVAL),
    })?;
    env.system.open(&c_path, flags, 0o666).map_err(|errno| {
        if errno.0 == libc::EEXIST && flags & libc::O_EXCL != 0 {
            RedirError::Clobber {
                path: path.to_owned(),
            }
        } else {
            RedirError::Open {
                path: path.to_owned(),
                errno,
            }
        }
    })
}

/// Moves a freshly opened descriptor onto the target fd.
fn move_fd(env: &Env, from: RawFd, to: RawFd) -> Result<(), RedirError> {
    if from == to {
        return Ok(());
    }
    env.system.dup2(from, to).map_err(RedirError::System)?;
    let _ = env.system.close(from);
    Ok(())
}

/// Produces the read end of a pipe holding the given bytes.
///
/// Small bodies are written directly; larger ones go through a forked
/// writer so the shell cannot deadlock on a full pipe.
fn here_pipe(env: &Env, body: &[u8]) -> Result<RawFd, RedirError> {
    let system = env.system;
    let (reader, writer) = system.pipe().map_err(RedirError::System)?;
    if body.len() <= 4096 {
        system.write_all(writer, body).map_err(RedirError::System)?;
        let _ = system.close(writer);
        return Ok(reader);
    }
    match system.fork().map_err(RedirError::System)? {
        ForkResult::Child => {
            let _ = system.close(reader);
            let _ = system.write_all(writer, body);
            system.exit_process(blush_env::semantics::ExitStatus::SUCCESS)
        }
        ForkResult::Parent { .. } => {
            let _ = system.close(writer);
            Ok(reader)
        }
    }
}

/// Reports a redirection error and returns the conventional status 1.
pub fn report_redir_error(env: &mut Env, error: &RedirError, location: &Location) {
    let (line, _) = location.line_column();
    env.print_error(&format!("line {line}: {error}"));
    env.exit_status = blush_env::semantics::ExitStatus::FAILURE;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{run_and_capture, test_env};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn output_redirection_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out");
        let mut env = test_env();
        run_and_capture(
            &mut env,
            &format!("echo hello > {}", path.display()),
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn append_redirection() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out");
        let mut env = test_env();
        run_and_capture(
            &mut env,
            &format!(
                "echo one > {p}\necho two >> {p}",
                p = path.display()
            ),
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn input_redirection() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("in");
        fs::write(&path, "from file\n").unwrap();
        let mut env = test_env();
        let output = run_and_capture(&mut env, &format!("cat < {}", path.display()));
        assert_eq!(output, "from file\n");
    }

    #[test]
    fn fd_duplication_merges_streams() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out");
        let mut env = test_env();
        run_and_capture(
            &mut env,
            &format!("sh -c 'echo oops >&2' > {} 2>&1", path.display()),
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "oops\n");
    }

    #[test]
    fn descriptors_are_restored_after_builtin_redirection() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out");
        let mut env = test_env();
        let output = run_and_capture(
            &mut env,
            &format!("{{ echo inner; }} > {}\necho outer", path.display()),
        );
        assert_eq!(output, "outer\n");
        assert_eq!(fs::read_to_string(&path).unwrap(), "inner\n");
    }

    #[test]
    fn here_string() {
        let mut env = test_env();
        let output = run_and_capture(&mut env, "cat <<<hello");
        assert_eq!(output, "hello\n");
    }

    #[test]
    fn here_doc_with_expansion() {
        let mut env = test_env();
        let output = run_and_capture(
            &mut env,
            "name=world\ncat <<EOF\nhello $name\nEOF",
        );
        assert_eq!(output, "hello world\n");
    }

    #[test]
    fn quoted_here_doc_is_literal() {
        let mut env = test_env();
        let output = run_and_capture(&mut env, "cat <<'EOF'\nhello $name\nEOF");
        assert_eq!(output, "hello $name\n");
    }

    #[test]
    fn noclobber_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out");
        fs::write(&path, "precious").unwrap();
        let mut env = test_env();
        env.options.set(ShellOption::Noclobber, true);
        run_and_capture(&mut env, &format!("echo new > {}", path.display()));
        assert_eq!(fs::read_to_string(&path).unwrap(), "precious");
        assert_eq!(env.exit_status, blush_env::semantics::ExitStatus::FAILURE);
    }

    #[test]
    fn closing_descriptor() {
        let mut env = test_env();
        // `cat` fails when stdin is closed, and the shell carries on
        run_and_capture(&mut env, "cat <&-");
        assert!(!env.exit_status.is_successful());
    }
}
