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

//! System call interface
//!
//! Thin wrappers over the POSIX calls the shell needs, converting error
//! returns into [`Errno`] values. All file descriptors created for the
//! shell's own bookkeeping are close-on-exec so they never leak into
//! executed programs.

pub use errno::Errno;
use std::ffi::{c_int, CStr, CString};
use std::os::unix::io::RawFd;

use crate::semantics::ExitStatus;

/// Process ID
pub type Pid = libc::pid_t;

/// Lowest file descriptor used for saved copies during redirection
pub const MIN_INTERNAL_FD: RawFd = 10;

/// Result of a fork
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ForkResult {
    /// In the parent process; the child's process ID is given.
    Parent { child: Pid },
    /// In the child process.
    Child,
}

/// Result of waiting for a child process
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WaitOutcome {
    /// The child exited normally.
    Exited(Pid, ExitStatus),
    /// The child was killed by a signal.
    Signaled(Pid, c_int),
    /// The child was stopped by a signal.
    Stopped(Pid, c_int),
    /// The child was resumed.
    Continued(Pid),
}

/// Disposition of a signal
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Disposition {
    /// Default action
    Default,
    /// Ignore the signal
    Ignore,
    /// Record the signal in the caught-signal flags
    Catch,
}

fn last_errno() -> Errno {
    errno::errno()
}

fn check(result: c_int) -> Result<c_int, Errno> {
    if result == -1 {
        Err(last_errno())
    } else {
        Ok(result)
    }
}

/// Interface to the real operating system
#[derive(Clone, Copy, Debug, Default)]
pub struct RealSystem;

impl RealSystem {
    /// Creates the system interface.
    #[must_use]
    pub fn new() -> RealSystem {
        RealSystem
    }

    /// Forks the current process.
    ///
    /// # Safety considerations
    ///
    /// The shell is single-threaded, so the child may safely allocate and
    /// run arbitrary code before `execve` or `_exit`.
    pub fn fork(&self) -> Result<ForkResult, Errno> {
        let pid = check(unsafe { libc::fork() })?;
        Ok(if pid == 0 {
            ForkResult::Child
        } else {
            ForkResult::Parent { child: pid }
        })
    }

    /// Replaces the process image. Returns only on failure.
    pub fn execve(&self, path: &CStr, args: &[CString], envs: &[CString]) -> Errno {
        let mut argv: Vec<*const libc::c_char> = args.iter().map(|a| a.as_ptr()).collect();
        argv.push(std::ptr::null());
        let mut envp: Vec<*const libc::c_char> = envs.iter().map(|e| e.as_ptr()).collect();
        envp.push(std::ptr::null());
        unsafe {
            libc::execve(path.as_ptr(), argv.as_ptr(), envp.as_ptr());
        }
        last_errno()
    }

    /// Terminates the process immediately, without running destructors or
    /// the EXIT trap.
    pub fn exit_process(&self, exit_status: ExitStatus) -> ! {
        unsafe { libc::_exit(exit_status.0) }
    }

    /// Waits for a specific child, blocking. Stopped children are
    /// reported when job control is active.
    pub fn wait(&self, pid: Pid) -> Result<WaitOutcome, Errno> {
        loop {
            let mut status = 0;
            let result = unsafe { libc::waitpid(pid, &mut status, libc::WUNTRACED) };
            if result == -1 {
                let errno = last_errno();
                if errno.0 == libc::EINTR {
                    continue;
                }
                return Err(errno);
            }
            return Ok(decode_wait_status(result, status));
        }
    }

    /// Polls a child without blocking. `Ok(None)` means no state change.
    pub fn wait_any_nonblocking(&self, pid: Pid) -> Result<Option<WaitOutcome>, Errno> {
        let mut status = 0;
        let flags = libc::WNOHANG | libc::WUNTRACED | libc::WCONTINUED;
        let result = unsafe { libc::waitpid(pid, &mut status, flags) };
        match result {
            -1 => Err(last_errno()),
            0 => Ok(None),
            pid => Ok(Some(decode_wait_status(pid, status))),
        }
    }

    /// Creates a pipe; both ends are close-on-exec.
    pub fn pipe(&self) -> Result<(RawFd, RawFd), Errno> {
        let mut fds = [0; 2];
        check(unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) })?;
        Ok((fds[0], fds[1]))
    }

    /// Duplicates a file descriptor to a close-on-exec copy at or above
    /// [`MIN_INTERNAL_FD`].
    pub fn dup_save(&self, fd: RawFd) -> Result<RawFd, Errno> {
        check(unsafe { libc::fcntl(fd, libc::F_DUPFD_CLOEXEC, MIN_INTERNAL_FD) })
    }

    /// Duplicates `from` onto `to`, clearing close-on-exec on the copy.
    pub fn dup2(&self, from: RawFd, to: RawFd) -> Result<RawFd, Errno> {
        loop {
            match check(unsafe { libc::dup2(from, to) }) {
                Err(errno) if errno.0 == libc::EINTR => continue,
                other => return other,
            }
        }
    }

    /// Closes a file descriptor.
    pub fn close(&self, fd: RawFd) -> Result<(), Errno> {
        match check(unsafe { libc::close(fd) }) {
            Ok(_) => Ok(()),
            // POSIX leaves the fd state unspecified on EINTR; treat it as
            // closed like most implementations do
            Err(errno) if errno.0 == libc::EINTR => Ok(()),
            Err(errno) => Err(errno),
        }
    }

    /// Marks a file descriptor close-on-exec.
    pub fn set_cloexec(&self, fd: RawFd) -> Result<(), Errno> {
        let flags = check(unsafe { libc::fcntl(fd, libc::F_GETFD) })?;
        check(unsafe { libc::fcntl(fd, libc::F_SETFD, flags | libc::FD_CLOEXEC) })?;
        Ok(())
    }

    /// Clears the close-on-exec flag, letting executed programs inherit
    /// the descriptor.
    pub fn clear_cloexec(&self, fd: RawFd) -> Result<(), Errno> {
        let flags = check(unsafe { libc::fcntl(fd, libc::F_GETFD) })?;
        check(unsafe { libc::fcntl(fd, libc::F_SETFD, flags & !libc::FD_CLOEXEC) })?;
        Ok(())
    }

    /// Opens a file.
    pub fn open(&self, path: &CStr, flags: c_int, mode: libc::mode_t) -> Result<RawFd, Errno> {
        loop {
            let result = unsafe { libc::open(path.as_ptr(), flags, mode as c_int) };
            match check(result) {
                Err(errno) if errno.0 == libc::EINTR => continue,
                other => return other,
            }
        }
    }

    /// Reads bytes from a file descriptor.
    ///
    /// `EINTR` is passed through so the caller can handle pending traps.
    pub fn read(&self, fd: RawFd, buffer: &mut [u8]) -> Result<usize, Errno> {
        let result = unsafe { libc::read(fd, buffer.as_mut_ptr().cast(), buffer.len()) };
        if result == -1 {
            Err(last_errno())
        } else {
            Ok(result as usize)
        }
    }

    /// Writes the whole buffer, retrying on `EINTR` and short writes.
    pub fn write_all(&self, fd: RawFd, mut buffer: &[u8]) -> Result<(), Errno> {
        while !buffer.is_empty() {
            let result = unsafe { libc::write(fd, buffer.as_ptr().cast(), buffer.len()) };
            if result == -1 {
                let errno = last_errno();
                if errno.0 == libc::EINTR {
                    continue;
                }
                return Err(errno);
            }
            buffer = &buffer[result as usize..];
        }
        Ok(())
    }

    /// Returns true if the file descriptor refers to a terminal.
    #[must_use]
    pub fn isatty(&self, fd: RawFd) -> bool {
        unsafe { libc::isatty(fd) == 1 }
    }

    /// Returns the shell's process ID.
    #[must_use]
    pub fn getpid(&self) -> Pid {
        unsafe { libc::getpid() }
    }

    /// Puts a process into a process group.
    pub fn setpgid(&self, pid: Pid, pgid: Pid) -> Result<(), Errno> {
        check(unsafe { libc::setpgid(pid, pgid) }).map(drop)
    }

    /// Returns the process group of the calling process.
    #[must_use]
    pub fn getpgrp(&self) -> Pid {
        unsafe { libc::getpgrp() }
    }

    /// Makes a process group the foreground group of the terminal.
    pub fn tcsetpgrp(&self, fd: RawFd, pgid: Pid) -> Result<(), Errno> {
        check(unsafe { libc::tcsetpgrp(fd, pgid) }).map(drop)
    }

    /// Sends a signal.
    pub fn kill(&self, pid: Pid, signal: c_int) -> Result<(), Errno> {
        check(unsafe { libc::kill(pid, signal) }).map(drop)
    }

    /// Sets the disposition of a signal.
    pub fn sigaction(&self, signal: c_int, disposition: Disposition) -> Result<(), Errno> {
        let handler: libc::sighandler_t = match disposition {
            Disposition::Default => libc::SIG_DFL,
            Disposition::Ignore => libc::SIG_IGN,
            Disposition::Catch => {
                let f: extern "C" fn(c_int) = crate::signal::catch_signal;
                f as libc::sighandler_t
            }
        };
        unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            action.sa_sigaction = handler;
            libc::sigemptyset(&mut action.sa_mask);
            check(libc::sigaction(signal, &action, std::ptr::null_mut())).map(drop)
        }
    }

    /// Changes the working directory.
    pub fn chdir(&self, path: &CStr) -> Result<(), Errno> {
        check(unsafe { libc::chdir(path.as_ptr()) }).map(drop)
    }

    /// Returns the current working directory.
    pub fn getcwd(&self) -> Result<String, Errno> {
        std::env::current_dir()
            .map(|path| path.to_string_lossy().into_owned())
            .map_err(|error| Errno(error.raw_os_error().unwrap_or(0)))
    }

    /// Returns true if the path is an executable file.
    #[must_use]
    pub fn is_executable(&self, path: &CStr) -> bool {
        unsafe { libc::access(path.as_ptr(), libc::X_OK) == 0 }
    }

    /// Returns true if the path names a regular file.
    #[must_use]
    pub fn is_regular_file(&self, path: &CStr) -> bool {
        unsafe {
            let mut stat: libc::stat = std::mem::zeroed();
            libc::stat(path.as_ptr(), &mut stat) == 0
                && stat.st_mode & libc::S_IFMT == libc::S_IFREG
        }
    }

    /// Returns true if the path names a directory.
    #[must_use]
    pub fn is_directory(&self, path: &CStr) -> bool {
        unsafe {
            let mut stat: libc::stat = std::mem::zeroed();
            libc::stat(path.as_ptr(), &mut stat) == 0
                && stat.st_mode & libc::S_IFMT == libc::S_IFDIR
        }
    }

    /// Looks up a user's home directory, or the calling user's when the
    /// name is empty.
    #[must_use]
    pub fn home_dir(&self, user: &str) -> Option<String> {
        unsafe {
            let passwd = if user.is_empty() {
                libc::getpwuid(libc::getuid())
            } else {
                let name = CString::new(user).ok()?;
                libc::getpwnam(name.as_ptr())
            };
            if passwd.is_null() {
                return None;
            }
            let dir = (*passwd).pw_dir;
            if dir.is_null() {
                return None;
            }
            Some(CStr::from_ptr(dir).to_string_lossy().into_owned())
        }
    }
}

fn decode_wait_status(pid: Pid, status: c_int) -> WaitOutcome {
    if libc::WIFEXITED(status) {
        WaitOutcome::Exited(pid, ExitStatus(libc::WEXITSTATUS(status)))
    } else if libc::WIFSIGNALED(status) {
        WaitOutcome::Signaled(pid, libc::WTERMSIG(status))
    } else if libc::WIFSTOPPED(status) {
        WaitOutcome::Stopped(pid, libc::WSTOPSIG(status))
    } else {
        WaitOutcome::Continued(pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipe_is_cloexec_and_readable() {
        let system = RealSystem::new();
        let (reader, writer) = system.pipe().unwrap();
        system.write_all(writer, b"ping").unwrap();
        let mut buffer = [0; 8];
        let count = system.read(reader, &mut buffer).unwrap();
        assert_eq!(&buffer[..count], b"ping");
        system.close(reader).unwrap();
        system.close(writer).unwrap();
    }

    #[test]
    fn dup_save_lands_above_internal_minimum() {
        let system = RealSystem::new();
        let (reader, writer) = system.pipe().unwrap();
        let saved = system.dup_save(reader).unwrap();
        assert!(saved >= MIN_INTERNAL_FD);
        system.close(saved).unwrap();
        system.close(reader).unwrap();
        system.close(writer).unwrap();
    }

    #[test]
    fn fork_wait_round_trip() {
        let system = RealSystem::new();
        match system.fork().unwrap() {
            ForkResult::Child => system.exit_process(ExitStatus(42)),
            ForkResult::Parent { child } => {
                let outcome = system.wait(child).unwrap();
                assert_eq!(outcome, WaitOutcome::Exited(child, ExitStatus(42)));
            }
        }
    }

    #[test]
    fn home_dir_of_root() {
        let system = RealSystem::new();
        assert_eq!(system.home_dir("root").as_deref(), Some("/root"));
    }
}
