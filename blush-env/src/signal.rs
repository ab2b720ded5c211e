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

//! Signal catching
//!
//! The process-wide signal handler only records the caught signal in an
//! async-signal-safe flag array and writes a byte to a self-pipe; the
//! main loop drains the flags between commands and runs trap actions.
//! This is the one piece of process-global state in the shell, imposed by
//! the C signal handler interface.

use std::ffi::c_int;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

const MAX_SIGNAL: usize = 64;

static CAUGHT: [AtomicBool; MAX_SIGNAL + 1] = {
    #[allow(clippy::declare_interior_mutable_const)]
    const FALSE: AtomicBool = AtomicBool::new(false);
    [FALSE; MAX_SIGNAL + 1]
};
static ANY_CAUGHT: AtomicBool = AtomicBool::new(false);
static SELF_PIPE_WRITER: AtomicI32 = AtomicI32::new(-1);

/// Process-wide signal handler
///
/// Only async-signal-safe operations are allowed here. Exposed so the
/// system layer can install it and tests can simulate signal receipt.
pub extern "C" fn catch_signal(signal: c_int) {
    if let Ok(index) = usize::try_from(signal) {
        if index <= MAX_SIGNAL {
            CAUGHT[index].store(true, Ordering::Relaxed);
            ANY_CAUGHT.store(true, Ordering::Release);
        }
    }
    let fd = SELF_PIPE_WRITER.load(Ordering::Relaxed);
    if fd >= 0 {
        let byte = [signal as u8];
        unsafe {
            libc::write(fd, byte.as_ptr().cast(), 1);
        }
    }
}

/// Registers the write end of the self-pipe used to wake blocking reads.
pub fn set_self_pipe_writer(fd: c_int) {
    SELF_PIPE_WRITER.store(fd, Ordering::Relaxed);
}

/// Returns true if any signal has been caught since the last drain.
#[must_use]
pub fn any_caught() -> bool {
    ANY_CAUGHT.load(Ordering::Acquire)
}

/// Takes the set of caught signals, clearing the flags.
#[must_use]
pub fn take_caught() -> Vec<c_int> {
    if !ANY_CAUGHT.swap(false, Ordering::AcqRel) {
        return Vec::new();
    }
    let mut result = Vec::new();
    for (index, flag) in CAUGHT.iter().enumerate() {
        if flag.swap(false, Ordering::Relaxed) {
            result.push(index as c_int);
        }
    }
    result
}

/// Returns and clears the caught flag for one signal.
#[must_use]
pub fn take_one(signal: c_int) -> bool {
    match usize::try_from(signal) {
        Ok(index) if index <= MAX_SIGNAL => CAUGHT[index].swap(false, Ordering::Relaxed),
        _ => false,
    }
}

/// Well-known signal names and numbers
const NAMES: &[(&str, c_int)] = &[
    ("HUP", libc::SIGHUP),
    ("INT", libc::SIGINT),
    ("QUIT", libc::SIGQUIT),
    ("ILL", libc::SIGILL),
    ("TRAP", libc::SIGTRAP),
    ("ABRT", libc::SIGABRT),
    ("BUS", libc::SIGBUS),
    ("FPE", libc::SIGFPE),
    ("KILL", libc::SIGKILL),
    ("USR1", libc::SIGUSR1),
    ("SEGV", libc::SIGSEGV),
    ("USR2", libc::SIGUSR2),
    ("PIPE", libc::SIGPIPE),
    ("ALRM", libc::SIGALRM),
    ("TERM", libc::SIGTERM),
    ("CHLD", libc::SIGCHLD),
    ("CONT", libc::SIGCONT),
    ("STOP", libc::SIGSTOP),
    ("TSTP", libc::SIGTSTP),
    ("TTIN", libc::SIGTTIN),
    ("TTOU", libc::SIGTTOU),
    ("URG", libc::SIGURG),
    ("XCPU", libc::SIGXCPU),
    ("XFSZ", libc::SIGXFSZ),
    ("VTALRM", libc::SIGVTALRM),
    ("PROF", libc::SIGPROF),
    ("WINCH", libc::SIGWINCH),
    ("IO", libc::SIGIO),
    ("SYS", libc::SIGSYS),
];

/// Resolves a signal name (with or without the `SIG` prefix) or a signal
/// number string.
#[must_use]
pub fn number_from_name(name: &str) -> Option<c_int> {
    if let Ok(number) = name.parse::<c_int>() {
        return (0..=MAX_SIGNAL as c_int).contains(&number).then_some(number);
    }
    let bare = name.strip_prefix("SIG").unwrap_or(name);
    NAMES
        .iter()
        .find(|&&(n, _)| n.eq_ignore_ascii_case(bare))
        .map(|&(_, number)| number)
}

/// Returns the conventional name of a signal, without the `SIG` prefix.
#[must_use]
pub fn name_from_number(number: c_int) -> Option<&'static str> {
    NAMES
        .iter()
        .find(|&&(_, n)| n == number)
        .map(|&(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_lookup() {
        assert_eq!(number_from_name("INT"), Some(libc::SIGINT));
        assert_eq!(number_from_name("SIGTERM"), Some(libc::SIGTERM));
        assert_eq!(number_from_name("term"), Some(libc::SIGTERM));
        assert_eq!(number_from_name("2"), Some(2));
        assert_eq!(number_from_name("NOSUCH"), None);
    }

    #[test]
    fn number_lookup() {
        assert_eq!(name_from_number(libc::SIGINT), Some("INT"));
        assert_eq!(name_from_number(-1), None);
    }

    #[test]
    fn caught_flags_round_trip() {
        assert!(!any_caught());
        catch_signal(libc::SIGUSR1);
        assert!(any_caught());
        let caught = take_caught();
        assert!(caught.contains(&libc::SIGUSR1));
        assert!(!any_caught());
        assert!(take_caught().is_empty());
    }
}
