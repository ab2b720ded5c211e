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

//! Execution environment of the blush shell.
//!
//! [`Env`] is the explicit context threaded through parsing support,
//! expansion, and execution: variables and their scopes, shell options,
//! functions, aliases, traps, jobs, the runtime stack, and the interface
//! to the operating system. There is no global mutable state except the
//! async-signal-safe flags in [`signal`], which the C signal handler
//! interface imposes.

pub mod builtin;
pub mod function;
pub mod job;
pub mod option;
pub mod semantics;
pub mod signal;
pub mod stack;
pub mod system;
pub mod trap;
pub mod variable;

use self::builtin::Builtin;
use self::function::FunctionSet;
use self::job::JobSet;
use self::option::{OptionSet, ShellOption};
use self::semantics::ExitStatus;
use self::stack::{Frame, Stack};
use self::system::{Pid, RealSystem};
use self::trap::TrapSet;
use self::variable::VariableSet;
use blush_syntax::alias::AliasSet;
use blush_syntax::syntax::Fd;
use std::cell::Cell;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;
use std::time::Instant;

/// Whole state of the shell
#[derive(Clone, Debug)]
pub struct Env {
    /// Aliases defined in the environment
    ///
    /// Reference-counted so the parser can hold the set while the
    /// environment is mutably borrowed for trap execution.
    pub aliases: Rc<AliasSet>,

    /// Built-in utilities, keyed by name
    pub builtins: HashMap<&'static str, Builtin>,

    /// Functions defined in the environment
    pub functions: FunctionSet,

    /// Variables and positional parameters
    pub variables: VariableSet,

    /// Shell options
    pub options: OptionSet,

    /// Trap actions
    pub traps: TrapSet,

    /// Asynchronous jobs
    pub jobs: JobSet,

    /// Runtime stack of loops, function bodies, conditions, …
    pub stack: Stack,

    /// Exit status of the last command (`$?`)
    pub exit_status: ExitStatus,

    /// Process ID of the last asynchronous command (`$!`)
    pub last_async_pid: Pid,

    /// Name the shell was invoked as, or the script name (`$0`)
    pub arg0: String,

    /// Resolved paths of previously found commands, invalidated when
    /// `PATH` changes or `hash -r` runs
    pub hashed_commands: HashMap<String, String>,

    /// Line number of the command being executed (`$LINENO`)
    pub line_number: Cell<u64>,

    /// State of the `RANDOM` generator
    pub random_state: Cell<u32>,

    /// Reference instant for `$SECONDS`
    pub seconds_base: Cell<Instant>,

    /// Open process substitutions of the command being executed
    ///
    /// Each entry is the shell-side file descriptor (whose `/dev/fd`
    /// path was handed to the command) and the substituted process. The
    /// executor closes the descriptors and reaps the processes once the
    /// owning command finishes.
    pub process_substs: Vec<(std::os::unix::io::RawFd, Pid)>,

    /// Interface to the operating system
    pub system: RealSystem,
}

impl Env {
    /// Creates a new environment with empty state.
    #[must_use]
    pub fn new() -> Env {
        let system = RealSystem::new();
        let seed = system.getpid() as u32 ^ 0x9E37_79B9;
        Env {
            aliases: Rc::new(AliasSet::new()),
            builtins: HashMap::new(),
            functions: FunctionSet::new(),
            variables: VariableSet::new(),
            options: OptionSet::new(),
            traps: TrapSet::new(),
            jobs: JobSet::new(),
            stack: Stack::new(),
            exit_status: ExitStatus::SUCCESS,
            last_async_pid: 0,
            arg0: "blush".to_owned(),
            hashed_commands: HashMap::new(),
            line_number: Cell::new(0),
            random_state: Cell::new(seed),
            seconds_base: Cell::new(Instant::now()),
            process_substs: Vec::new(),
            system,
        }
    }

    /// Returns true if the shell is interactive.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.options.get(ShellOption::Interactive)
    }

    /// Prints an error message to standard error, prefixed with the shell
    /// name.
    pub fn print_error(&mut self, message: &str) {
        let text = format!("{}: {}\n", self.arg0, message);
        let _ = self.system.write_all(Fd::STDERR.0, text.as_bytes());
    }

    /// Prints to standard output.
    pub fn print(&mut self, text: &str) -> Result<(), system::Errno> {
        self.system.write_all(Fd::STDOUT.0, text.as_bytes())
    }

    /// Pushes a runtime stack frame, returning a guard that pops it.
    pub fn push_frame(&mut self, frame: Frame) -> FrameGuard<'_> {
        self.stack.push(frame);
        FrameGuard { env: self }
    }

    /// Returns the next value of the `RANDOM` quirk variable.
    pub fn next_random(&self) -> u32 {
        // Xorshift; quality does not matter here
        let mut x = self.random_state.get();
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.random_state.set(x);
        x % 32768
    }
}

impl Default for Env {
    fn default() -> Self {
        Env::new()
    }
}

/// Guard that pops a runtime stack frame when dropped
///
/// Dereferences to [`Env`], so execution can continue through the guard.
#[derive(Debug)]
pub struct FrameGuard<'a> {
    env: &'a mut Env,
}

impl Deref for FrameGuard<'_> {
    type Target = Env;
    fn deref(&self) -> &Env {
        self.env
    }
}

impl DerefMut for FrameGuard<'_> {
    fn deref_mut(&mut self) -> &mut Env {
        self.env
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        self.env.stack.pop();
    }
}
