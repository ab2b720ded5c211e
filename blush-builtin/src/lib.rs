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

//! Built-in utilities of the blush shell.
//!
//! Each module implements one utility as a `main` function taking the
//! environment and the expanded arguments. [`register`] installs them all
//! into an environment; the executor finds them through
//! `Env::builtins`. The control-flow builtins (`break`, `continue`,
//! `return`, `exit`) communicate with the executor through
//! [`Divert`](blush_env::semantics::Divert) values in their results.

pub mod alias;
pub mod r#break;
pub mod cd;
pub mod r#continue;
pub mod declare;
pub mod eval;
pub mod exit;
pub mod export;
pub mod hash;
pub mod local;
pub mod misc;
pub mod read;
pub mod r#return;
pub mod set;
pub mod shift;
pub mod source;
pub mod trap;
pub mod unset;

mod common;

use blush_env::builtin::Builtin;
use blush_env::Env;

/// All built-ins with their names and POSIX special-ness
pub const BUILTINS: &[(&str, Builtin)] = &[
    (":", Builtin { execute: misc::colon_main, is_special: true }),
    (".", Builtin { execute: source::main, is_special: true }),
    ("alias", Builtin { execute: alias::alias_main, is_special: false }),
    ("break", Builtin { execute: r#break::main, is_special: true }),
    ("cd", Builtin { execute: cd::main, is_special: false }),
    ("continue", Builtin { execute: r#continue::main, is_special: true }),
    ("declare", Builtin { execute: declare::main, is_special: false }),
    ("echo", Builtin { execute: misc::echo_main, is_special: false }),
    ("eval", Builtin { execute: eval::main, is_special: true }),
    ("exit", Builtin { execute: exit::main, is_special: true }),
    ("export", Builtin { execute: export::export_main, is_special: true }),
    ("false", Builtin { execute: misc::false_main, is_special: false }),
    ("hash", Builtin { execute: hash::main, is_special: false }),
    ("local", Builtin { execute: local::main, is_special: false }),
    ("pwd", Builtin { execute: cd::pwd_main, is_special: false }),
    ("read", Builtin { execute: read::main, is_special: false }),
    ("readonly", Builtin { execute: export::readonly_main, is_special: true }),
    ("return", Builtin { execute: r#return::main, is_special: true }),
    ("set", Builtin { execute: set::main, is_special: true }),
    ("shift", Builtin { execute: shift::main, is_special: true }),
    ("source", Builtin { execute: source::main, is_special: false }),
    ("trap", Builtin { execute: trap::main, is_special: true }),
    ("true", Builtin { execute: misc::true_main, is_special: false }),
    ("typeset", Builtin { execute: declare::main, is_special: false }),
    ("unalias", Builtin { execute: alias::unalias_main, is_special: false }),
    ("unset", Builtin { execute: unset::main, is_special: true }),
];

/// Installs all built-ins into the environment.
pub fn register(env: &mut Env) {
    for &(name, builtin) in BUILTINS {
        env.builtins.insert(name, builtin);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use blush_env::variable::{Attr, Scope, Value};
    use blush_env::Env;
    use blush_syntax::source::Source;

    /// An environment with all built-ins registered and `PATH` imported.
    pub fn test_env() -> Env {
        let mut env = Env::new();
        super::register(&mut env);
        let path = std::env::var("PATH")
            .unwrap_or_else(|_| "/usr/local/bin:/usr/bin:/bin".to_owned());
        env.variables
            .assign("PATH", Value::Scalar(path))
            .unwrap();
        env.variables.get_or_new("PATH", Scope::Global).attrs |= Attr::Export;
        env
    }

    /// Runs a script, capturing stdout through the shell's redirection.
    pub fn run_and_capture(env: &mut Env, script: &str) -> String {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("captured");
        let wrapped = format!("{{\n{script}\n}} > {}", path.display());
        let _ = blush_semantics::parse_and_execute(env, &wrapped, Source::Unknown);
        std::fs::read_to_string(&path).unwrap_or_default()
    }

    #[test]
    fn all_builtins_are_registered() {
        let env = test_env();
        for name in ["break", "set", "eval", ":", "echo", "trap"] {
            assert!(env.builtins.contains_key(name), "{name}");
        }
    }
}
