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

//! Command search
//!
//! Resolution order: special built-ins, functions, other built-ins, then
//! external commands through `$PATH`. External lookups are cached; the
//! cache is invalidated when `PATH` is assigned or `hash -r` runs.

use blush_env::builtin::Builtin;
use blush_env::function::Function;
use blush_env::Env;
use std::ffi::CString;
use std::rc::Rc;

/// Result of command search
#[derive(Clone, Debug)]
pub enum Target {
    /// Built-in utility
    Builtin(Builtin),
    /// Defined function
    Function(Rc<Function>),
    /// External command with its resolved path
    External(String),
    /// Nothing found
    NotFound,
}

/// Searches for the target of a command name.
pub fn search(env: &mut Env, name: &str) -> Target {
    if let Some(builtin) = env.builtins.get(name) {
        if builtin.is_special {
            return Target::Builtin(*builtin);
        }
    }
    if let Some(function) = env.functions.get(name) {
        return Target::Function(Rc::clone(function));
    }
    if let Some(builtin) = env.builtins.get(name) {
        return Target::Builtin(*builtin);
    }

    // A slash bypasses the PATH search
    if name.contains('/') {
        return Target::External(name.to_owned());
    }

    if let Some(path) = env.hashed_commands.get(name) {
        return Target::External(path.clone());
    }
    match search_path(env, name) {
        Some(path) => {
            env.hashed_commands.insert(name.to_owned(), path.clone());
            Target::External(path)
        }
        None => Target::NotFound,
    }
}

/// Walks `$PATH` looking for an executable regular file.
fn search_path(env: &Env, name: &str) -> Option<String> {
    let path = env.variables.get_scalar("PATH")?.into_owned();
    for dir in path.split(':') {
        let dir = if dir.is_empty() { "." } else { dir };
        let candidate = format!("{dir}/{name}");
        let Ok(c_path) = CString::new(candidate.as_str()) else {
            continue;
        };
        if env.system.is_regular_file(&c_path) && env.system.is_executable(&c_path) {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_env;
    use assert_matches::assert_matches;

    #[test]
    fn finds_external_commands_in_path() {
        let mut env = test_env();
        assert_matches!(search(&mut env, "cat"), Target::External(path) => {
            assert!(path.ends_with("/cat"), "{path}");
        });
    }

    #[test]
    fn second_lookup_hits_the_cache() {
        let mut env = test_env();
        let _ = search(&mut env, "cat");
        assert!(env.hashed_commands.contains_key("cat"));
    }

    #[test]
    fn slash_bypasses_path_search() {
        let mut env = test_env();
        assert_matches!(search(&mut env, "./relative"), Target::External(path) => {
            assert_eq!(path, "./relative");
        });
    }

    #[test]
    fn functions_shadow_externals() {
        let mut env = test_env();
        env.functions.define(Function {
            name: "cat".to_owned(),
            body: Rc::new(blush_syntax::syntax::FullCompoundCommand {
                command: blush_syntax::syntax::CompoundCommand::Grouping(
                    blush_syntax::syntax::List::default(),
                ),
                redirs: vec![],
            }),
            origin: blush_syntax::source::Location::dummy("cat"),
        });
        assert_matches!(search(&mut env, "cat"), Target::Function(_));
    }

    #[test]
    fn unknown_command() {
        let mut env = test_env();
        assert_matches!(
            search(&mut env, "definitely-no-such-command-here"),
            Target::NotFound
        );
    }
}
