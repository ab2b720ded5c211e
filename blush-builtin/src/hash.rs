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

//! The `hash` built-in

use crate::common::{failure, output};
use blush_env::builtin::Result;
use blush_env::semantics::Field;
use blush_env::Env;
use blush_semantics::command_search::{search, Target};
use std::fmt::Write as _;

/// Entry point of the `hash` built-in.
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    if args.first().is_some_and(|field| field.value == "-r") {
        env.hashed_commands.clear();
        return Result::SUCCESS;
    }

    if args.is_empty() {
        let mut entries: Vec<_> = env.hashed_commands.iter().collect();
        entries.sort_unstable();
        let mut text = String::new();
        for (name, path) in entries {
            let _ = writeln!(text, "{name}\t{path}");
        }
        return output(env, &text);
    }

    let mut status = Result::SUCCESS;
    for field in &args {
        let name = field.value.clone();
        env.hashed_commands.remove(&name);
        match search(env, &name) {
            Target::External(_) | Target::Builtin(_) | Target::Function(_) => {}
            Target::NotFound => {
                status = failure(env, "hash", &format!("{name}: not found"));
            }
        }
    }
    status
}

#[cfg(test)]
mod tests {
    use crate::tests::{run_and_capture, test_env};

    #[test]
    fn hash_records_and_clears() {
        let mut env = test_env();
        run_and_capture(&mut env, "hash cat");
        assert!(env.hashed_commands.contains_key("cat"));
        run_and_capture(&mut env, "hash -r");
        assert!(env.hashed_commands.is_empty());
    }

    #[test]
    fn hash_missing_command_fails() {
        let mut env = test_env();
        run_and_capture(&mut env, "hash no-such-binary-anywhere");
        assert!(!env.exit_status.is_successful());
    }
}
