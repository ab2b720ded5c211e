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

//! The `alias` and `unalias` built-ins

use crate::common::{failure, output};
use blush_env::builtin::Result;
use blush_env::semantics::Field;
use blush_env::Env;
use blush_quote::quoted;
use blush_syntax::alias::HashEntry;
use std::fmt::Write as _;
use std::rc::Rc;

/// Entry point of the `alias` built-in.
pub fn alias_main(env: &mut Env, args: Vec<Field>) -> Result {
    if args.is_empty() {
        let mut entries: Vec<_> = env.aliases.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.name.cmp(&b.0.name));
        let mut text = String::new();
        for entry in entries {
            let _ = writeln!(
                text,
                "alias {}={}",
                entry.0.name,
                quoted(&entry.0.replacement)
            );
        }
        return output(env, &text);
    }

    let mut status = Result::SUCCESS;
    for field in &args {
        match field.value.split_once('=') {
            Some((name, replacement)) => {
                let entry = HashEntry::new(name, replacement, field.origin.clone());
                Rc::make_mut(&mut env.aliases).replace(entry);
            }
            None => match env.aliases.get(field.value.as_str()) {
                Some(entry) => {
                    let line = format!(
                        "alias {}={}\n",
                        entry.0.name,
                        quoted(&entry.0.replacement)
                    );
                    let _ = env.print(&line);
                }
                None => {
                    status = failure(
                        env,
                        "alias",
                        &format!("{}: not found", field.value),
                    );
                }
            },
        }
    }
    status
}

/// Entry point of the `unalias` built-in.
pub fn unalias_main(env: &mut Env, args: Vec<Field>) -> Result {
    if args.first().is_some_and(|field| field.value == "-a") {
        Rc::make_mut(&mut env.aliases).clear();
        return Result::SUCCESS;
    }
    let mut status = Result::SUCCESS;
    for field in &args {
        if Rc::make_mut(&mut env.aliases).take(field.value.as_str()).is_none() {
            status = failure(env, "unalias", &format!("{}: not found", field.value));
        }
    }
    status
}
