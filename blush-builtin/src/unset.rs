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

//! The `unset` built-in

use crate::common::failure;
use blush_env::builtin::Result;
use blush_env::semantics::Field;
use blush_env::Env;

/// Entry point of the `unset` built-in.
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let mut functions = false;
    let mut names = Vec::new();
    for field in &args {
        match field.value.as_str() {
            "-f" => functions = true,
            "-v" => functions = false,
            "--" => {}
            name => names.push(name.to_owned()),
        }
    }

    let mut status = Result::SUCCESS;
    for name in names {
        if functions {
            env.functions.unset(&name);
        } else if let Err(error) = env.variables.unset(&name) {
            status = failure(env, "unset", &error.to_string());
        }
    }
    status
}
