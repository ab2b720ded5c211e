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

//! The `exit` built-in

use crate::common::{parse_status, usage_error};
use blush_env::builtin::Result;
use blush_env::semantics::{Divert, Field};
use blush_env::Env;
use std::ops::ControlFlow::Break;

/// Entry point of the `exit` built-in.
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let status = match args.first() {
        None => env.exit_status,
        Some(field) => match parse_status(&field.value) {
            Some(status) => status,
            None => {
                // Bash exits anyway after the message, with status 2
                let result = usage_error(
                    env,
                    "exit",
                    &format!("{}: numeric argument required", field.value),
                );
                return Result {
                    exit_status: result.exit_status,
                    divert: Break(Divert::Exit(Some(result.exit_status))),
                };
            }
        },
    };
    Result {
        exit_status: status,
        divert: Break(Divert::Exit(Some(status))),
    }
}
