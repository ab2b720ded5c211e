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

//! The `source` (`.`) built-in

use crate::common::{failure, usage_error};
use blush_env::builtin::Result;
use blush_env::semantics::{Divert, Field};
use blush_env::stack::Frame;
use blush_env::variable::PositionalParams;
use blush_env::Env;
use blush_syntax::source::Source;
use std::ops::ControlFlow::{Break, Continue};

/// Entry point of the `source` built-in.
///
/// The file runs in the current environment: variables, functions, and
/// option changes persist. `return` stops the sourced file. Extra
/// operands temporarily replace the positional parameters.
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let Some(path) = args.first() else {
        return usage_error(env, "source", "filename operand is missing");
    };
    let path = path.value.clone();

    let code = match std::fs::read_to_string(&path) {
        Ok(code) => code,
        Err(error) => return failure(env, "source", &format!("{path}: {error}")),
    };

    let replaced_params = if args.len() > 1 {
        let new = PositionalParams {
            values: args[1..].iter().map(|f| f.value.clone()).collect(),
        };
        Some(std::mem::replace(
            env.variables.positional_params_mut(),
            new,
        ))
    } else {
        None
    };

    let result = {
        let mut guard = env.push_frame(Frame::DotScript);
        blush_semantics::parse_and_execute(
            &mut guard,
            &code,
            Source::DotScript { path },
        )
    };

    if let Some(params) = replaced_params {
        *env.variables.positional_params_mut() = params;
    }

    let divert = match result {
        Break(Divert::Return(status)) => {
            if let Some(status) = status {
                env.exit_status = status;
            }
            Continue(())
        }
        other => other,
    };
    Result {
        exit_status: env.exit_status,
        divert,
    }
}
