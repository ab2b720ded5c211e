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

//! The `cd` and `pwd` built-ins

use crate::common::{failure, output};
use blush_env::builtin::Result;
use blush_env::semantics::Field;
use blush_env::variable::{Attr, Scope, Value};
use blush_env::Env;
use std::ffi::CString;

/// Entry point of the `cd` built-in.
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let operand = args.first().map(|field| field.value.as_str());
    let (target, echo) = match operand {
        None | Some("--") => match env.variables.get_scalar("HOME") {
            Some(home) => (home.into_owned(), false),
            None => return failure(env, "cd", "HOME is not set"),
        },
        Some("-") => match env.variables.get_scalar("OLDPWD") {
            Some(oldpwd) => (oldpwd.into_owned(), true),
            None => return failure(env, "cd", "OLDPWD is not set"),
        },
        Some(path) => (path.to_owned(), false),
    };

    let previous = env.system.getcwd().unwrap_or_default();
    let Ok(c_target) = CString::new(target.as_str()) else {
        return failure(env, "cd", &format!("{target}: invalid path"));
    };
    if let Err(errno) = env.system.chdir(&c_target) {
        return failure(env, "cd", &format!("{target}: {errno}"));
    }

    let current = env.system.getcwd().unwrap_or(target);
    let _ = env
        .variables
        .assign("OLDPWD", Value::Scalar(previous));
    let _ = env.variables.assign("PWD", Value::Scalar(current.clone()));
    env.variables.get_or_new("PWD", Scope::Global).attrs |= Attr::Export;
    env.variables.get_or_new("OLDPWD", Scope::Global).attrs |= Attr::Export;

    if echo {
        return output(env, &format!("{current}\n"));
    }
    Result::SUCCESS
}

/// Entry point of the `pwd` built-in.
pub fn pwd_main(env: &mut Env, _args: Vec<Field>) -> Result {
    match env.system.getcwd() {
        Ok(path) => output(env, &format!("{path}\n")),
        Err(errno) => failure(env, "pwd", &errno.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests::{run_and_capture, test_env};

    // These tests change the process working directory, so they run in
    // one test to avoid interference.
    #[test]
    fn cd_updates_pwd_and_oldpwd() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().canonicalize().unwrap();
        let mut env = test_env();
        let origin = env.system.getcwd().unwrap();

        run_and_capture(&mut env, &format!("cd {}", target.display()));
        assert_eq!(
            env.variables.get_scalar("PWD").unwrap(),
            target.display().to_string()
        );
        assert_eq!(env.variables.get_scalar("OLDPWD").unwrap(), origin);

        let output = run_and_capture(&mut env, "cd -\npwd");
        assert!(output.starts_with(&origin), "{output}");

        run_and_capture(&mut env, "cd /no/such/dir");
        assert!(!env.exit_status.is_successful());
    }
}
