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

//! Command-line argument parsing
//!
//! `blush [OPTIONS] [SCRIPT [ARG…]]`, `blush -c COMMAND [NAME [ARG…]]`,
//! or interactive when standard input is a terminal and no script is
//! given.

use blush_env::option::ShellOption;
use thiserror::Error;

/// How the shell gets its input
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Mode {
    /// `-c`: run the given command string
    Command { command: String },
    /// Run a script file
    Script { path: String },
    /// `-s` (or no operands): read commands from standard input
    Stdin,
}

/// Parsed command line
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Invocation {
    /// Input mode; `None` means standard input, interactive when it is a
    /// terminal
    pub mode: Option<Mode>,
    /// Shell options to apply at startup
    pub option_changes: Vec<(ShellOption, bool)>,
    /// Force interactive mode (`-i`)
    pub force_interactive: bool,
    /// Skip the rc file (`--norc`)
    pub norc: bool,
    /// Alternative rc file (`--rcfile`)
    pub rcfile: Option<String>,
    /// Print the version and exit
    pub version: bool,
    /// Print usage and exit
    pub help: bool,
    /// `$0` and the positional parameters
    pub arg0: Option<String>,
    pub params: Vec<String>,
}

/// Error in the command line
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ArgsError {
    #[error("-c: command operand is missing")]
    MissingCommand,
    #[error("--rcfile: file operand is missing")]
    MissingRcFile,
    #[error("{0}: unknown option")]
    UnknownOption(String),
}

/// Parses the command line, excluding the program name.
pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Invocation, ArgsError> {
    let mut args = args.into_iter().peekable();
    let mut invocation = Invocation::default();
    let mut command_mode = false;
    let mut stdin_mode = false;

    while let Some(arg) = args.peek() {
        match arg.as_str() {
            "--" => {
                args.next();
                break;
            }
            "--norc" => {
                invocation.norc = true;
                args.next();
            }
            "--rcfile" => {
                args.next();
                match args.next() {
                    Some(file) => invocation.rcfile = Some(file),
                    None => return Err(ArgsError::MissingRcFile),
                }
            }
            "-V" | "--version" => {
                invocation.version = true;
                args.next();
            }
            "-h" | "--help" => {
                invocation.help = true;
                args.next();
            }
            "-o" | "+o" => {
                let enable = arg.starts_with('-');
                args.next();
                match args.next() {
                    Some(name) => match name.parse::<ShellOption>() {
                        Ok(option) => invocation.option_changes.push((option, enable)),
                        Err(_) => return Err(ArgsError::UnknownOption(name)),
                    },
                    None => return Err(ArgsError::UnknownOption("-o".to_owned())),
                }
            }
            flag if flag.starts_with('-') && flag.len() > 1 => {
                let enable = true;
                for c in flag[1..].chars() {
                    match c {
                        'c' => command_mode = true,
                        's' => stdin_mode = true,
                        'i' => invocation.force_interactive = true,
                        c => match ShellOption::from_short_flag(c) {
                            Some(option) => {
                                invocation.option_changes.push((option, enable));
                            }
                            None => return Err(ArgsError::UnknownOption(format!("-{c}"))),
                        },
                    }
                }
                args.next();
            }
            flag if flag.starts_with('+') && flag.len() > 1 => {
                for c in flag[1..].chars() {
                    match ShellOption::from_short_flag(c) {
                        Some(option) => invocation.option_changes.push((option, false)),
                        None => return Err(ArgsError::UnknownOption(format!("+{c}"))),
                    }
                }
                args.next();
            }
            _ => break,
        }
    }

    let mut operands: Vec<String> = args.collect();
    if command_mode {
        if operands.is_empty() {
            return Err(ArgsError::MissingCommand);
        }
        let command = operands.remove(0);
        invocation.mode = Some(Mode::Command { command });
        if !operands.is_empty() {
            invocation.arg0 = Some(operands.remove(0));
        }
        invocation.params = operands;
    } else if stdin_mode {
        invocation.mode = Some(Mode::Stdin);
        invocation.params = operands;
    } else if !operands.is_empty() {
        let path = operands.remove(0);
        invocation.arg0 = Some(path.clone());
        invocation.mode = Some(Mode::Script { path });
        invocation.params = operands;
    }
    Ok(invocation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_strs(args: &[&str]) -> Result<Invocation, ArgsError> {
        parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn empty_command_line_is_stdin_or_interactive() {
        let invocation = parse_strs(&[]).unwrap();
        assert_eq!(invocation.mode, None);
    }

    #[test]
    fn command_string_with_name_and_params() {
        let invocation = parse_strs(&["-c", "echo hi", "myname", "a", "b"]).unwrap();
        assert_eq!(
            invocation.mode,
            Some(Mode::Command {
                command: "echo hi".to_owned()
            })
        );
        assert_eq!(invocation.arg0.as_deref(), Some("myname"));
        assert_eq!(invocation.params, ["a", "b"]);
    }

    #[test]
    fn missing_command_operand() {
        assert_eq!(parse_strs(&["-c"]), Err(ArgsError::MissingCommand));
    }

    #[test]
    fn script_with_args() {
        let invocation = parse_strs(&["script.sh", "x"]).unwrap();
        assert_eq!(
            invocation.mode,
            Some(Mode::Script {
                path: "script.sh".to_owned()
            })
        );
        assert_eq!(invocation.params, ["x"]);
    }

    #[test]
    fn combined_short_flags() {
        let invocation = parse_strs(&["-ex", "-c", "true"]).unwrap();
        assert_eq!(invocation.option_changes.len(), 2);
        assert!(matches!(invocation.mode, Some(Mode::Command { .. })));
    }

    #[test]
    fn long_option_by_name() {
        let invocation = parse_strs(&["-o", "pipefail"]).unwrap();
        assert_eq!(
            invocation.option_changes,
            [(ShellOption::Pipefail, true)]
        );
    }

    #[test]
    fn rcfile_and_norc() {
        let invocation = parse_strs(&["--norc"]).unwrap();
        assert!(invocation.norc);
        let invocation = parse_strs(&["--rcfile", "my.rc"]).unwrap();
        assert_eq!(invocation.rcfile.as_deref(), Some("my.rc"));
    }

    #[test]
    fn double_dash_ends_options() {
        let invocation = parse_strs(&["--", "-c"]).unwrap();
        assert_eq!(
            invocation.mode,
            Some(Mode::Script {
                path: "-c".to_owned()
            })
        );
    }

    #[test]
    fn unknown_option_is_rejected() {
        assert!(matches!(
            parse_strs(&["-Z"]),
            Err(ArgsError::UnknownOption(_))
        ));
    }
}
