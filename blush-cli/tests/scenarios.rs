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

//! End-to-end scenarios through the whole stack
//!
//! Each test builds a fresh environment with all built-ins, runs a
//! script, and captures its standard output through the shell's own
//! redirection (the script runs inside a brace group redirected to a
//! temporary file).

use blush_env::semantics::ExitStatus;
use blush_env::variable::{Attr, Scope, Value};
use blush_env::Env;
use blush_syntax::source::Source;

fn test_env() -> Env {
    let mut env = Env::new();
    blush_builtin::register(&mut env);
    let path =
        std::env::var("PATH").unwrap_or_else(|_| "/usr/local/bin:/usr/bin:/bin".to_owned());
    env.variables.assign("PATH", Value::Scalar(path)).unwrap();
    env.variables.get_or_new("PATH", Scope::Global).attrs |= Attr::Export;
    env
}

fn run_and_capture(env: &mut Env, script: &str) -> String {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("captured");
    let wrapped = format!("{{\n{script}\n}} > {}", path.display());
    let _ = blush_semantics::parse_and_execute(env, &wrapped, Source::Unknown);
    std::fs::read_to_string(&path).unwrap_or_default()
}

fn run(script: &str) -> String {
    run_and_capture(&mut test_env(), script)
}

#[test]
fn scenario_pipeline_with_pipefail() {
    let script = "\
set -o pipefail
false | true
echo $?";
    assert_eq!(run(script), "1\n");
}

#[test]
fn scenario_parameter_expansion_case_and_substring() {
    let script = r#"s="Hello, World"
echo "${s^^}"
echo "${s:7:5}"
echo "${s//l/L}""#;
    assert_eq!(run(script), "HELLO, WORLD\nWorld\nHeLLo, WorLd\n");
}

#[test]
fn scenario_array_with_quoted_splat() {
    let script = r#"arr=("a b" c)
for x in "${arr[@]}"; do echo "[$x]"; done
echo "count=${#arr[@]}""#;
    assert_eq!(run(script), "[a b]\n[c]\ncount=2\n");
}

#[test]
fn scenario_for_loop_over_command_substitution() {
    let script = "\
set -e
total=0
for n in $(printf '%s\\n' 1 2 3); do total=$((total + n)); done
echo $total";
    assert_eq!(run(script), "6\n");
}

#[test]
fn scenario_function_with_local_scope_and_return() {
    let script = r#"f() { local x=inner; echo "f:$x"; return 7; }
x=outer
f
echo "outer:$x exit:$?""#;
    assert_eq!(run(script), "f:inner\nouter:outer exit:7\n");
}

#[test]
fn scenario_heredoc_with_and_without_expansion() {
    let script = "\
name=world
cat <<EOF
hello $name
EOF
cat <<'EOF'
hello $name
EOF";
    assert_eq!(run(script), "hello world\nhello $name\n");
}

// Boundary behaviors

#[test]
fn empty_input_is_a_successful_no_op() {
    let mut env = test_env();
    let status = blush_semantics::run_script(&mut env, "", Source::Unknown);
    assert_eq!(status, ExitStatus::SUCCESS);
    let status = blush_semantics::run_script(&mut env, "\n\n# comment\n", Source::Unknown);
    assert_eq!(status, ExitStatus::SUCCESS);
}

#[test]
fn pipeline_of_one_is_the_command_itself() {
    assert_eq!(run("echo solo"), "solo\n");
}

#[test]
fn errexit_stops_before_echo() {
    assert_eq!(run("set -e\nfalse\necho ok"), "");
}

#[test]
fn errexit_spares_guarded_positions() {
    assert_eq!(run("set -e\nif false; then :; fi\necho ok"), "ok\n");
    assert_eq!(run("set -e\nfalse || true\necho ok"), "ok\n");
    assert_eq!(run("set -e\n! false\necho ok"), "ok\n");
}

#[test]
fn for_over_nothing_loops_zero_times() {
    let mut env = test_env();
    let output = run_and_capture(&mut env, "for x in; do echo $x; done");
    assert_eq!(output, "");
    assert_eq!(env.exit_status, ExitStatus::SUCCESS);
}

#[test]
fn quoted_at_with_no_params_expands_to_zero_fields() {
    // `printf` with no operands prints nothing for %s
    assert_eq!(run(r#"printf '[%s]' "$@"; echo"#), "[]\n");
    assert_eq!(run(r#"set -- a b; printf '[%s]' "$@"; echo"#), "[a][b]\n");
}

#[test]
fn switch_defaults() {
    let script = r#"empty=
echo "1:${unset:-default}"
echo "2:${unset-default}"
echo "3:${empty:-default}"
echo "4:${empty-default}""#;
    assert_eq!(run(script), "1:default\n2:default\n3:default\n4:\n");
}

#[test]
fn single_quotes_round_trip_arbitrary_bytes() {
    let script = "echo 'a  $x `cmd` \\ * ? [z] ;& | < >'";
    assert_eq!(run(script), "a  $x `cmd` \\ * ? [z] ;& | < >\n");
}

#[test]
fn quoted_variable_round_trips_its_value() {
    let script = r#"v='  spaces   *glob*  $dollar  '
printf '[%s]' "${v}"
echo"#;
    assert_eq!(run(script), "[  spaces   *glob*  $dollar  ]\n");
}

#[test]
fn quoted_at_preserves_field_boundaries() {
    let script = r#"set -- "a b" "" c
printf '[%s]' "$@"
echo"#;
    assert_eq!(run(script), "[a b][][c]\n");
}

#[test]
fn exit_status_is_always_in_byte_range() {
    let mut env = test_env();
    run_and_capture(&mut env, "f() { return 300; }; f");
    assert!((0..=255).contains(&env.exit_status.0));
}

#[test]
fn late_binding_of_loop_variables() {
    // $x in the body must see the value of the current iteration
    assert_eq!(
        run("x=start\nfor x in 1 2; do echo $x; done"),
        "1\n2\n"
    );
}

#[test]
fn subshell_does_not_leak_state() {
    let script = "x=outer\n(x=inner; cd /; exit 3)\necho $x $?";
    assert_eq!(run(script), "outer 3\n");
}

#[test]
fn command_line_mode_runs_command_string() {
    use blush_cli::args::{Invocation, Mode};
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("out");
    let invocation = Invocation {
        mode: Some(Mode::Command {
            command: format!("echo from -c > {}", path.display()),
        }),
        arg0: Some("test-shell".to_owned()),
        ..Invocation::default()
    };
    let status = blush_cli::run(&invocation);
    assert_eq!(status, ExitStatus::SUCCESS);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "from -c\n");
}

#[test]
fn script_mode_positional_params() {
    use blush_cli::args::{Invocation, Mode};
    let dir = tempfile::TempDir::new().unwrap();
    let script = dir.path().join("script.sh");
    let out = dir.path().join("out");
    std::fs::write(&script, format!("echo $0:$1:$# > {}\n", out.display())).unwrap();
    let invocation = Invocation {
        mode: Some(Mode::Script {
            path: script.display().to_string(),
        }),
        arg0: Some(script.display().to_string()),
        params: vec!["first".to_owned()],
        ..Invocation::default()
    };
    let status = blush_cli::run(&invocation);
    assert_eq!(status, ExitStatus::SUCCESS);
    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        format!("{}:first:1\n", script.display())
    );
}

#[test]
fn syntax_error_in_script_exits_2() {
    use blush_cli::args::{Invocation, Mode};
    let invocation = Invocation {
        mode: Some(Mode::Command {
            command: "if true; done".to_owned(),
        }),
        ..Invocation::default()
    };
    assert_eq!(blush_cli::run(&invocation), ExitStatus::ERROR);
}

#[test]
fn missing_script_file_exits_127() {
    use blush_cli::args::{Invocation, Mode};
    let invocation = Invocation {
        mode: Some(Mode::Script {
            path: "/no/such/script/file".to_owned(),
        }),
        ..Invocation::default()
    };
    assert_eq!(blush_cli::run(&invocation), ExitStatus::NOT_FOUND);
}
