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

//! Pathname expansion
//!
//! A field globs only when it contains an unquoted pattern character;
//! the quote origin is tracked per character, so `"*".txt` stays literal
//! while `*".txt"` matches. A pattern that matches nothing is left
//! unchanged, as in bash with `nullglob` off.

use super::attr::AttrChar;
use super::phrase::AttrField;
use super::to_field;
use blush_env::option::ShellOption;
use blush_env::semantics::Field;
use blush_env::Env;
use blush_fnmatch::{Config, Pattern, PatternChar};
use blush_syntax::source::Location;

/// Returns true if the field contains a character that can act as a
/// pattern operator.
fn has_active_pattern_char(chars: &[AttrChar], extglob: bool) -> bool {
    chars.iter().enumerate().any(|(index, c)| {
        c.is_pattern_char()
            && match c.value {
                '*' | '?' | '[' => true,
                '+' | '@' | '!' if extglob => {
                    matches!(chars.get(index + 1), Some(next) if next.value == '(')
                }
                _ => false,
            }
    })
}

fn pattern_chars(chars: &[AttrChar]) -> Vec<PatternChar> {
    chars
        .iter()
        .map(|c| {
            if c.is_pattern_char() {
                PatternChar::Normal(c.value)
            } else {
                PatternChar::Literal(c.value)
            }
        })
        .collect()
}

fn join(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_owned()
    } else if base.ends_with('/') {
        format!("{base}{name}")
    } else {
        format!("{base}/{name}")
    }
}

/// Expands pathnames for one field.
pub fn glob_field(env: &mut Env, field: AttrField, location: &Location) -> Vec<Field> {
    let extglob = env.options.get(ShellOption::Extglob);
    if env.options.get(ShellOption::Noglob) || !has_active_pattern_char(&field.chars, extglob) {
        return vec![to_field(field, location)];
    }

    let config = Config {
        extglob,
        literal_period: true,
    };

    // Split into path components; slashes are literal in paths
    let components: Vec<&[AttrChar]> = field
        .chars
        .split(|c| c.value == '/')
        .collect();

    let mut candidates: Vec<String> = vec![String::new()];
    let mut components = components.into_iter().peekable();
    if let Some(first) = components.peek() {
        if first.is_empty() {
            // Absolute path
            candidates = vec!["/".to_owned()];
            components.next();
        }
    }

    while let Some(component) = components.next() {
        let is_last = components.peek().is_none();
        if component.is_empty() {
            // Trailing slash: keep directories only
            candidates.retain(|candidate| std::path::Path::new(candidate).is_dir());
            for candidate in &mut candidates {
                if !candidate.ends_with('/') {
                    candidate.push('/');
                }
            }
            continue;
        }

        if has_active_pattern_char(component, extglob) {
            let Ok(pattern) = Pattern::parse(pattern_chars(component).into_iter(), &config)
            else {
                return vec![to_field(field, location)];
            };
            let mut next = Vec::new();
            for candidate in &candidates {
                let dir = if candidate.is_empty() { "." } else { candidate };
                let Ok(entries) = std::fs::read_dir(dir) else {
                    continue;
                };
                for entry in entries.flatten() {
                    let name = entry.file_name();
                    let Some(name) = name.to_str() else { continue };
                    if pattern.is_match(name) {
                        next.push(join(candidate, name));
                    }
                }
            }
            candidates = next;
        } else {
            let text: String = component.iter().map(|c| c.value).collect();
            candidates = candidates
                .into_iter()
                .map(|candidate| join(&candidate, &text))
                .filter(|path| {
                    !is_last || std::path::Path::new(path).exists()
                })
                .filter(|path| {
                    is_last || std::path::Path::new(path).is_dir()
                })
                .collect();
        }
        if candidates.is_empty() {
            break;
        }
    }

    if candidates.is_empty() {
        return vec![to_field(field, location)];
    }
    candidates.sort_unstable();
    candidates
        .into_iter()
        .map(|value| Field {
            value,
            origin: location.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::attr::{literal_chars, soft_chars};
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn make_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in ["apple.txt", "banana.txt", "cherry.log", ".hidden"] {
            File::create(dir.path().join(name)).unwrap();
        }
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        File::create(dir.path().join("sub/inner.txt")).unwrap();
        dir
    }

    fn glob(env: &mut Env, pattern: &str) -> Vec<String> {
        let field = AttrField {
            chars: literal_chars(pattern, false),
            quoted: false,
        };
        glob_field(env, field, &Location::dummy(pattern))
            .into_iter()
            .map(|field| field.value)
            .collect()
    }

    #[test]
    fn matches_are_sorted() {
        let dir = make_dir();
        let mut env = Env::new();
        let base = dir.path().to_str().unwrap();
        assert_eq!(
            glob(&mut env, &format!("{base}/*.txt")),
            [
                format!("{base}/apple.txt"),
                format!("{base}/banana.txt"),
            ]
        );
    }

    #[test]
    fn no_match_keeps_pattern() {
        let dir = make_dir();
        let mut env = Env::new();
        let base = dir.path().to_str().unwrap();
        let pattern = format!("{base}/*.nope");
        assert_eq!(glob(&mut env, &pattern), [pattern]);
    }

    #[test]
    fn hidden_files_need_a_literal_dot() {
        let dir = make_dir();
        let mut env = Env::new();
        let base = dir.path().to_str().unwrap();
        let all = glob(&mut env, &format!("{base}/*"));
        assert!(!all.iter().any(|p| p.ends_with(".hidden")), "{all:?}");
        let dotted = glob(&mut env, &format!("{base}/.h*"));
        assert_eq!(dotted, [format!("{base}/.hidden")]);
    }

    #[test]
    fn pattern_in_intermediate_component() {
        let dir = make_dir();
        let mut env = Env::new();
        let base = dir.path().to_str().unwrap();
        assert_eq!(
            glob(&mut env, &format!("{base}/s*/inner.txt")),
            [format!("{base}/sub/inner.txt")]
        );
    }

    #[test]
    fn quoted_metacharacters_do_not_glob() {
        let dir = make_dir();
        let mut env = Env::new();
        let base = dir.path().to_str().unwrap();
        let mut chars = literal_chars(&format!("{base}/"), false);
        chars.extend(literal_chars("*", true));
        let field = AttrField {
            chars,
            quoted: true,
        };
        let result = glob_field(&mut env, field, &Location::dummy("*"));
        assert_eq!(result.len(), 1);
        assert!(result[0].value.ends_with('*'));
    }

    #[test]
    fn soft_expansion_chars_do_glob() {
        let dir = make_dir();
        let mut env = Env::new();
        let base = dir.path().to_str().unwrap();
        let mut chars = literal_chars(&format!("{base}/"), false);
        chars.extend(soft_chars("*.log", false));
        let field = AttrField {
            chars,
            quoted: false,
        };
        let result = glob_field(&mut env, field, &Location::dummy(""));
        assert_eq!(result.len(), 1);
        assert!(result[0].value.ends_with("cherry.log"));
    }

    #[test]
    fn noglob_disables_expansion() {
        let dir = make_dir();
        let mut env = Env::new();
        env.options.set(ShellOption::Noglob, true);
        let base = dir.path().to_str().unwrap();
        let pattern = format!("{base}/*");
        assert_eq!(glob(&mut env, &pattern), [pattern]);
    }
}
