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

//! Brace expansion
//!
//! Brace expansion runs before every other expansion and works on the
//! textual form of the word: `a{b,c}d` makes the sibling words `abd` and
//! `acd`, and `{1..3}` counts. Only unquoted literal braces participate;
//! `${x}` and `"{a,b}"` are left alone. A brace group with no top-level
//! comma and no valid range is not expanded.

use blush_syntax::source::Location;
use blush_syntax::syntax::{Literal, Unquoted, Word, WordUnit};

/// Expands braces in a word, producing one or more sibling words.
pub fn expand_braces(word: &Word) -> Vec<Word> {
    let mut results = Vec::new();
    expand_into(word.units.clone(), &mut results, &word.location);
    results
}

fn expand_into(units: Vec<WordUnit>, out: &mut Vec<Word>, location: &Location) {
    match find_group(&units) {
        None => out.push(Word {
            units,
            location: location.clone(),
        }),
        Some(group) => {
            for alternative in group.alternatives {
                let mut expanded = units[..group.open].to_vec();
                expanded.extend(alternative);
                expanded.extend_from_slice(&units[group.close + 1..]);
                expand_into(expanded, out, location);
            }
        }
    }
}

struct Group {
    open: usize,
    close: usize,
    alternatives: Vec<Vec<WordUnit>>,
}

fn literal_char(unit: &WordUnit) -> Option<char> {
    match unit {
        Unquoted(Literal(c)) => Some(*c),
        _ => None,
    }
}

/// Finds the first expandable brace group.
fn find_group(units: &[WordUnit]) -> Option<Group> {
    let mut open = 0;
    while open < units.len() {
        if literal_char(&units[open]) != Some('{') {
            open += 1;
            continue;
        }
        if let Some(group) = parse_group(units, open) {
            return Some(group);
        }
        open += 1;
    }
    None
}

/// Parses the group starting at the `{` at `open`, if it is expandable.
fn parse_group(units: &[WordUnit], open: usize) -> Option<Group> {
    let mut depth = 0u32;
    let mut commas = Vec::new();
    let mut close = None;
    for (index, unit) in units.iter().enumerate().skip(open + 1) {
        match literal_char(unit) {
            Some('{') => depth += 1,
            Some('}') => {
                if depth == 0 {
                    close = Some(index);
                    break;
                }
                depth -= 1;
            }
            Some(',') if depth == 0 => commas.push(index),
            _ => {}
        }
    }
    let close = close?;

    if !commas.is_empty() {
        let mut alternatives = Vec::new();
        let mut start = open + 1;
        for comma in commas.iter().copied().chain([close]) {
            alternatives.push(units[start..comma].to_vec());
            start = comma + 1;
        }
        return Some(Group {
            open,
            close,
            alternatives,
        });
    }

    // `{x..y}` or `{x..y..step}` ranges
    let content: String = units[open + 1..close]
        .iter()
        .map(|unit| literal_char(unit))
        .collect::<Option<String>>()?;
    let alternatives = expand_range(&content)?
        .into_iter()
        .map(|text| text.chars().map(|c| Unquoted(Literal(c))).collect())
        .collect();
    Some(Group {
        open,
        close,
        alternatives,
    })
}

fn expand_range(content: &str) -> Option<Vec<String>> {
    let mut parts = content.split("..");
    let start = parts.next()?;
    let end = parts.next()?;
    let step = match parts.next() {
        None => 1,
        Some(step) => step.parse::<i64>().ok()?.unsigned_abs().max(1) as i64,
    };
    if parts.next().is_some() {
        return None;
    }

    if let (Ok(start_n), Ok(end_n)) = (start.parse::<i64>(), end.parse::<i64>()) {
        let width = if has_padding(start) || has_padding(end) {
            start.len().max(end.len())
        } else {
            0
        };
        let mut values = Vec::new();
        let mut current = start_n;
        loop {
            values.push(format!("{:0width$}", current, width = width));
            if start_n <= end_n {
                current += step;
                if current > end_n {
                    break;
                }
            } else {
                current -= step;
                if current < end_n {
                    break;
                }
            }
        }
        return Some(values);
    }

    // Single-character ranges like {a..e}
    let (start_c, end_c) = match (only_char(start), only_char(end)) {
        (Some(s), Some(e)) if s.is_ascii_alphabetic() && e.is_ascii_alphabetic() => (s, e),
        _ => return None,
    };
    let (from, to) = (start_c as u32, end_c as u32);
    let mut values = Vec::new();
    let mut current = from;
    loop {
        values.push(char::from_u32(current)?.to_string());
        if from <= to {
            current += step as u32;
            if current > to {
                break;
            }
        } else {
            current = current.checked_sub(step as u32)?;
            if current < to {
                break;
            }
        }
    }
    Some(values)
}

fn has_padding(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    digits.len() > 1 && digits.starts_with('0')
}

fn only_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}
