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

//! Recognition of tilde expansions in already-lexed words

use crate::syntax::*;

/// Converts a leading unquoted `~` in the word into a [`Tilde`] unit.
///
/// The tilde prefix extends up to (not including) the first unquoted `/`,
/// and must consist of literal characters only; any quoting or expansion
/// in the prefix suppresses tilde expansion.
#[must_use]
pub fn parse_tilde_front(mut word: Word) -> Word {
    if let Some(count) = tilde_prefix_length(&word.units, false) {
        let name = collect_name(&word.units[1..count]);
        word.units.splice(..count, [Tilde(name)]);
    }
    word
}

/// Converts tilde expansions after unquoted colons, in addition to the
/// leading one. This form applies to assignment values, where
/// `PATH=~/bin:~/sbin` expands both tildes.
#[must_use]
pub fn parse_tilde_everywhere(word: Word) -> Word {
    let mut word = parse_tilde_front(word);
    let mut index = 0;
    while index < word.units.len() {
        if word.units[index] == Unquoted(Literal(':')) {
            if let Some(count) = tilde_prefix_length(&word.units[index + 1..], true) {
                let name = collect_name(&word.units[index + 2..index + 1 + count]);
                word.units.splice(index + 1..index + 1 + count, [Tilde(name)]);
            }
        }
        index += 1;
    }
    word
}

/// Computes the unit count of the tilde prefix at the start of `units`,
/// including the tilde itself, or `None` if there is no tilde prefix.
fn tilde_prefix_length(units: &[WordUnit], stop_at_colon: bool) -> Option<usize> {
    if units.first() != Some(&Unquoted(Literal('~'))) {
        return None;
    }
    let mut count = 1;
    for unit in &units[1..] {
        match unit {
            Unquoted(Literal('/')) => break,
            Unquoted(Literal(':')) if stop_at_colon => break,
            Unquoted(Literal(_)) => count += 1,
            // A quoted or expanded character anywhere in the prefix
            // suppresses the expansion
            _ => return None,
        }
    }
    Some(count)
}

fn collect_name(units: &[WordUnit]) -> String {
    units
        .iter()
        .map(|unit| match unit {
            Unquoted(Literal(c)) => *c,
            _ => unreachable!("tilde prefix is all literal"),
        })
        .collect()
}
