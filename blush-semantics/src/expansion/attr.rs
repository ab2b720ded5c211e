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

//! Characters with origin and quotation attributes
//!
//! The middle stages of expansion operate on [`AttrChar`]s rather than
//! plain characters: field splitting applies only to unquoted characters
//! that came from an expansion, and pathname expansion treats quoted
//! characters as pattern literals. This is how `"*".txt` stays literal
//! while `*".txt"` globs.

/// Origin of an expanded character
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Origin {
    /// The character was written literally in the word.
    Literal,
    /// The character resulted from an expansion whose result is subject
    /// to field splitting and pathname expansion (parameter, command, and
    /// arithmetic expansion).
    SoftExpansion,
    /// The character resulted from an expansion that is not further
    /// split or pattern-matched (tilde expansion, process substitution
    /// paths).
    HardExpansion,
}

/// Character with attributes
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AttrChar {
    /// Character value
    pub value: char,
    /// Where the character came from
    pub origin: Origin,
    /// Whether the character was inside quotes
    pub is_quoted: bool,
}

impl AttrChar {
    /// Returns true if field splitting may split at this character.
    #[must_use]
    pub fn is_splittable(&self) -> bool {
        self.origin == Origin::SoftExpansion && !self.is_quoted
    }

    /// Returns true if this character may act as a pattern character in
    /// pathname expansion.
    #[must_use]
    pub fn is_pattern_char(&self) -> bool {
        !self.is_quoted && self.origin != Origin::HardExpansion
    }
}

/// Creates literal attribute characters from a string.
pub fn literal_chars(s: &str, is_quoted: bool) -> Vec<AttrChar> {
    s.chars()
        .map(|value| AttrChar {
            value,
            origin: Origin::Literal,
            is_quoted,
        })
        .collect()
}

/// Creates soft-expansion attribute characters from a string.
pub fn soft_chars(s: &str, is_quoted: bool) -> Vec<AttrChar> {
    s.chars()
        .map(|value| AttrChar {
            value,
            origin: Origin::SoftExpansion,
            is_quoted,
        })
        .collect()
}

/// Creates hard-expansion attribute characters from a string.
pub fn hard_chars(s: &str) -> Vec<AttrChar> {
    s.chars()
        .map(|value| AttrChar {
            value,
            origin: Origin::HardExpansion,
            is_quoted: false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splittable_requires_soft_and_unquoted() {
        let soft = AttrChar {
            value: 'a',
            origin: Origin::SoftExpansion,
            is_quoted: false,
        };
        assert!(soft.is_splittable());
        let quoted = AttrChar {
            is_quoted: true,
            ..soft
        };
        assert!(!quoted.is_splittable());
        let literal = AttrChar {
            origin: Origin::Literal,
            ..soft
        };
        assert!(!literal.is_splittable());
    }

    #[test]
    fn pattern_chars() {
        let literal = AttrChar {
            value: '*',
            origin: Origin::Literal,
            is_quoted: false,
        };
        assert!(literal.is_pattern_char());
        let hard = AttrChar {
            origin: Origin::HardExpansion,
            ..literal
        };
        assert!(!hard.is_pattern_char());
    }
}
