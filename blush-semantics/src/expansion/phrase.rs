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

//! Intermediate result of the initial expansion
//!
//! A [`Phrase`] is a sequence of attributed fields. Most word units
//! expand to a single field fragment, but `"$@"` and `"${arr[@]}"` yield
//! one field per element, and `"$@"` with no positional parameters yields
//! no field at all. Concatenating phrases glues the last field of the
//! left operand to the first field of the right one, so `a"$@"b` with
//! parameters `x y` makes the fields `ax` and `yb`, and a zero-field
//! phrase is the identity of concatenation.

use super::attr::AttrChar;

/// One field under construction
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AttrField {
    /// Characters of the field
    pub chars: Vec<AttrChar>,
    /// Whether any quoting construct contributed to the field, even an
    /// empty one: `""` makes an empty but quoted field that survives
    /// empty-field removal
    pub quoted: bool,
}

impl AttrField {
    /// Renders the characters as a plain string.
    #[must_use]
    pub fn to_string_value(&self) -> String {
        self.chars.iter().map(|c| c.value).collect()
    }
}

/// Sequence of fields produced by the initial expansion
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Phrase(pub Vec<AttrField>);

impl Phrase {
    /// Phrase of no fields, the identity of [`append`](Self::append)
    #[must_use]
    pub fn zero() -> Phrase {
        Phrase(Vec::new())
    }

    /// Phrase of a single field
    #[must_use]
    pub fn one(field: AttrField) -> Phrase {
        Phrase(vec![field])
    }

    /// Phrase of a single field made of the given characters
    #[must_use]
    pub fn from_chars(chars: Vec<AttrChar>, quoted: bool) -> Phrase {
        Phrase::one(AttrField { chars, quoted })
    }

    /// Concatenates another phrase onto this one.
    pub fn append(&mut self, other: Phrase) {
        let mut fields = other.0.into_iter();
        let Some(first) = fields.next() else {
            return;
        };
        match self.0.last_mut() {
            None => self.0.push(first),
            Some(last) => {
                last.chars.extend(first.chars);
                last.quoted |= first.quoted;
            }
        }
        self.0.extend(fields);
    }
}

#[cfg(test)]
mod tests {
    use super::super::attr::literal_chars;
    use super::*;

    fn field(s: &str) -> AttrField {
        AttrField {
            chars: literal_chars(s, false),
            quoted: false,
        }
    }

    #[test]
    fn zero_is_identity() {
        let mut phrase = Phrase::one(field("a"));
        phrase.append(Phrase::zero());
        assert_eq!(phrase.0.len(), 1);
        assert_eq!(phrase.0[0].to_string_value(), "a");

        let mut phrase = Phrase::zero();
        phrase.append(Phrase::one(field("b")));
        assert_eq!(phrase.0[0].to_string_value(), "b");

        let mut phrase = Phrase::zero();
        phrase.append(Phrase::zero());
        assert_eq!(phrase, Phrase::zero());
    }

    #[test]
    fn append_glues_adjacent_fields() {
        // a + (x, y) + b = (ax, yb)
        let mut phrase = Phrase::one(field("a"));
        phrase.append(Phrase(vec![field("x"), field("y")]));
        phrase.append(Phrase::one(field("b")));
        assert_eq!(phrase.0.len(), 2);
        assert_eq!(phrase.0[0].to_string_value(), "ax");
        assert_eq!(phrase.0[1].to_string_value(), "yb");
    }

    #[test]
    fn quoted_flag_propagates_on_glue() {
        let mut phrase = Phrase::one(field("a"));
        phrase.append(Phrase::one(AttrField {
            chars: vec![],
            quoted: true,
        }));
        assert!(phrase.0[0].quoted);
    }
}
