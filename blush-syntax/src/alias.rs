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

//! Alias definitions
//!
//! Aliases live in this crate rather than the environment crate because
//! the parser substitutes them while reading command words. The parser
//! guards against recursive substitution: while the tokens produced from
//! an alias body are being consumed, the same alias name is not expanded
//! again.

use crate::source::Location;
use std::borrow::Borrow;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Alias definition
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Alias {
    /// Name matched against command words
    pub name: String,
    /// Text substituted for the matched word
    pub replacement: String,
    /// Position of the defining `alias` command invocation
    pub origin: Location,
}

/// Wrapper for storing aliases in a hash set keyed by name
#[derive(Clone, Debug, Eq)]
pub struct HashEntry(pub Rc<Alias>);

impl HashEntry {
    /// Creates a new alias definition as a `HashEntry`.
    #[must_use]
    pub fn new(name: impl Into<String>, replacement: impl Into<String>, origin: Location) -> Self {
        HashEntry(Rc::new(Alias {
            name: name.into(),
            replacement: replacement.into(),
            origin,
        }))
    }
}

impl PartialEq for HashEntry {
    fn eq(&self, other: &HashEntry) -> bool {
        self.0.name == other.0.name
    }
}

impl Hash for HashEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state)
    }
}

impl Borrow<str> for HashEntry {
    fn borrow(&self) -> &str {
        &self.0.name
    }
}

/// Collection of aliases, keyed by name
pub type AliasSet = HashSet<HashEntry>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        let mut set = AliasSet::new();
        set.insert(HashEntry::new("ll", "ls -l", Location::dummy("")));
        assert_eq!(set.get("ll").unwrap().0.replacement, "ls -l");
        assert!(set.get("ls").is_none());
    }

    #[test]
    fn redefinition_replaces() {
        let mut set = AliasSet::new();
        set.insert(HashEntry::new("x", "one", Location::dummy("")));
        set.replace(HashEntry::new("x", "two", Location::dummy("")));
        assert_eq!(set.get("x").unwrap().0.replacement, "two");
    }
}
