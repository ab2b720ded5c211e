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

//! Source code identification for error reporting and provenance
//!
//! Every token and AST node carries a [`Location`]: a byte range into a
//! shared [`Code`] block, which in turn knows where its text came from.
//! Locations survive through expansion and execution so that runtime
//! diagnostics can point back at the offending part of the input.

pub mod pretty;

use std::num::NonZeroU64;
use std::ops::Range;
use std::rc::Rc;

/// Origin of a block of source code
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Source {
    /// Source of unknown provenance (dummy locations in tests)
    Unknown,
    /// Command line of an interactive session
    CommandLine,
    /// Operand of the `-c` option
    CommandString,
    /// Script file
    Script { path: String },
    /// Standard input of a non-interactive shell
    Stdin,
    /// Body of an alias
    Alias { name: String },
    /// Command string inside a command substitution
    CommandSubst,
    /// Argument to the `eval` builtin
    Eval,
    /// File read by the `source` builtin
    DotScript { path: String },
    /// Action string registered with the `trap` builtin
    Trap { condition: String },
}

impl Source {
    /// Short name of the source, used as the file label in diagnostics.
    #[must_use]
    pub fn label(&self) -> &str {
        use Source::*;
        match self {
            Unknown => "<unknown>",
            CommandLine => "<command line>",
            CommandString => "<command string>",
            Script { path } | DotScript { path } => path,
            Stdin => "<stdin>",
            Alias { .. } => "<alias>",
            CommandSubst => "<command substitution>",
            Eval => "<eval>",
            Trap { .. } => "<trap>",
        }
    }
}

/// Block of source code
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Code {
    /// Text of the block
    pub value: String,
    /// Line number the block starts at in its source (1-based)
    pub start_line_number: NonZeroU64,
    /// Where the text came from
    pub source: Rc<Source>,
}

impl Code {
    /// Creates a code block starting at line 1.
    #[must_use]
    pub fn new(value: impl Into<String>, source: Source) -> Rc<Code> {
        Rc::new(Code {
            value: value.into(),
            start_line_number: NonZeroU64::new(1).unwrap(),
            source: Rc::new(source),
        })
    }
}

/// Position of a syntactic element: a byte range in a code block
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Location {
    /// Code block containing the element
    pub code: Rc<Code>,
    /// Byte range of the element in `code.value`
    pub range: Range<usize>,
}

impl Location {
    /// Creates a dummy location whose code is the given string.
    ///
    /// Useful in tests and for values that do not come from real input.
    #[must_use]
    pub fn dummy(value: impl Into<String>) -> Location {
        let value = value.into();
        let range = 0..value.len();
        Location {
            code: Code::new(value, Source::Unknown),
            range,
        }
    }

    /// Returns a location for the given range of the same code block.
    #[must_use]
    pub fn with_range(&self, range: Range<usize>) -> Location {
        Location {
            code: Rc::clone(&self.code),
            range,
        }
    }

    /// Computes the 1-based line and column of the start of this location.
    #[must_use]
    pub fn line_column(&self) -> (u64, u64) {
        let index = self.range.start.min(self.code.value.len());
        let before = &self.code.value[..index];
        let line = self.code.start_line_number.get() + before.matches('\n').count() as u64;
        let column = match before.rfind('\n') {
            Some(newline) => before[newline + 1..].chars().count() as u64 + 1,
            None => before.chars().count() as u64 + 1,
        };
        (line, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dummy_location_spans_whole_value() {
        let location = Location::dummy("echo");
        assert_eq!(location.range, 0..4);
        assert_eq!(*location.code.source, Source::Unknown);
    }

    #[test]
    fn line_column_on_first_line() {
        let location = Location::dummy("echo foo").with_range(5..8);
        assert_eq!(location.line_column(), (1, 6));
    }

    #[test]
    fn line_column_after_newlines() {
        let location = Location::dummy("a\nbb\nccc").with_range(5..6);
        assert_eq!(location.line_column(), (3, 1));
    }

    #[test]
    fn source_labels() {
        assert_eq!(Source::Stdin.label(), "<stdin>");
        let script = Source::Script {
            path: "x.sh".to_owned(),
        };
        assert_eq!(script.label(), "x.sh");
    }
}
