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

//! Parser for the blush shell language.
//!
//! This crate defines the shell language syntax tree ([`syntax`]), the
//! lexer and recursive-descent parser that build it ([`parser`]), source
//! location tracking for diagnostics ([`source`]), and alias definitions
//! ([`alias`]), which are substituted during parsing.
//!
//! Parsing a script:
//!
//! ```
//! use blush_syntax::alias::AliasSet;
//! use blush_syntax::parser::lex::Lexer;
//! use blush_syntax::parser::parse_program;
//! use blush_syntax::source::Source;
//!
//! let mut lexer = Lexer::with_source("echo hello | cat", Source::Unknown);
//! let list = parse_program(&mut lexer, &AliasSet::new()).unwrap();
//! assert_eq!(list.to_string(), "echo hello | cat");
//! ```

pub mod alias;
pub mod parser;
pub mod source;
pub mod syntax;

#[cfg(test)]
mod tests {
    use crate::alias::AliasSet;
    use crate::parser::lex::Lexer;
    use crate::parser::parse_program;
    use crate::source::Source;

    /// Parsing and re-displaying common constructs is lossless for
    /// single-line source.
    #[test]
    fn display_round_trip() {
        for input in [
            "echo hello",
            "a=1 b=2 cmd arg",
            "a | b | c",
            "! a && b || c",
            "a; b& c",
            "if a; then b; else c; fi",
            "while read x; do echo $x; done",
            "for x in 1 2 3; do echo $x; done",
            "(a; b)",
            "{ a; b; }",
            "[[ -f x && a == b ]]",
            "echo ${x:-default} ${#y} ${z//a/b}",
            "echo \"quoted $x\" 'literal'",
            "cmd >out 2>&1 <in",
        ] {
            let mut lexer = Lexer::with_source(input, Source::Unknown);
            let list = parse_program(&mut lexer, &AliasSet::new())
                .unwrap_or_else(|e| panic!("{input:?}: {e}"));
            assert_eq!(list.to_string(), input);
        }
    }

    /// Byte positions in errors point into the original input.
    #[test]
    fn error_positions_are_byte_offsets() {
        let input = "echo 'abc";
        let mut lexer = Lexer::with_source(input, Source::Unknown);
        let error = parse_program(&mut lexer, &AliasSet::new()).unwrap_err();
        assert_eq!(error.location.range, 5..6);
        assert_eq!(error.location.line_column(), (1, 6));
    }
}
