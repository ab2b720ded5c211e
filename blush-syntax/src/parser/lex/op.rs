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

//! Operator tokens

use std::fmt;

/// Operator token
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operator {
    /// Newline
    Newline,
    /// `&`
    And,
    /// `&&`
    AndAnd,
    /// `&>`
    AndGreater,
    /// `&>>`
    AndGreaterGreater,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `;`
    Semicolon,
    /// `;;`
    SemicolonSemicolon,
    /// `;&`
    SemicolonAnd,
    /// `;;&`
    SemicolonSemicolonAnd,
    /// `<`
    Less,
    /// `<&`
    LessAnd,
    /// `<<`
    LessLess,
    /// `<<-`
    LessLessDash,
    /// `<<<`
    LessLessLess,
    /// `<>`
    LessGreater,
    /// `>`
    Greater,
    /// `>&`
    GreaterAnd,
    /// `>>`
    GreaterGreater,
    /// `>|`
    GreaterBar,
    /// `|`
    Bar,
    /// `||`
    BarBar,
}

impl Operator {
    /// Returns the literal string form of the operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        use Operator::*;
        match self {
            Newline => "\n",
            And => "&",
            AndAnd => "&&",
            AndGreater => "&>",
            AndGreaterGreater => "&>>",
            OpenParen => "(",
            CloseParen => ")",
            Semicolon => ";",
            SemicolonSemicolon => ";;",
            SemicolonAnd => ";&",
            SemicolonSemicolonAnd => ";;&",
            Less => "<",
            LessAnd => "<&",
            LessLess => "<<",
            LessLessDash => "<<-",
            LessLessLess => "<<<",
            LessGreater => "<>",
            Greater => ">",
            GreaterAnd => ">&",
            GreaterGreater => ">>",
            GreaterBar => ">|",
            Bar => "|",
            BarBar => "||",
        }
    }

    /// Returns true for operators that terminate a simple command.
    #[must_use]
    pub const fn is_separator(self) -> bool {
        use Operator::*;
        matches!(
            self,
            Newline
                | And
                | AndAnd
                | OpenParen
                | CloseParen
                | Semicolon
                | SemicolonSemicolon
                | SemicolonAnd
                | SemicolonSemicolonAnd
                | Bar
                | BarBar
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of operators, longest first so that a scan takes the longest match
const OPERATORS: &[Operator] = {
    use Operator::*;
    &[
        SemicolonSemicolonAnd,
        AndGreaterGreater,
        LessLessDash,
        LessLessLess,
        SemicolonSemicolon,
        SemicolonAnd,
        AndAnd,
        AndGreater,
        LessAnd,
        LessLess,
        LessGreater,
        GreaterAnd,
        GreaterGreater,
        GreaterBar,
        BarBar,
        Newline,
        And,
        OpenParen,
        CloseParen,
        Semicolon,
        Less,
        Greater,
        Bar,
    ]
};

/// Returns true if the character can start an operator.
#[must_use]
pub fn is_operator_char(c: char) -> bool {
    matches!(c, '\n' | '&' | '(' | ')' | ';' | '<' | '>' | '|')
}

/// Finds the longest operator at the beginning of the input.
#[must_use]
pub fn longest_match(input: &str) -> Option<Operator> {
    OPERATORS
        .iter()
        .copied()
        .find(|operator| input.starts_with(operator.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_match_prefers_longer_operators() {
        assert_eq!(longest_match(";;& x"), Some(Operator::SemicolonSemicolonAnd));
        assert_eq!(longest_match(";; x"), Some(Operator::SemicolonSemicolon));
        assert_eq!(longest_match("; x"), Some(Operator::Semicolon));
        assert_eq!(longest_match("<<- x"), Some(Operator::LessLessDash));
        assert_eq!(longest_match("<<x"), Some(Operator::LessLess));
        assert_eq!(longest_match("&>>f"), Some(Operator::AndGreaterGreater));
        assert_eq!(longest_match("&& x"), Some(Operator::AndAnd));
        assert_eq!(longest_match("x"), None);
    }
}
