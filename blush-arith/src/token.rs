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

//! Tokenization of arithmetic expressions

use std::ops::Range;
use thiserror::Error;

/// Operator token
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operator {
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `?`
    Question,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `||`
    BarBar,
    /// `&&`
    AndAnd,
    /// `|`
    Bar,
    /// `^`
    Caret,
    /// `&`
    And,
    /// `==`
    EqualEqual,
    /// `!=`
    BangEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `<<`
    LessLess,
    /// `>>`
    GreaterGreater,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Asterisk,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `**`
    AsteriskAsterisk,
    /// `!`
    Bang,
    /// `~`
    Tilde,
    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,
    /// `=`
    Equal,
    /// `+=`
    PlusEqual,
    /// `-=`
    MinusEqual,
    /// `*=`
    AsteriskEqual,
    /// `/=`
    SlashEqual,
    /// `%=`
    PercentEqual,
    /// `<<=`
    LessLessEqual,
    /// `>>=`
    GreaterGreaterEqual,
    /// `&=`
    AndEqual,
    /// `^=`
    CaretEqual,
    /// `|=`
    BarEqual,
}

/// Content of a token
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TokenValue<'a> {
    /// Integer constant
    Number(i64),
    /// Variable name
    Variable(&'a str),
    /// Operator
    Operator(Operator),
}

/// Token with its position in the source expression
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token<'a> {
    pub value: TokenValue<'a>,
    pub location: Range<usize>,
}

/// Error in tokenization
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
pub enum TokenError {
    /// Character that cannot appear in an arithmetic expression
    #[error("invalid character in arithmetic expression")]
    InvalidCharacter,
    /// Malformed number constant
    #[error("invalid number")]
    InvalidNumber,
}

/// Iterator of tokens over an expression string
#[derive(Clone, Debug)]
pub struct Tokens<'a> {
    source: &'a str,
    index: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(source: &'a str) -> Self {
        Tokens { source, index: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.index..]
    }

    fn skip_blanks(&mut self) {
        let trimmed = self.rest().trim_start();
        self.index = self.source.len() - trimmed.len();
    }

    fn operator(&mut self) -> Option<Operator> {
        use Operator::*;
        // Longest match first
        const OPERATORS: &[(&str, Operator)] = &[
            ("<<=", LessLessEqual),
            (">>=", GreaterGreaterEqual),
            ("**", AsteriskAsterisk),
            ("++", PlusPlus),
            ("--", MinusMinus),
            ("<<", LessLess),
            (">>", GreaterGreater),
            ("<=", LessEqual),
            (">=", GreaterEqual),
            ("==", EqualEqual),
            ("!=", BangEqual),
            ("&&", AndAnd),
            ("||", BarBar),
            ("+=", PlusEqual),
            ("-=", MinusEqual),
            ("*=", AsteriskEqual),
            ("/=", SlashEqual),
            ("%=", PercentEqual),
            ("&=", AndEqual),
            ("^=", CaretEqual),
            ("|=", BarEqual),
            ("(", OpenParen),
            (")", CloseParen),
            ("?", Question),
            (":", Colon),
            (",", Comma),
            ("|", Bar),
            ("^", Caret),
            ("&", And),
            ("<", Less),
            (">", Greater),
            ("+", Plus),
            ("-", Minus),
            ("*", Asterisk),
            ("/", Slash),
            ("%", Percent),
            ("!", Bang),
            ("~", Tilde),
            ("=", Equal),
        ];
        let rest = self.rest();
        for &(text, op) in OPERATORS {
            if rest.starts_with(text) {
                self.index += text.len();
                return Some(op);
            }
        }
        None
    }

    fn number(&mut self) -> Result<i64, TokenError> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !c.is_ascii_alphanumeric() && c != '#')
            .unwrap_or(rest.len());
        let text = &rest[..len];
        self.index += len;
        parse_number(text).ok_or(TokenError::InvalidNumber)
    }

    fn variable(&mut self) -> &'a str {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .unwrap_or(rest.len());
        self.index += len;
        &rest[..len]
    }
}

/// Parses an integer constant.
///
/// Supports decimal, `0` octal, `0x` hexadecimal, and `base#value`
/// notation with bases 2 through 36.
pub(crate) fn parse_number(text: &str) -> Option<i64> {
    if let Some((base, digits)) = text.split_once('#') {
        let base: u32 = base.parse().ok()?;
        if !(2..=36).contains(&base) || digits.is_empty() {
            return None;
        }
        return i64::from_str_radix(digits, base).ok();
    }
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).ok();
    }
    if text.len() > 1 && text.starts_with('0') {
        return i64::from_str_radix(&text[1..], 8).ok();
    }
    text.parse().ok()
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token<'a>, (TokenError, Range<usize>)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_blanks();
        let start = self.index;
        let first = self.rest().chars().next()?;

        let value = if first.is_ascii_digit() {
            match self.number() {
                Ok(number) => TokenValue::Number(number),
                Err(error) => return Some(Err((error, start..self.index))),
            }
        } else if first.is_ascii_alphabetic() || first == '_' {
            TokenValue::Variable(self.variable())
        } else {
            match self.operator() {
                Some(operator) => TokenValue::Operator(operator),
                None => {
                    self.index += first.len_utf8();
                    return Some(Err((TokenError::InvalidCharacter, start..self.index)));
                }
            }
        };
        Some(Ok(Token {
            value,
            location: start..self.index,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &str) -> Vec<TokenValue> {
        Tokens::new(s).map(|t| t.unwrap().value).collect()
    }

    #[test]
    fn numbers() {
        assert_eq!(tokens("42"), [TokenValue::Number(42)]);
        assert_eq!(tokens("0x1F"), [TokenValue::Number(31)]);
        assert_eq!(tokens("010"), [TokenValue::Number(8)]);
        assert_eq!(tokens("2#101"), [TokenValue::Number(5)]);
        assert_eq!(tokens("16#ff"), [TokenValue::Number(255)]);
        assert_eq!(tokens("0"), [TokenValue::Number(0)]);
    }

    #[test]
    fn invalid_numbers() {
        let result: Vec<_> = Tokens::new("08").collect();
        assert_eq!(result[0], Err((TokenError::InvalidNumber, 0..2)));
        let result: Vec<_> = Tokens::new("2#2").collect();
        assert_eq!(result[0], Err((TokenError::InvalidNumber, 0..3)));
    }

    #[test]
    fn variables_and_operators() {
        use Operator::*;
        assert_eq!(
            tokens("x + _y2"),
            [
                TokenValue::Variable("x"),
                TokenValue::Operator(Plus),
                TokenValue::Variable("_y2"),
            ]
        );
    }

    #[test]
    fn longest_match() {
        use Operator::*;
        assert_eq!(
            tokens("a<<=b"),
            [
                TokenValue::Variable("a"),
                TokenValue::Operator(LessLessEqual),
                TokenValue::Variable("b"),
            ]
        );
        assert_eq!(
            tokens("1**2"),
            [
                TokenValue::Number(1),
                TokenValue::Operator(AsteriskAsterisk),
                TokenValue::Number(2),
            ]
        );
    }

    #[test]
    fn locations() {
        let all: Vec<_> = Tokens::new(" 12 +x").map(Result::unwrap).collect();
        assert_eq!(all[0].location, 1..3);
        assert_eq!(all[1].location, 4..5);
        assert_eq!(all[2].location, 5..6);
    }

    #[test]
    fn invalid_character() {
        let result: Vec<_> = Tokens::new("1 @ 2").collect();
        assert_eq!(result[1], Err((TokenError::InvalidCharacter, 2..3)));
    }
}
