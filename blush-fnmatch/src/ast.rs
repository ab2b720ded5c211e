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

//! Abstract syntax tree for globbing patterns

use crate::Config;
use crate::Error;
use crate::PatternChar;
use regex_syntax::ast::ClassAsciiKind;
use std::ops::RangeInclusive;

/// Bracket expression component
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketAtom {
    /// Literal character
    Char(char),
    /// Character class (`[:digit:]`)
    CharClass(ClassAsciiKind),
}

/// Bracket expression item
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketItem {
    /// Single atom
    Atom(BracketAtom),
    /// Character range (e.g. `a-z`)
    Range(RangeInclusive<char>),
}

/// Bracket expression
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bracket {
    /// Whether the expression starts with `!` (or `^`), inverting the set
    pub complement: bool,
    /// Content of the bracket expression
    pub items: Vec<BracketItem>,
}

/// Kind of an extended-glob group
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GroupKind {
    /// `?(…)`: zero or one occurrence
    ZeroOrOne,
    /// `*(…)`: zero or more occurrences
    ZeroOrMore,
    /// `+(…)`: one or more occurrences
    OneOrMore,
    /// `@(…)`: exactly one occurrence
    One,
    /// `!(…)`: anything except the enclosed alternatives
    Negate,
}

impl GroupKind {
    fn from_prefix(c: char) -> Option<GroupKind> {
        match c {
            '?' => Some(GroupKind::ZeroOrOne),
            '*' => Some(GroupKind::ZeroOrMore),
            '+' => Some(GroupKind::OneOrMore),
            '@' => Some(GroupKind::One),
            '!' => Some(GroupKind::Negate),
            _ => None,
        }
    }
}

/// Pattern component
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Atom {
    /// Literal character
    Char(char),
    /// `?`: any single character
    AnyChar,
    /// `*`: any string, including the empty string
    AnyString,
    /// Bracket expression
    Bracket(Bracket),
    /// Extended-glob group with `|`-separated alternatives
    Group(GroupKind, Vec<Ast>),
}

/// Abstract syntax tree for a whole pattern
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Ast {
    /// Content of the pattern
    pub atoms: Vec<Atom>,
}

impl Ast {
    /// Parses a pattern.
    ///
    /// An unclosed bracket expression or group is not an error; the
    /// opening characters are taken literally, which requires the input
    /// iterator to be cloneable for backtracking.
    pub fn new<I>(pattern: I, config: &Config) -> Result<Self, Error>
    where
        I: IntoIterator<Item = PatternChar>,
        I::IntoIter: Clone,
    {
        let mut atoms = Vec::new();
        let mut i = pattern.into_iter();
        loop {
            let checkpoint = i.clone();
            match i.next() {
                None => return Ok(Ast { atoms }),
                Some(PatternChar::Literal(c)) => atoms.push(Atom::Char(c)),
                Some(PatternChar::Normal(c)) => {
                    if config.extglob {
                        if let Some(kind) = GroupKind::from_prefix(c) {
                            let mut after_prefix = i.clone();
                            if let Some(PatternChar::Normal('(')) = after_prefix.next() {
                                match parse_group(after_prefix, config)? {
                                    Some((alternatives, rest)) => {
                                        atoms.push(Atom::Group(kind, alternatives));
                                        i = rest;
                                        continue;
                                    }
                                    None => {
                                        // Unclosed group: take the prefix literally
                                        atoms.push(Atom::Char(c));
                                        continue;
                                    }
                                }
                            }
                        }
                    }
                    match c {
                        '?' => atoms.push(Atom::AnyChar),
                        '*' => {
                            // Consecutive asterisks are redundant
                            if atoms.last() != Some(&Atom::AnyString) {
                                atoms.push(Atom::AnyString);
                            }
                        }
                        '[' => match parse_bracket(i.clone()) {
                            Some((bracket, rest)) => {
                                atoms.push(Atom::Bracket(bracket));
                                i = rest;
                            }
                            None => {
                                atoms.push(Atom::Char('['));
                                i = checkpoint;
                                i.next();
                            }
                        },
                        _ => atoms.push(Atom::Char(c)),
                    }
                }
            }
        }
    }

    /// Returns the pattern as a plain string if it contains no operators.
    #[must_use]
    pub fn to_literal(&self) -> Option<String> {
        self.atoms
            .iter()
            .map(|atom| match atom {
                Atom::Char(c) => Some(*c),
                _ => None,
            })
            .collect()
    }
}

/// Parses a bracket expression after the opening `[`.
///
/// Returns the bracket and the rest of the input, or `None` if the
/// expression is not closed.
fn parse_bracket<I>(mut i: I) -> Option<(Bracket, I)>
where
    I: Iterator<Item = PatternChar> + Clone,
{
    let mut complement = false;
    let mut items = Vec::new();

    let mut next = i.next()?;
    if let PatternChar::Normal('!' | '^') = next {
        complement = true;
        next = i.next()?;
    }

    loop {
        match next {
            // `]` ends the expression unless it is the first item
            PatternChar::Normal(']') if !items.is_empty() => {
                return Some((
                    Bracket { complement, items },
                    i,
                ));
            }
            PatternChar::Normal('[') => {
                // Possible character class `[:name:]`; collating symbols
                // and equivalence classes degrade to their content
                match parse_bracket_inner(&mut i) {
                    Some(atom) => items.push(BracketItem::Atom(atom)),
                    None => items.push(BracketItem::Atom(BracketAtom::Char('['))),
                }
            }
            PatternChar::Normal(c) | PatternChar::Literal(c) => {
                // Check for a range like `a-z`
                let mut after_dash = i.clone();
                if let Some(PatternChar::Normal('-')) = after_dash.next() {
                    match after_dash.next() {
                        Some(PatternChar::Normal(']')) | None => {
                            items.push(BracketItem::Atom(BracketAtom::Char(c)));
                        }
                        Some(end) => {
                            items.push(BracketItem::Range(c..=end.char_value()));
                            i = after_dash;
                            next = i.next()?;
                            continue;
                        }
                    }
                } else {
                    items.push(BracketItem::Atom(BracketAtom::Char(c)));
                }
            }
        }
        next = i.next()?;
    }
}

/// Parses `:name:]`, `.x.]`, or `=x=]` after an inner `[`.
fn parse_bracket_inner<I>(i: &mut I) -> Option<BracketAtom>
where
    I: Iterator<Item = PatternChar> + Clone,
{
    let mut j = i.clone();
    let delimiter = match j.next()? {
        PatternChar::Normal(c @ (':' | '.' | '=')) => c,
        _ => return None,
    };
    let mut content = String::new();
    loop {
        match j.next()? {
            PatternChar::Normal(c) if c == delimiter => {
                if let Some(PatternChar::Normal(']')) = j.next() {
                    break;
                }
                return None;
            }
            c => content.push(c.char_value()),
        }
    }
    let atom = if delimiter == ':' {
        BracketAtom::CharClass(ClassAsciiKind::from_name(&content)?)
    } else {
        // Collating symbols and equivalence classes match their own text;
        // multi-character content is not supported
        let mut chars = content.chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        BracketAtom::Char(c)
    };
    *i = j;
    Some(atom)
}

/// Parses the alternatives of an extended-glob group after `X(`.
///
/// Returns `None` when the group is not closed, so that the caller can
/// fall back to a literal interpretation.
fn parse_group<I>(mut i: I, config: &Config) -> Result<Option<(Vec<Ast>, I)>, Error>
where
    I: Iterator<Item = PatternChar> + Clone,
{
    let mut alternatives = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0u32;
    loop {
        match i.next() {
            None => return Ok(None),
            Some(PatternChar::Normal(')')) if depth == 0 => {
                alternatives.push(Ast::new(current, config)?);
                return Ok(Some((alternatives, i)));
            }
            Some(PatternChar::Normal('|')) if depth == 0 => {
                alternatives.push(Ast::new(std::mem::take(&mut current), config)?);
            }
            Some(c) => {
                match c {
                    PatternChar::Normal('(') => depth += 1,
                    PatternChar::Normal(')') => depth -= 1,
                    _ => {}
                }
                current.push(c);
            }
        }
    }
}
