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

//! Conversion from the pattern AST to a regular expression

use crate::ast::{Ast, Atom, Bracket, BracketAtom, BracketItem, GroupKind};
use crate::Config;
use crate::Error;
use regex_syntax::ast::ClassAsciiKind;
use std::fmt::Write;

/// Renders the AST as a regex fragment.
///
/// Returns the fragment and whether the overall match result must be
/// inverted, which happens when the whole pattern is a single `!(…)`
/// group.
pub fn to_regex(ast: &Ast, config: &Config) -> Result<(String, bool), Error> {
    if let [Atom::Group(GroupKind::Negate, alternatives)] = &ast.atoms[..] {
        let mut regex = String::new();
        fmt_alternatives(alternatives, &mut regex, false)?;
        return Ok((regex, true));
    }

    let mut regex = String::new();
    for (index, atom) in ast.atoms.iter().enumerate() {
        let protect_period = config.literal_period && index == 0;
        fmt_atom(atom, &mut regex, protect_period)?;
    }
    Ok((regex, false))
}

fn fmt_atom(atom: &Atom, regex: &mut String, protect_period: bool) -> Result<(), Error> {
    match atom {
        Atom::Char(c) => fmt_literal_char(*c, regex),
        Atom::AnyChar => {
            if protect_period {
                regex.push_str("[^.]");
            } else {
                // `?` must not match nothing, unlike `.` it must also
                // match a newline
                regex.push_str("(?s:.)");
            }
        }
        Atom::AnyString => {
            if protect_period {
                regex.push_str("(?:[^.](?s:.)*)?");
            } else {
                regex.push_str("(?s:.)*");
            }
        }
        Atom::Bracket(bracket) => fmt_bracket(bracket, regex, protect_period),
        Atom::Group(GroupKind::Negate, _) => return Err(Error::EmbeddedNegation),
        Atom::Group(kind, alternatives) => {
            fmt_alternatives(alternatives, regex, true)?;
            match kind {
                GroupKind::ZeroOrOne => regex.push('?'),
                GroupKind::ZeroOrMore => regex.push('*'),
                GroupKind::OneOrMore => regex.push('+'),
                GroupKind::One | GroupKind::Negate => {}
            }
        }
    }
    Ok(())
}

fn fmt_alternatives(
    alternatives: &[Ast],
    regex: &mut String,
    grouped: bool,
) -> Result<(), Error> {
    if grouped {
        regex.push_str("(?:");
    }
    for (index, alternative) in alternatives.iter().enumerate() {
        if index > 0 {
            regex.push('|');
        }
        let (fragment, negate) = to_regex(alternative, &Config::default())?;
        if negate {
            return Err(Error::EmbeddedNegation);
        }
        regex.push_str(&fragment);
    }
    if grouped {
        regex.push(')');
    }
    Ok(())
}

fn fmt_literal_char(c: char, regex: &mut String) {
    if regex_syntax::is_meta_character(c) {
        regex.push('\\');
    }
    regex.push(c);
}

fn fmt_bracket(bracket: &Bracket, regex: &mut String, protect_period: bool) {
    let exclude_period = protect_period && !bracket.complement;
    if exclude_period {
        regex.push_str("[[");
    } else {
        regex.push('[');
    }
    if bracket.complement {
        regex.push('^');
    }
    for item in &bracket.items {
        match item {
            BracketItem::Atom(atom) => fmt_bracket_atom(atom, regex),
            BracketItem::Range(range) => {
                fmt_class_char(*range.start(), regex);
                regex.push('-');
                fmt_class_char(*range.end(), regex);
            }
        }
    }
    if bracket.complement && protect_period {
        // A complemented set additionally excludes the leading period
        regex.push('.');
    }
    if exclude_period {
        regex.push_str("]&&[^.]]");
    } else {
        regex.push(']');
    }
}

fn fmt_bracket_atom(atom: &BracketAtom, regex: &mut String) {
    match atom {
        BracketAtom::Char(c) => fmt_class_char(*c, regex),
        BracketAtom::CharClass(kind) => {
            let _ = write!(regex, "[:{}:]", class_name(kind));
        }
    }
}

fn fmt_class_char(c: char, regex: &mut String) {
    if matches!(c, '\\' | '^' | ']' | '[' | '-' | '&' | '~') {
        regex.push('\\');
    }
    regex.push(c);
}

fn class_name(kind: &ClassAsciiKind) -> &'static str {
    use ClassAsciiKind::*;
    match kind {
        Alnum => "alnum",
        Alpha => "alpha",
        Ascii => "ascii",
        Blank => "blank",
        Cntrl => "cntrl",
        Digit => "digit",
        Graph => "graph",
        Lower => "lower",
        Print => "print",
        Punct => "punct",
        Space => "space",
        Upper => "upper",
        Word => "word",
        Xdigit => "xdigit",
    }
}
