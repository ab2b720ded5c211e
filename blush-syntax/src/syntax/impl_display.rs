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

//! Implementations of `Display` for the syntax types
//!
//! The output is single-line source code; here-document contents are
//! omitted. This rendering backs `set -x` traces, `declare -f` listings,
//! and trap printing.

use super::*;
use itertools::Itertools;
use std::fmt;
use std::fmt::Display;
use std::fmt::Write as _;

impl Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.id.fmt(f)
    }
}

impl Display for SwitchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use SwitchType::*;
        f.write_char(match self {
            Alter => '+',
            Default => '-',
            Assign => '=',
            Error => '?',
        })
    }
}

impl Display for SwitchCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchCondition::Unset => Ok(()),
            SwitchCondition::UnsetOrEmpty => f.write_char(':'),
        }
    }
}

impl Display for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.condition, self.r#type, self.word)
    }
}

impl Display for Trim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operator = match self.side {
            TrimSide::Prefix => '#',
            TrimSide::Suffix => '%',
        };
        f.write_char(operator)?;
        if self.length == TrimLength::Longest {
            f.write_char(operator)?;
        }
        self.pattern.fmt(f)
    }
}

impl Display for Subst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('/')?;
        if self.global {
            f.write_char('/')?;
        }
        match self.anchor {
            None => (),
            Some(SubstAnchor::Front) => f.write_char('#')?,
            Some(SubstAnchor::Back) => f.write_char('%')?,
        }
        self.pattern.fmt(f)?;
        if let Some(replacement) = &self.replacement {
            write!(f, "/{replacement}")?;
        }
        Ok(())
    }
}

impl Display for CaseConv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operator = match self.direction {
            CaseDirection::Upper => '^',
            CaseDirection::Lower => ',',
        };
        f.write_char(operator)?;
        if self.all {
            f.write_char(operator)?;
        }
        if let Some(pattern) = &self.pattern {
            pattern.fmt(f)?;
        }
        Ok(())
    }
}

impl Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.offset)?;
        if let Some(length) = &self.length {
            write!(f, ":{length}")?;
        }
        Ok(())
    }
}

impl Display for Subscript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subscript::At => f.write_str("[@]"),
            Subscript::Star => f.write_str("[*]"),
            Subscript::Index(text) => write!(f, "[{text}]"),
        }
    }
}

impl Display for BracedParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("${")?;
        match &self.modifier {
            Modifier::Length => write!(f, "#{}", self.param)?,
            Modifier::Indirect | Modifier::Names | Modifier::Keys => {
                write!(f, "!{}", self.param)?;
            }
            _ => self.param.fmt(f)?,
        }
        if let Some(subscript) = &self.subscript {
            subscript.fmt(f)?;
        }
        if self.modifier == Modifier::Names {
            f.write_char('*')?;
        }
        match &self.modifier {
            Modifier::None | Modifier::Length | Modifier::Indirect | Modifier::Names
            | Modifier::Keys => (),
            Modifier::Switch(switch) => switch.fmt(f)?,
            Modifier::Trim(trim) => trim.fmt(f)?,
            Modifier::Subst(subst) => subst.fmt(f)?,
            Modifier::Case(conv) => conv.fmt(f)?,
            Modifier::Slice(slice) => slice.fmt(f)?,
        }
        f.write_char('}')
    }
}

impl Display for TextUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal(c) => f.write_char(*c),
            Backslashed(c) => write!(f, "\\{c}"),
            RawParam { param, .. } => write!(f, "${param}"),
            TextUnit::BracedParam(param) => param.fmt(f),
            CommandSubst { content, .. } => write!(f, "$({content})"),
            Backquote { content, .. } => {
                f.write_char('`')?;
                for unit in content {
                    unit.fmt(f)?;
                }
                f.write_char('`')
            }
            Arith { content, .. } => write!(f, "$(({content}))"),
        }
    }
}

impl Display for BackquoteUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackquoteUnit::Literal(c) => f.write_char(*c),
            BackquoteUnit::Backslashed(c) => write!(f, "\\{c}"),
        }
    }
}

impl Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|unit| unit.fmt(f))
    }
}

impl Display for EscapedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for unit in &self.0 {
            match unit {
                EscapeUnit::Literal(c) => f.write_char(*c)?,
                EscapeUnit::Escaped(c) => match c {
                    '\u{7}' => f.write_str("\\a")?,
                    '\u{8}' => f.write_str("\\b")?,
                    '\u{1B}' => f.write_str("\\e")?,
                    '\u{C}' => f.write_str("\\f")?,
                    '\n' => f.write_str("\\n")?,
                    '\r' => f.write_str("\\r")?,
                    '\t' => f.write_str("\\t")?,
                    '\u{B}' => f.write_str("\\v")?,
                    '\\' => f.write_str("\\\\")?,
                    '\'' => f.write_str("\\'")?,
                    c if c.is_control() => write!(f, "\\x{:02x}", *c as u32)?,
                    c => f.write_char(*c)?,
                },
            }
        }
        Ok(())
    }
}

impl Display for WordUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unquoted(unit) => unit.fmt(f),
            SingleQuote(s) => write!(f, "'{s}'"),
            DoubleQuote(text) => write!(f, "\"{text}\""),
            DollarSingleQuote(string) => write!(f, "$'{string}'"),
            Tilde(name) => write!(f, "~{name}"),
            ProcessSubst {
                direction, content, ..
            } => {
                let prefix = match direction {
                    SubstDirection::In => '<',
                    SubstDirection::Out => '>',
                };
                write!(f, "{prefix}({content})")
            }
        }
    }
}

impl Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.units.iter().try_for_each(|unit| unit.fmt(f))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar(word) => word.fmt(f),
            Array(words) => write!(f, "({})", words.iter().format(" ")),
        }
    }
}

impl Display for Assign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name.fmt(f)?;
        if let Some(subscript) = &self.subscript {
            write!(f, "[{subscript}]")?;
        }
        if self.append {
            f.write_char('+')?;
        }
        write!(f, "={}", self.value)
    }
}

impl Display for Fd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Display for RedirOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use RedirOp::*;
        f.write_str(match self {
            FileIn => "<",
            FileInOut => "<>",
            FileOut => ">",
            FileAppend => ">>",
            FileClobber => ">|",
            FdIn => "<&",
            FdOut => ">&",
            HereString => "<<<",
            OutErr => "&>",
            AppendOutErr => "&>>",
        })
    }
}

impl Display for Redir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(fd) = self.fd {
            fd.fmt(f)?;
        }
        match &self.body {
            RedirBody::Normal { operator, operand } => write!(f, "{operator}{operand}"),
            RedirBody::HereDoc(here_doc) => {
                let operator = if here_doc.remove_tabs { "<<-" } else { "<<" };
                write!(f, "{operator}{}", here_doc.delimiter)
            }
        }
    }
}

impl Display for SimpleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut space = |f: &mut fmt::Formatter<'_>| {
            if first {
                first = false;
                Ok(())
            } else {
                f.write_char(' ')
            }
        };
        for assign in &self.assigns {
            space(f)?;
            assign.fmt(f)?;
        }
        for word in &self.words {
            space(f)?;
            word.fmt(f)?;
        }
        for redir in self.redirs.iter() {
            space(f)?;
            redir.fmt(f)?;
        }
        Ok(())
    }
}

impl Display for CaseContinuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CaseContinuation::*;
        f.write_str(match self {
            Break => ";;",
            FallThrough => ";&",
            Continue => ";;&",
        })
    }
}

impl Display for CaseItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.patterns.iter().format(" | "))?;
        if !self.body.0.is_empty() {
            write!(f, " {}", self.body)?;
        }
        write!(f, " {}", self.continuation)
    }
}

impl Display for UnaryTestOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use UnaryTestOp::*;
        f.write_str(match self {
            NonEmpty => "-n",
            Empty => "-z",
            Exists => "-e",
            IsFile => "-f",
            IsDir => "-d",
            Readable => "-r",
            Writable => "-w",
            Executable => "-x",
            NonEmptyFile => "-s",
            Symlink => "-L",
            Terminal => "-t",
            VarSet => "-v",
        })
    }
}

impl Display for BinaryTestOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BinaryTestOp::*;
        f.write_str(match self {
            Match => "==",
            NoMatch => "!=",
            RegexMatch => "=~",
            StrLess => "<",
            StrGreater => ">",
            Eq => "-eq",
            Ne => "-ne",
            Lt => "-lt",
            Le => "-le",
            Gt => "-gt",
            Ge => "-ge",
            NewerThan => "-nt",
            OlderThan => "-ot",
            SameFile => "-ef",
        })
    }
}

impl TestExpr {
    /// Writes the expression, parenthesizing compound operands.
    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestExpr::And(..) | TestExpr::Or(..) => write!(f, "( {self} )"),
            _ => self.fmt(f),
        }
    }
}

impl Display for TestExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestExpr::Word(word) => word.fmt(f),
            TestExpr::Unary { operator, operand } => write!(f, "{operator} {operand}"),
            TestExpr::Binary { operator, lhs, rhs } => write!(f, "{lhs} {operator} {rhs}"),
            TestExpr::Not(operand) => {
                f.write_str("! ")?;
                operand.fmt_operand(f)
            }
            TestExpr::And(lhs, rhs) => {
                lhs.fmt_operand(f)?;
                f.write_str(" && ")?;
                rhs.fmt_operand(f)
            }
            TestExpr::Or(lhs, rhs) => {
                lhs.fmt_operand(f)?;
                f.write_str(" || ")?;
                rhs.fmt_operand(f)
            }
        }
    }
}

/// Writes a list followed by a closing token, eliding the separator after
/// an asynchronous final item (`{ a& }` rather than `{ a&; }`).
fn fmt_body(f: &mut fmt::Formatter<'_>, body: &List, close: &str) -> fmt::Result {
    body.fmt(f)?;
    match body.0.last() {
        Some(item) if item.async_flag.is_some() => write!(f, " {close}"),
        _ => write!(f, "; {close}"),
    }
}

impl Display for CompoundCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CompoundCommand::*;
        match self {
            Grouping(body) => {
                f.write_str("{ ")?;
                fmt_body(f, body, "}")
            }
            Subshell { body, .. } => write!(f, "({body})"),
            For { name, values, body } => {
                write!(f, "for {name}")?;
                if let Some(values) = values {
                    write!(f, " in {}", values.iter().format(" "))?;
                    f.write_char(';')?;
                }
                f.write_str(" do ")?;
                fmt_body(f, body, "done")
            }
            CFor {
                init,
                condition,
                update,
                body,
            } => {
                write!(f, "for (({init}; {condition}; {update})); do ")?;
                fmt_body(f, body, "done")
            }
            While { condition, body } => {
                write!(f, "while {condition}; do ")?;
                fmt_body(f, body, "done")
            }
            Until { condition, body } => {
                write!(f, "until {condition}; do ")?;
                fmt_body(f, body, "done")
            }
            If {
                condition,
                body,
                elifs,
                r#else,
            } => {
                write!(f, "if {condition}; then {body}; ")?;
                for elif in elifs {
                    write!(f, "elif {}; then {}; ", elif.condition, elif.body)?;
                }
                if let Some(r#else) = r#else {
                    write!(f, "else {}; ", r#else)?;
                }
                f.write_str("fi")
            }
            Case { subject, items } => {
                write!(f, "case {subject} in")?;
                for item in items {
                    write!(f, " {item}")?;
                }
                f.write_str(" esac")
            }
            Select { name, values, body } => {
                write!(f, "select {name}")?;
                if let Some(values) = values {
                    write!(f, " in {}", values.iter().format(" "))?;
                    f.write_char(';')?;
                }
                f.write_str(" do ")?;
                fmt_body(f, body, "done")
            }
            Arith { expression, .. } => write!(f, "(({expression}))"),
            Test { expression, .. } => write!(f, "[[ {expression} ]]"),
        }
    }
}

impl Display for FullCompoundCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.command.fmt(f)?;
        self.redirs
            .iter()
            .try_for_each(|redir| write!(f, " {redir}"))
    }
}

impl Display for FunctionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_keyword {
            f.write_str("function ")?;
        }
        write!(f, "{}() {}", self.name, self.body)
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Simple(command) => command.fmt(f),
            Command::Compound(command) => command.fmt(f),
            Command::Function(definition) => definition.fmt(f),
        }
    }
}

impl Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negation {
            f.write_str("! ")?;
        }
        write!(f, "{}", self.commands.iter().format(" | "))
    }
}

impl Display for AndOr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AndOr::AndThen => f.write_str("&&"),
            AndOr::OrElse => f.write_str("||"),
        }
    }
}

impl Display for AndOrList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.first.fmt(f)?;
        self.rest
            .iter()
            .try_for_each(|(connector, pipeline)| write!(f, " {connector} {pipeline}"))
    }
}

impl Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, item) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_char(' ')?;
            }
            item.and_or.fmt(f)?;
            if item.async_flag.is_some() {
                f.write_char('&')?;
            } else if index + 1 < self.0.len() {
                f.write_char(';')?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Location;

    fn word(s: &str) -> Word {
        Word {
            units: s.chars().map(|c| Unquoted(Literal(c))).collect(),
            location: Location::dummy(s),
        }
    }

    fn simple(words: &[&str]) -> Command {
        Command::Simple(SimpleCommand {
            assigns: vec![],
            words: words.iter().map(|w| word(w)).collect(),
            redirs: Rc::new(vec![]),
        })
    }

    fn item(words: &[&str]) -> Item {
        Item {
            and_or: Rc::new(AndOrList {
                first: Pipeline {
                    commands: vec![Rc::new(simple(words))],
                    negation: false,
                },
                rest: vec![],
            }),
            async_flag: None,
        }
    }

    #[test]
    fn simple_command_display() {
        assert_eq!(simple(&["echo", "foo"]).to_string(), "echo foo");
    }

    #[test]
    fn list_display() {
        let list = List(vec![item(&["a"]), item(&["b"])]);
        assert_eq!(list.to_string(), "a; b");
    }

    #[test]
    fn async_item_display() {
        let mut async_item = item(&["a"]);
        async_item.async_flag = Some(Location::dummy("&"));
        let list = List(vec![async_item, item(&["b"])]);
        assert_eq!(list.to_string(), "a& b");
    }

    #[test]
    fn pipeline_display() {
        let pipeline = Pipeline {
            commands: vec![Rc::new(simple(&["a"])), Rc::new(simple(&["b"]))],
            negation: true,
        };
        assert_eq!(pipeline.to_string(), "! a | b");
    }

    #[test]
    fn grouping_display() {
        let grouping = CompoundCommand::Grouping(List(vec![item(&["a"])]));
        assert_eq!(grouping.to_string(), "{ a; }");
    }

    #[test]
    fn if_display() {
        let command = CompoundCommand::If {
            condition: List(vec![item(&["true"])]),
            body: List(vec![item(&["a"])]),
            elifs: vec![],
            r#else: Some(List(vec![item(&["b"])])),
        };
        assert_eq!(command.to_string(), "if true; then a; else b; fi");
    }

    #[test]
    fn braced_param_display() {
        let param = BracedParam {
            param: Param::from_id("var"),
            subscript: None,
            modifier: Modifier::Switch(Switch {
                r#type: SwitchType::Default,
                condition: SwitchCondition::UnsetOrEmpty,
                word: word("default"),
            }),
            location: Location::dummy(""),
        };
        assert_eq!(param.to_string(), "${var:-default}");
    }

    #[test]
    fn subst_display() {
        let param = BracedParam {
            param: Param::from_id("s"),
            subscript: None,
            modifier: Modifier::Subst(Subst {
                pattern: word("l"),
                replacement: Some(word("L")),
                anchor: None,
                global: true,
            }),
            location: Location::dummy(""),
        };
        assert_eq!(param.to_string(), "${s//l/L}");
    }

    #[test]
    fn test_expr_display() {
        let expression = TestExpr::And(
            Box::new(TestExpr::Unary {
                operator: UnaryTestOp::IsFile,
                operand: word("x"),
            }),
            Box::new(TestExpr::Word(word("y"))),
        );
        assert_eq!(expression.to_string(), "-f x && y");
    }

    #[test]
    fn case_item_display() {
        let case = CompoundCommand::Case {
            subject: word("x"),
            items: vec![CaseItem {
                patterns: vec![word("a"), word("b")],
                body: List(vec![item(&["run"])]),
                continuation: CaseContinuation::Break,
            }],
        };
        assert_eq!(case.to_string(), "case x in (a | b) run ;; esac");
    }
}
