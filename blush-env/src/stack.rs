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

//! Runtime execution stack
//!
//! The executor pushes a [`Frame`] when it enters a syntactic construct
//! that affects the meaning of other constructs: loops (for
//! `break`/`continue` validation), function bodies and dot scripts (for
//! `return`), conditions (for `errexit` suppression), traps, and
//! subshells. Builtins inspect the stack to validate their use.

/// Element of the runtime stack
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Frame {
    /// A loop body is being executed.
    Loop,
    /// A function body is being executed.
    FunctionBody,
    /// A condition is being evaluated (`if`/`while`/`until` conditions,
    /// non-final `&&`/`||` operands, `!`-negated pipelines).
    Condition,
    /// A trap action is being executed.
    Trap,
    /// A file sourced with the `.`/`source` builtin is being executed.
    DotScript,
    /// A subshell is being executed.
    Subshell,
}

/// Stack of execution frames
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stack(Vec<Frame>);

impl Stack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Stack {
        Default::default()
    }

    /// Pushes a frame. Callers must pair this with [`pop`](Self::pop) on
    /// every exit path; `Env::push_frame` returns a guard that does so.
    pub fn push(&mut self, frame: Frame) {
        self.0.push(frame);
    }

    /// Pops the topmost frame.
    pub fn pop(&mut self) {
        self.0.pop();
    }

    /// Returns true if any frame matches.
    #[must_use]
    pub fn contains(&self, frame: &Frame) -> bool {
        self.0.contains(frame)
    }

    /// Counts the loops entered since the innermost function boundary.
    ///
    /// This is the number of loops `break` and `continue` can address.
    #[must_use]
    pub fn loop_count(&self) -> usize {
        self.0
            .iter()
            .rev()
            .take_while(|frame| !matches!(frame, Frame::FunctionBody | Frame::Subshell))
            .filter(|frame| matches!(frame, Frame::Loop))
            .count()
    }

    /// Returns true inside a function body or a sourced script, where
    /// `return` is valid.
    #[must_use]
    pub fn can_return(&self) -> bool {
        self.0
            .iter()
            .rev()
            .take_while(|frame| !matches!(frame, Frame::Subshell))
            .any(|frame| matches!(frame, Frame::FunctionBody | Frame::DotScript))
    }

    /// Returns true while evaluating a condition, where `errexit` and the
    /// ERR trap are suppressed.
    #[must_use]
    pub fn in_condition(&self) -> bool {
        self.0.contains(&Frame::Condition)
    }

    /// Returns true while executing a trap action.
    #[must_use]
    pub fn in_trap(&self) -> bool {
        self.0
            .iter()
            .rev()
            .take_while(|frame| !matches!(frame, Frame::Subshell))
            .any(|frame| matches!(frame, Frame::Trap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_count_stops_at_function_boundary() {
        let mut stack = Stack::new();
        stack.push(Frame::Loop);
        stack.push(Frame::FunctionBody);
        stack.push(Frame::Loop);
        stack.push(Frame::Loop);
        assert_eq!(stack.loop_count(), 2);
        stack.pop();
        stack.pop();
        assert_eq!(stack.loop_count(), 0);
        stack.pop();
        assert_eq!(stack.loop_count(), 1);
    }

    #[test]
    fn can_return_inside_function_or_dot_script() {
        let mut stack = Stack::new();
        assert!(!stack.can_return());
        stack.push(Frame::FunctionBody);
        assert!(stack.can_return());
        stack.push(Frame::Subshell);
        assert!(!stack.can_return());
        stack.pop();
        stack.pop();
        stack.push(Frame::DotScript);
        assert!(stack.can_return());
    }

    #[test]
    fn condition_detection() {
        let mut stack = Stack::new();
        stack.push(Frame::Condition);
        assert!(stack.in_condition());
        stack.pop();
        assert!(!stack.in_condition());
    }
}
