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

//! Function definitions

use blush_syntax::source::Location;
use blush_syntax::syntax::FullCompoundCommand;
use std::collections::HashMap;
use std::rc::Rc;

/// Defined function
///
/// The body is shared: invoking the function executes the same immutable
/// tree that the definition created, even if the function is redefined
/// mid-execution.
#[derive(Clone, Debug)]
pub struct Function {
    /// Function name
    pub name: String,
    /// Function body
    pub body: Rc<FullCompoundCommand>,
    /// Location of the definition
    pub origin: Location,
}

/// Collection of functions, keyed by name
#[derive(Clone, Debug, Default)]
pub struct FunctionSet {
    functions: HashMap<String, Rc<Function>>,
}

impl FunctionSet {
    /// Creates an empty function set.
    #[must_use]
    pub fn new() -> FunctionSet {
        Default::default()
    }

    /// Returns the function with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Rc<Function>> {
        self.functions.get(name)
    }

    /// Defines or redefines a function.
    pub fn define(&mut self, function: Function) {
        self.functions
            .insert(function.name.clone(), Rc::new(function));
    }

    /// Removes a function definition.
    pub fn unset(&mut self, name: &str) -> Option<Rc<Function>> {
        self.functions.remove(name)
    }

    /// Iterates over the functions, sorted by name.
    pub fn iter_sorted(&self) -> impl Iterator<Item = &Rc<Function>> {
        let mut entries: Vec<_> = self.functions.values().collect();
        entries.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        entries.into_iter()
    }
}
