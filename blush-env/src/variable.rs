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

//! Shell variables, attributes, and scope contexts
//!
//! All variables of all scopes live in one hash map; each entry is a
//! stack of definitions tagged with the index of the context they belong
//! to. Function invocation pushes a regular context (which also carries
//! the positional parameters); `local` defines variables in the topmost
//! regular context; temporary per-command assignments go to a volatile
//! context stacked on top.

use crate::semantics::Field;
use enumset::{EnumSet, EnumSetType};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::ffi::CString;
use thiserror::Error;

/// Value of a variable
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    /// Single string
    Scalar(String),
    /// Indexed array
    ///
    /// Sparse arrays are not modeled; indices are dense from zero.
    Array(Vec<String>),
    /// Associative array, ordered by key for reproducible listings
    Assoc(BTreeMap<String, String>),
}

pub use Value::*;

impl Value {
    /// Returns the scalar rendition of the value: a scalar itself, or the
    /// first element of an array, which is what `$arr` expands to.
    #[must_use]
    pub fn as_scalar(&self) -> Option<Cow<'_, str>> {
        match self {
            Scalar(value) => Some(Cow::Borrowed(value)),
            Array(values) => values.first().map(|s| Cow::Borrowed(s.as_str())),
            Assoc(map) => map.get("0").map(|s| Cow::Borrowed(s.as_str())),
        }
    }

    /// Number of elements (1 for a scalar).
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Scalar(_) => 1,
            Array(values) => values.len(),
            Assoc(map) => map.len(),
        }
    }

    /// Returns true for an empty array.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Attribute of a variable
#[derive(Debug, EnumSetType)]
pub enum Attr {
    /// Copied into the environment of executed programs (`export`)
    Export,
    /// Cannot be assigned or unset (`readonly`)
    ReadOnly,
    /// Values are evaluated as arithmetic on assignment (`declare -i`)
    Integer,
    /// Values are lowercased on assignment (`declare -l`)
    Lower,
    /// Values are uppercased on assignment (`declare -u`)
    Upper,
}

/// Variable definition
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Variable {
    /// Value, or `None` for a variable declared without a value
    pub value: Option<Value>,
    /// Attribute set
    pub attrs: EnumSet<Attr>,
}

impl Variable {
    /// Creates a scalar variable with no attributes.
    #[must_use]
    pub fn scalar<S: Into<String>>(value: S) -> Variable {
        Variable {
            value: Some(Scalar(value.into())),
            attrs: EnumSet::empty(),
        }
    }

    /// Creates an exported scalar variable.
    #[must_use]
    pub fn exported<S: Into<String>>(value: S) -> Variable {
        Variable {
            value: Some(Scalar(value.into())),
            attrs: Attr::Export.into(),
        }
    }

    /// Returns true if the variable is read-only.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.attrs.contains(Attr::ReadOnly)
    }

    /// Applies the case-conversion attributes to a value being assigned.
    #[must_use]
    pub fn apply_case_attrs(&self, value: String) -> String {
        if self.attrs.contains(Attr::Upper) {
            value.to_uppercase()
        } else if self.attrs.contains(Attr::Lower) {
            value.to_lowercase()
        } else {
            value
        }
    }
}

/// Positional parameters (`$1` and friends)
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PositionalParams {
    /// Values, where index 0 holds `$1`
    pub values: Vec<String>,
}

impl PositionalParams {
    /// Creates positional parameters from expanded fields.
    #[must_use]
    pub fn from_fields<I: IntoIterator<Item = Field>>(fields: I) -> Self {
        PositionalParams {
            values: fields.into_iter().map(|field| field.value).collect(),
        }
    }
}

/// Context of variable definitions
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Context {
    /// Context for normal assignments
    ///
    /// The base context and every function invocation are regular
    /// contexts; each carries its own positional parameters.
    Regular { positional_params: PositionalParams },
    /// Context for temporary per-command assignments (`VAR=x cmd`)
    Volatile,
}

impl Default for Context {
    fn default() -> Self {
        Context::Regular {
            positional_params: PositionalParams::default(),
        }
    }
}

/// Scope selector for variable definition
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scope {
    /// The base context
    Global,
    /// The topmost regular context (`local`)
    Local,
    /// A volatile context above the topmost regular context
    Volatile,
}

/// Error assigning to a read-only variable
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("cannot assign to read-only variable `{name}`")]
pub struct AssignError {
    pub name: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct VariableInContext {
    variable: Variable,
    context_index: usize,
}

/// Collection of all variables in all contexts
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VariableSet {
    all_variables: HashMap<String, Vec<VariableInContext>>,
    contexts: Vec<Context>,
}

impl Default for VariableSet {
    fn default() -> Self {
        VariableSet {
            all_variables: HashMap::new(),
            contexts: vec![Context::default()],
        }
    }
}

impl VariableSet {
    /// Creates an empty variable set with the base context.
    #[must_use]
    pub fn new() -> VariableSet {
        Default::default()
    }

    /// Returns the visible variable with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Variable> {
        Some(&self.all_variables.get(name)?.last()?.variable)
    }

    /// Returns the scalar rendition of the visible variable's value.
    #[must_use]
    pub fn get_scalar(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name)?.value.as_ref()?.as_scalar()
    }

    fn index_of_topmost_regular_context(&self) -> usize {
        self.contexts
            .iter()
            .rposition(|context| matches!(context, Context::Regular { .. }))
            .expect("base context has gone")
    }

    fn context_index(&self, scope: Scope) -> usize {
        match scope {
            Scope::Global => 0,
            Scope::Local => self.index_of_topmost_regular_context(),
            Scope::Volatile => self.contexts.len() - 1,
        }
    }

    /// Returns a mutable reference to the variable defined in the given
    /// scope, creating it if missing.
    pub fn get_or_new(&mut self, name: &str, scope: Scope) -> &mut Variable {
        let context_index = self.context_index(scope);
        let stack = self.all_variables.entry(name.to_owned()).or_default();
        let position = stack
            .iter()
            .rposition(|vic| vic.context_index <= context_index);
        match position {
            Some(index) if stack[index].context_index == context_index => {
                &mut stack[index].variable
            }
            Some(index) => {
                stack.insert(
                    index + 1,
                    VariableInContext {
                        variable: Variable::default(),
                        context_index,
                    },
                );
                &mut stack[index + 1].variable
            }
            None => {
                stack.insert(
                    0,
                    VariableInContext {
                        variable: Variable::default(),
                        context_index,
                    },
                );
                &mut stack[0].variable
            }
        }
    }

    /// Assigns a value, writing to the topmost context that already
    /// defines the name, or to the global context otherwise.
    ///
    /// This is the semantics of a plain `name=value` assignment. The old
    /// value is returned.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<Option<Value>, AssignError> {
        let variable = match self.all_variables.get_mut(name).and_then(|s| s.last_mut()) {
            Some(vic) => &mut vic.variable,
            None => self.get_or_new(name, Scope::Global),
        };
        if variable.is_read_only() {
            return Err(AssignError {
                name: name.to_owned(),
            });
        }
        let value = match value {
            Scalar(s) => Scalar(variable.apply_case_attrs(s)),
            other => other,
        };
        Ok(variable.value.replace(value))
    }

    /// Assigns a value into the given scope.
    pub fn assign_scoped(
        &mut self,
        name: &str,
        value: Value,
        scope: Scope,
    ) -> Result<Option<Value>, AssignError> {
        let variable = self.get_or_new(name, scope);
        if variable.is_read_only() {
            return Err(AssignError {
                name: name.to_owned(),
            });
        }
        let value = match value {
            Scalar(s) => Scalar(variable.apply_case_attrs(s)),
            other => other,
        };
        Ok(variable.value.replace(value))
    }

    /// Removes the visible definition of the variable.
    ///
    /// Only the topmost definition is removed, so a local variable
    /// unveils the outer one.
    pub fn unset(&mut self, name: &str) -> Result<Option<Value>, AssignError> {
        let Some(stack) = self.all_variables.get_mut(name) else {
            return Ok(None);
        };
        if let Some(vic) = stack.last() {
            if vic.variable.is_read_only() {
                return Err(AssignError {
                    name: name.to_owned(),
                });
            }
        }
        let removed = stack.pop().map(|vic| vic.variable.value).flatten();
        if stack.is_empty() {
            self.all_variables.remove(name);
        }
        Ok(removed)
    }

    /// Iterates over the visible variables, sorted by name.
    pub fn iter_visible(&self) -> impl Iterator<Item = (&str, &Variable)> {
        let mut entries: Vec<_> = self
            .all_variables
            .iter()
            .filter_map(|(name, stack)| Some((name.as_str(), &stack.last()?.variable)))
            .collect();
        entries.sort_unstable_by_key(|&(name, _)| name);
        entries.into_iter()
    }

    /// Builds the environment array for an executed program from the
    /// exported variables.
    #[must_use]
    pub fn environ(&self) -> Vec<CString> {
        let mut result = Vec::new();
        for (name, variable) in self.iter_visible() {
            if !variable.attrs.contains(Attr::Export) {
                continue;
            }
            let Some(value) = variable.value.as_ref().and_then(Value::as_scalar) else {
                continue;
            };
            if let Ok(entry) = CString::new(format!("{name}={value}")) {
                result.push(entry);
            }
        }
        result
    }

    /// Pushes a variable context.
    pub fn push_context(&mut self, context: Context) {
        self.contexts.push(context);
    }

    /// Pops the topmost variable context, dropping its variables.
    ///
    /// # Panics
    ///
    /// Panics when trying to pop the base context.
    pub fn pop_context(&mut self) {
        assert!(self.contexts.len() > 1, "cannot pop the base context");
        let index = self.contexts.len() - 1;
        self.contexts.pop();
        self.all_variables.retain(|_, stack| {
            while stack.last().is_some_and(|vic| vic.context_index >= index) {
                stack.pop();
            }
            !stack.is_empty()
        });
    }

    /// Returns the number of contexts, including the base context.
    #[must_use]
    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    /// Returns the positional parameters of the topmost regular context.
    #[must_use]
    pub fn positional_params(&self) -> &PositionalParams {
        let index = self.index_of_topmost_regular_context();
        match &self.contexts[index] {
            Context::Regular { positional_params } => positional_params,
            Context::Volatile => unreachable!(),
        }
    }

    /// Returns the mutable positional parameters of the topmost regular
    /// context.
    pub fn positional_params_mut(&mut self) -> &mut PositionalParams {
        let index = self.index_of_topmost_regular_context();
        match &mut self.contexts[index] {
            Context::Regular { positional_params } => positional_params,
            Context::Volatile => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_and_get() {
        let mut set = VariableSet::new();
        set.assign("x", Scalar("1".into())).unwrap();
        assert_eq!(set.get_scalar("x").unwrap(), "1");
        assert_eq!(set.get("y"), None);
    }

    #[test]
    fn local_shadows_global() {
        let mut set = VariableSet::new();
        set.assign("x", Scalar("outer".into())).unwrap();
        set.push_context(Context::default());
        set.assign_scoped("x", Scalar("inner".into()), Scope::Local)
            .unwrap();
        assert_eq!(set.get_scalar("x").unwrap(), "inner");
        set.pop_context();
        assert_eq!(set.get_scalar("x").unwrap(), "outer");
    }

    #[test]
    fn plain_assignment_writes_through_to_declaring_context() {
        let mut set = VariableSet::new();
        set.assign("x", Scalar("outer".into())).unwrap();
        set.push_context(Context::default());
        // No local declaration: assignment updates the global
        set.assign("x", Scalar("updated".into())).unwrap();
        set.pop_context();
        assert_eq!(set.get_scalar("x").unwrap(), "updated");
    }

    #[test]
    fn assignment_without_declaration_goes_to_global() {
        let mut set = VariableSet::new();
        set.push_context(Context::default());
        set.assign("fresh", Scalar("v".into())).unwrap();
        set.pop_context();
        assert_eq!(set.get_scalar("fresh").unwrap(), "v");
    }

    #[test]
    fn read_only_rejects_assignment_and_unset() {
        let mut set = VariableSet::new();
        set.assign("x", Scalar("1".into())).unwrap();
        set.get_or_new("x", Scope::Global).attrs |= Attr::ReadOnly;
        assert!(set.assign("x", Scalar("2".into())).is_err());
        assert!(set.unset("x").is_err());
        assert_eq!(set.get_scalar("x").unwrap(), "1");
    }

    #[test]
    fn unset_removes_topmost_definition() {
        let mut set = VariableSet::new();
        set.assign("x", Scalar("outer".into())).unwrap();
        set.push_context(Context::default());
        set.assign_scoped("x", Scalar("inner".into()), Scope::Local)
            .unwrap();
        set.unset("x").unwrap();
        assert_eq!(set.get_scalar("x").unwrap(), "outer");
    }

    #[test]
    fn volatile_context_is_dropped_with_its_variables() {
        let mut set = VariableSet::new();
        set.push_context(Context::Volatile);
        set.assign_scoped("t", Scalar("tmp".into()), Scope::Volatile)
            .unwrap();
        assert_eq!(set.get_scalar("t").unwrap(), "tmp");
        set.pop_context();
        assert_eq!(set.get("t"), None);
    }

    #[test]
    fn environ_contains_exported_scalars_only() {
        let mut set = VariableSet::new();
        set.assign("a", Scalar("1".into())).unwrap();
        set.get_or_new("a", Scope::Global).attrs |= Attr::Export;
        set.assign("b", Scalar("2".into())).unwrap();
        let environ = set.environ();
        assert_eq!(environ, [CString::new("a=1").unwrap()]);
    }

    #[test]
    fn case_attributes_apply_on_assignment() {
        let mut set = VariableSet::new();
        set.get_or_new("u", Scope::Global).attrs |= Attr::Upper;
        set.assign("u", Scalar("mixed Case".into())).unwrap();
        assert_eq!(set.get_scalar("u").unwrap(), "MIXED CASE");
    }

    #[test]
    fn array_value_scalar_view() {
        let value = Array(vec!["first".into(), "second".into()]);
        assert_eq!(value.as_scalar().unwrap(), "first");
        assert_eq!(value.len(), 2);
    }

    #[test]
    fn positional_params_per_context() {
        let mut set = VariableSet::new();
        set.positional_params_mut().values = vec!["a".into()];
        set.push_context(Context::Regular {
            positional_params: PositionalParams {
                values: vec!["b".into(), "c".into()],
            },
        });
        assert_eq!(set.positional_params().values, ["b", "c"]);
        set.pop_context();
        assert_eq!(set.positional_params().values, ["a"]);
    }
}
