//! Callable values: parameter declarations, bodies, and overload sets

use std::collections::BTreeMap;
use std::sync::Arc;

use super::Value;
use crate::error::{Result, RuntimeError};
use crate::runtime::Runtime;

/// Type alias for callable bodies.
///
/// A body runs inside a frame that already binds every formal parameter and
/// returns exactly one value.
pub type BuiltinFnPtr = Arc<dyn Fn(&mut Runtime) -> Result<Value> + Send + Sync>;

/// How a formal parameter is bound to its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingMode {
    /// Alias the caller's value; mutation is visible to the caller
    Reference,
    /// Bind an independent duplicate of the argument
    Value,
}

/// A named formal parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Name bound in the call frame
    pub name: String,
    /// Reference or value binding
    pub mode: BindingMode,
}

impl Param {
    /// A by-reference parameter.
    pub fn by_ref(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: BindingMode::Reference,
        }
    }

    /// A by-value parameter.
    pub fn by_value(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: BindingMode::Value,
        }
    }
}

/// One callable body with a fixed parameter list.
#[derive(Clone)]
pub struct Callable {
    name: String,
    params: Vec<Param>,
    body: BuiltinFnPtr,
}

impl Callable {
    /// Declare a callable; parameter names must be unique.
    pub fn new(
        name: impl Into<String>,
        params: Vec<Param>,
        body: impl Fn(&mut Runtime) -> Result<Value> + Send + Sync + 'static,
    ) -> Result<Self> {
        for (i, param) in params.iter().enumerate() {
            if params[..i].iter().any(|p| p.name == param.name) {
                return Err(RuntimeError::duplicate_symbol(format!(
                    "Duplicate function parameter id: '{}'.",
                    param.name
                )));
            }
        }
        Ok(Self {
            name: name.into(),
            params,
            body: Arc::new(body),
        })
    }

    /// Name used for diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Formal parameters in order.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Parameter count; the overload key.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// The body.
    pub fn body(&self) -> &BuiltinFnPtr {
        &self.body
    }
}

impl std::fmt::Debug for Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Callable({}/{})", self.name, self.arity())
    }
}

/// The payload of an Executable value: callables keyed by arity.
#[derive(Clone, Default)]
pub struct ExecutableData {
    overloads: BTreeMap<usize, Arc<Callable>>,
}

impl ExecutableData {
    /// An overload set holding one callable.
    pub fn new(callable: Callable) -> Self {
        let mut overloads = BTreeMap::new();
        overloads.insert(callable.arity(), Arc::new(callable));
        Self { overloads }
    }

    /// The callable taking `arity` arguments, if registered.
    pub fn get(&self, arity: usize) -> Option<&Arc<Callable>> {
        self.overloads.get(&arity)
    }

    /// Registered arities in ascending order.
    pub fn arities(&self) -> impl Iterator<Item = usize> + '_ {
        self.overloads.keys().copied()
    }

    /// Registered callables in arity order.
    pub fn callables(&self) -> impl Iterator<Item = &Arc<Callable>> {
        self.overloads.values()
    }

    /// Name of the lowest-arity callable.
    pub fn name(&self) -> &str {
        self.overloads
            .values()
            .next()
            .map(|c| c.name())
            .unwrap_or("")
    }

    /// Merge another overload set; arities must not collide.
    pub(crate) fn merge(&mut self, other: &ExecutableData) -> Result<()> {
        if let Some(arity) = other.arities().find(|a| self.overloads.contains_key(a)) {
            return Err(RuntimeError::duplicate_symbol(format!(
                "The function '{}' already has an overload taking {} parameters.",
                self.name(),
                arity
            )));
        }
        for (arity, callable) in &other.overloads {
            self.overloads.insert(*arity, Arc::clone(callable));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn noop(_: &mut Runtime) -> Result<Value> {
        Ok(Value::null())
    }

    #[test]
    fn test_duplicate_parameter_rejected() {
        let err = Callable::new("F", vec![Param::by_ref("x"), Param::by_value("x")], noop)
            .unwrap_err();
        assert_eq!(err.to_string(), "Duplicate function parameter id: 'x'.");
    }

    #[test]
    fn test_merge_overloads() {
        let one = Callable::new("F", vec![Param::by_value("a")], noop).unwrap();
        let two = Callable::new(
            "F",
            vec![Param::by_value("a"), Param::by_value("b")],
            noop,
        )
        .unwrap();

        let mut set = ExecutableData::new(one.clone());
        set.merge(&ExecutableData::new(two)).unwrap();
        assert_eq!(set.arities().collect::<Vec<_>>(), vec![1, 2]);

        let err = set.merge(&ExecutableData::new(one)).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::DuplicateSymbol);
    }
}
