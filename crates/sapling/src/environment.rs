//! Runtime environment: a shared base table plus a stack of frames

mod diagnostics;
mod frame;
mod table;

pub use frame::ScopeGuard;
pub use table::{demangle, mangle, SymbolTable};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, RuntimeError};
use crate::value::Value;

/// Leading marker that targets the base table directly.
pub const BASE_MARKER: char = '`';

/// Default maximum number of stacked frames.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// How much of an environment (or value) a clone shares with its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CloneKind {
    /// Share the base table; start a fresh single-frame stack
    Minimal,
    /// Duplicate table structure, share the values
    Shallow,
    /// Duplicate table structure and every value
    Deep,
}

/// The lexically-stacked symbol table.
///
/// Bare names resolve top-of-stack first, then down the stack, then in the
/// base table. Names with a leading backtick go straight to the base table
/// for both lookup and insert.
///
/// # Example
///
/// ```
/// use sapling::{Environment, Value};
///
/// let mut env = Environment::new();
/// env.push().unwrap();
/// env.insert("x", Value::integer(1)).unwrap();
///
/// env.push().unwrap();
/// env.insert("x", Value::integer(10)).unwrap(); // shadows outer x
/// assert_eq!(env.lookup("x").unwrap().as_integer().unwrap(), 10);
///
/// env.pop();
/// assert_eq!(env.lookup("x").unwrap().as_integer().unwrap(), 1);
/// ```
pub struct Environment {
    /// Shared by every `Minimal` clone
    base: Arc<SymbolTable>,

    /// Frames, innermost last
    stack: Vec<SymbolTable>,

    /// Maximum number of frames; 0 means unlimited
    max_depth: usize,

    /// High-water mark of `stack.len()`
    max_depth_attained: usize,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Create an environment with an empty base table and no frames.
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    /// Create an environment with a custom frame limit (0 = unlimited).
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            base: Arc::new(SymbolTable::new()),
            stack: Vec::new(),
            max_depth,
            max_depth_attained: 0,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Frame Management
    // ═══════════════════════════════════════════════════════════════════

    /// Push an empty frame.
    pub fn push(&mut self) -> Result<()> {
        self.push_table(SymbolTable::new())
    }

    /// Push a pre-built frame.
    ///
    /// Fails with `StackOverflow` when the frame limit would be exceeded; the
    /// environment is left unchanged.
    pub fn push_table(&mut self, table: SymbolTable) -> Result<()> {
        let depth = self.stack.len() + 1;
        if self.max_depth > 0 && depth > self.max_depth {
            return Err(RuntimeError::StackOverflow {
                depth,
                max: self.max_depth,
            });
        }
        self.stack.push(table);
        self.max_depth_attained = self.max_depth_attained.max(depth);
        debug!(depth, "push frame");
        Ok(())
    }

    /// Pop the innermost frame. Returns `false` if the stack was empty.
    pub fn pop(&mut self) -> bool {
        let popped = self.stack.pop().is_some();
        if popped {
            debug!(depth = self.stack.len(), "pop frame");
        }
        popped
    }

    /// Number of frames on the stack.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Configured frame limit (0 = unlimited).
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Deepest the stack has been since creation.
    pub fn max_depth_attained(&self) -> usize {
        self.max_depth_attained
    }

    /// The base table.
    pub fn base(&self) -> &Arc<SymbolTable> {
        &self.base
    }

    /// Whether both environments share one base table.
    pub fn shares_base_with(&self, other: &Environment) -> bool {
        Arc::ptr_eq(&self.base, &other.base)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Binding
    // ═══════════════════════════════════════════════════════════════════

    /// Bind `value` in the innermost frame (or the base table when the
    /// stack is empty or the name carries the base marker).
    ///
    /// Executables are registered under their arities, so overloads that
    /// share a name coexist.
    pub fn insert(&self, key: &str, value: Value) -> Result<()> {
        let (table, name) = self.target(key);
        table.insert(name, value)
    }

    /// Bind `value` under its bare name even if it is an Executable, so it
    /// can be passed around without knowing its arity.
    pub fn insert_unmangled(&self, key: &str, value: Value) -> Result<()> {
        let (table, name) = self.target(key);
        table.insert_plain(name, value)
    }

    fn target<'a>(&'a self, key: &'a str) -> (&'a SymbolTable, &'a str) {
        match key.strip_prefix(BASE_MARKER) {
            Some(name) => (self.base.as_ref(), name),
            None => (self.stack.last().unwrap_or(self.base.as_ref()), key),
        }
    }

    fn search_order<'a>(&'a self, key: &'a str) -> (Vec<&'a SymbolTable>, &'a str) {
        match key.strip_prefix(BASE_MARKER) {
            Some(name) => (vec![self.base.as_ref()], name),
            None => {
                let mut tables: Vec<&SymbolTable> = self.stack.iter().rev().collect();
                tables.push(self.base.as_ref());
                (tables, key)
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Lookup
    // ═══════════════════════════════════════════════════════════════════

    /// Resolve `key`. A mangled key (`Max_2`) that is not bound as a plain
    /// name resolves to the matching overload.
    pub fn lookup(&self, key: &str) -> Result<Value> {
        self.find(key)
            .ok_or_else(|| RuntimeError::no_such_symbol(key))
    }

    /// Resolve the overload of `name` taking exactly `arity` arguments.
    pub fn lookup_overload(&self, name: &str, arity: usize) -> Result<Value> {
        self.find_overload(name, arity)
            .ok_or_else(|| RuntimeError::no_such_symbol(mangle(name, arity)))
    }

    /// Whether `key` resolves.
    pub fn exists(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    fn find(&self, key: &str) -> Option<Value> {
        let (tables, name) = self.search_order(key);
        if let Some(value) = tables.iter().find_map(|t| t.get(name)) {
            return Some(value);
        }
        let (base_name, arity) = demangle(name)?;
        tables
            .iter()
            .find_map(|t| t.get_overload(base_name, arity))
    }

    fn find_overload(&self, name: &str, arity: usize) -> Option<Value> {
        let (tables, name) = self.search_order(name);
        tables.iter().find_map(|t| t.get_overload(name, arity))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Bulk Operations
    // ═══════════════════════════════════════════════════════════════════

    /// Total bindings across the base table and every frame.
    pub fn num(&self) -> usize {
        self.base.len() + self.stack.iter().map(SymbolTable::len).sum::<usize>()
    }

    /// Empty the base table and drop every frame.
    ///
    /// The base table is shared with `Minimal` clones, which see it emptied.
    pub fn clear(&mut self) {
        self.base.clear();
        self.stack.clear();
    }

    /// Copy this environment's base bindings into `target`'s base table and
    /// push a duplicate of each of this environment's frames onto `target`.
    pub fn load(&self, target: &mut Environment, kind: CloneKind) -> Result<()> {
        self.base.load_into(&target.base, kind)?;
        for frame in &self.stack {
            target.push_table(frame.duplicate(kind))?;
        }
        Ok(())
    }

    /// Produce a new environment from this one.
    ///
    /// `Minimal` shares the base table and starts one fresh frame; `Shallow`
    /// and `Deep` rebuild both base table and stack.
    pub fn clone_with(&self, kind: CloneKind) -> Result<Environment> {
        let mut env = Environment::with_max_depth(self.max_depth);
        match kind {
            CloneKind::Minimal => {
                env.base = Arc::clone(&self.base);
                env.push()?;
            }
            CloneKind::Shallow | CloneKind::Deep => self.load(&mut env, kind)?,
        }
        debug!(?kind, frames = env.depth(), "clone environment");
        Ok(env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_without_frames_targets_base() {
        let env = Environment::new();
        env.insert("x", Value::integer(1)).unwrap();
        assert_eq!(env.base().len(), 1);
        assert!(env.exists("`x"));
    }

    #[test]
    fn test_backtick_bypasses_stack() {
        let mut env = Environment::new();
        env.push().unwrap();
        env.insert("x", Value::integer(1)).unwrap();
        env.insert("`x", Value::integer(2)).unwrap();
        assert_eq!(env.lookup("x").unwrap().as_integer().unwrap(), 1);
        assert_eq!(env.lookup("`x").unwrap().as_integer().unwrap(), 2);
    }

    #[test]
    fn test_stack_overflow_is_recoverable() {
        let mut env = Environment::with_max_depth(2);
        env.push().unwrap();
        env.push().unwrap();
        let err = env.push().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StackOverflowError);
        assert_eq!(env.depth(), 2);
        env.pop();
        env.push().unwrap();
        assert_eq!(env.max_depth_attained(), 2);
    }

    #[test]
    fn test_zero_max_depth_is_unlimited() {
        let mut env = Environment::with_max_depth(0);
        for _ in 0..2000 {
            env.push().unwrap();
        }
        assert_eq!(env.depth(), 2000);
    }

    #[test]
    fn test_pop_empty_stack() {
        let mut env = Environment::new();
        assert!(!env.pop());
    }
}
