//! # Sapling
//!
//! The runtime core of an embeddable, dynamically-typed, tree-walking
//! scripting language.
//!
//! Sapling provides what a front end (parser plus tree walker) needs to run
//! a script: shared, lockable values; a stacked symbol environment with a
//! base table and overloads by arity; a call dispatcher with by-reference
//! and by-value parameters; per-kind error handler stacks; and a core
//! library of routines and constants installed into the base table.
//!
//! ## Architecture
//!
//! - **Values**: `Value` handles alias a shared cell; `copy` and
//!   `duplicate` produce independent values
//! - **Environment**: frames over a base table, with `Minimal`, `Shallow`
//!   and `Deep` clones
//! - **Dispatch**: overload selection, frame binding, and the call state
//!   machine
//! - **Runtime**: handler stacks, the random stream, and top-level outcomes
//! - **Library**: the routines and constants a fresh runtime starts with
//!
//! ## Example
//!
//! ```
//! use sapling::{EvalContext, Runtime, ScriptOutcome, Value};
//!
//! let mut rt = Runtime::new(EvalContext::new()).unwrap();
//! let outcome = rt.run(|rt| {
//!     let scores = Value::array(1, Vec::new());
//!     rt.call("Append", vec![scores.clone(), Value::integer(30)])?;
//!     rt.call("Append", vec![scores.clone(), Value::integer(10)])?;
//!     let ascending = rt.env().lookup("SORT_ASCENDING")?;
//!     rt.call("Sort", vec![scores.clone(), ascending])?;
//!     scores.element_at(1)
//! });
//!
//! match outcome {
//!     ScriptOutcome::Completed(first) => assert_eq!(first.as_integer().unwrap(), 10),
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod dispatch;
pub mod environment;
pub mod error;
pub mod library;
pub mod rng;
pub mod runtime;
pub mod value;

// Re-export main types
pub use context::EvalContext;
pub use dispatch::{Call, CallState, ErrorHandlers};
pub use environment::{
    demangle, mangle, CloneKind, Environment, ScopeGuard, SymbolTable, BASE_MARKER,
};
pub use error::{ErrorKind, Result, RuntimeError};
pub use library::{runtime_version, type_of, TypeRegistry};
pub use rng::RngStream;
pub use runtime::{Runtime, ScriptOutcome};
pub use value::{
    ArrayData, ArrayType, BindingMode, Bounds, BuiltinFnPtr, Callable, DictKey, DictionaryData,
    ExecutableData, Integer, Param, RangePolicy, Real, StructureData, StructureType,
    TypeDescriptor, Value, ValueData, ValueKind,
};

/// Sapling version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
