//! Script-installed error handler stacks

use std::collections::HashMap;

use tracing::debug;

use crate::error::{ErrorKind, Result, RuntimeError};
use crate::value::Value;

/// One stack of handler callables per error kind.
///
/// Handlers are Executable values taking either no arguments or a single
/// `ErrorT` structure. The stacks only store them; running them is the
/// runtime's job because it needs the environment.
#[derive(Default)]
pub struct ErrorHandlers {
    stacks: HashMap<ErrorKind, Vec<Value>>,
}

impl ErrorHandlers {
    /// Empty handler stacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handler` as the newest handler for `kind`.
    pub fn push(&mut self, kind: ErrorKind, handler: Value) -> Result<()> {
        if matches!(kind, ErrorKind::Null | ErrorKind::Ok | ErrorKind::Terminate) {
            return Err(RuntimeError::illegal_value(format!(
                "Handlers cannot be installed for {kind}."
            )));
        }
        if !handler.is_executable() {
            return Err(RuntimeError::cannot_cast(
                handler.kind().name(),
                "Executable",
            ));
        }
        let stack = self.stacks.entry(kind).or_default();
        stack.push(handler);
        debug!(%kind, depth = stack.len(), "push error handler");
        Ok(())
    }

    /// Remove the newest handler for `kind`. Returns `false` if none was
    /// installed.
    pub fn pop(&mut self, kind: ErrorKind) -> bool {
        let popped = self
            .stacks
            .get_mut(&kind)
            .and_then(Vec::pop)
            .is_some();
        if popped {
            debug!(%kind, depth = self.depth(kind), "pop error handler");
        }
        popped
    }

    /// Handlers for `kind`, newest first.
    pub fn snapshot(&self, kind: ErrorKind) -> Vec<Value> {
        self.stacks
            .get(&kind)
            .map(|stack| stack.iter().rev().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of handlers installed for `kind`.
    pub fn depth(&self, kind: ErrorKind) -> usize {
        self.stacks.get(&kind).map_or(0, Vec::len)
    }

    /// Drop every handler.
    pub fn clear(&mut self) {
        self.stacks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Param;
    use pretty_assertions::assert_eq;

    fn handler(tag: &str) -> Value {
        Value::function(tag, vec![Param::by_ref("err")], |_| {
            Ok(Value::boolean(true))
        })
        .unwrap()
    }

    #[test]
    fn test_snapshot_is_newest_first() {
        let mut handlers = ErrorHandlers::new();
        let first = handler("first");
        let second = handler("second");
        handlers.push(ErrorKind::RangeError, first.clone()).unwrap();
        handlers.push(ErrorKind::RangeError, second.clone()).unwrap();

        let snapshot = handlers.snapshot(ErrorKind::RangeError);
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot[0].ptr_eq(&second));
        assert!(snapshot[1].ptr_eq(&first));
        assert!(handlers.snapshot(ErrorKind::DomainError).is_empty());
    }

    #[test]
    fn test_pop_empty_is_noop() {
        let mut handlers = ErrorHandlers::new();
        assert!(!handlers.pop(ErrorKind::IllegalCast));
        handlers.push(ErrorKind::IllegalCast, handler("h")).unwrap();
        assert!(handlers.pop(ErrorKind::IllegalCast));
        assert_eq!(handlers.depth(ErrorKind::IllegalCast), 0);
    }

    #[test]
    fn test_rejects_uncatchable_kinds_and_non_callables() {
        let mut handlers = ErrorHandlers::new();
        let err = handlers
            .push(ErrorKind::Terminate, handler("h"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalValue);

        let err = handlers
            .push(ErrorKind::RangeError, Value::integer(3))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalCast);
    }
}
