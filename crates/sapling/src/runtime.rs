//! The runtime context: environment, handler stacks, RNG, and type registry
//!
//! Everything a library body may need lives here and is handed to the body
//! as `&mut Runtime`; there is no process-global state.

use tracing::{debug, error, warn};

use crate::context::EvalContext;
use crate::dispatch::{Call, ErrorHandlers};
use crate::environment::Environment;
use crate::error::{ErrorKind, Result, RuntimeError};
use crate::library::{self, TypeRegistry};
use crate::rng::RngStream;
use crate::value::Value;

/// How a top-level script run ended.
#[derive(Debug)]
pub enum ScriptOutcome {
    /// The script produced a value
    Completed(Value),
    /// An unhandled error unwound to the top level
    Aborted(RuntimeError),
    /// `Terminate` was raised (or the interrupt flag was set)
    Terminated,
}

impl ScriptOutcome {
    /// Whether the script ran to completion.
    pub fn is_completed(&self) -> bool {
        matches!(self, ScriptOutcome::Completed(_))
    }
}

/// Interpreter state shared by every call.
///
/// # Example
///
/// ```
/// use sapling::{EvalContext, Runtime, Value};
///
/// let mut rt = Runtime::new(EvalContext::new()).unwrap();
/// let max = rt
///     .call("Maximum", vec![Value::integer(3), Value::integer(5)])
///     .unwrap();
/// assert_eq!(max.as_integer().unwrap(), 5);
/// ```
pub struct Runtime {
    env: Environment,
    handlers: ErrorHandlers,
    config: EvalContext,
    rng: RngStream,
    types: TypeRegistry,
    call_depth: usize,
}

impl Runtime {
    /// A runtime with the core library in the base table and one global
    /// frame pushed.
    pub fn new(config: EvalContext) -> Result<Self> {
        let mut rt = Self::bare(config);
        library::install(&mut rt)?;
        rt.env.push()?;
        Ok(rt)
    }

    /// A runtime with an empty environment.
    pub fn bare(config: EvalContext) -> Self {
        Self {
            env: Environment::with_max_depth(config.max_stack_depth),
            handlers: ErrorHandlers::new(),
            rng: RngStream::new(config.rng_seed),
            types: TypeRegistry::default(),
            call_depth: 0,
            config,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════

    /// The environment.
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// The environment, mutably.
    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// The configuration this runtime was built with.
    pub fn config(&self) -> &EvalContext {
        &self.config
    }

    /// The error handler stacks.
    pub fn handlers(&self) -> &ErrorHandlers {
        &self.handlers
    }

    /// The error handler stacks, mutably.
    pub fn handlers_mut(&mut self) -> &mut ErrorHandlers {
        &mut self.handlers
    }

    /// The random-number stream.
    pub fn rng_mut(&mut self) -> &mut RngStream {
        &mut self.rng
    }

    /// Memoized library type descriptors.
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Number of calls currently executing.
    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    pub(crate) fn enter_call(&mut self) {
        self.call_depth += 1;
    }

    pub(crate) fn leave_call(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
    }

    // ═══════════════════════════════════════════════════════════════════
    // Calls
    // ═══════════════════════════════════════════════════════════════════

    /// Call the overload of `name` matching `args.len()`.
    pub fn call(&mut self, name: &str, args: Vec<Value>) -> Result<Value> {
        let call = Call::resolve(&self.env, name, args)?.with_trace(self.config.trace);
        call.execute(self)
    }

    /// Call an Executable value directly.
    pub fn call_value(&mut self, callee: &Value, args: Vec<Value>) -> Result<Value> {
        let call = Call::from_value(callee, args)?.with_trace(self.config.trace);
        call.execute(self)
    }

    /// Read a parameter bound by the current call.
    pub fn param(&self, name: &str) -> Result<Value> {
        self.env.lookup(name)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Error Handling
    // ═══════════════════════════════════════════════════════════════════

    /// Run one statement-sized unit of work.
    ///
    /// A catchable error is offered to the handlers installed for its kind;
    /// if they accept it the statement yields Null and execution continues.
    /// Frames pushed by `f` are popped before handlers run.
    pub fn guard(
        &mut self,
        location: &str,
        f: impl FnOnce(&mut Runtime) -> Result<Value>,
    ) -> Result<Value> {
        let depth = self.env.depth();
        match f(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.unwind_to(depth);
                if !err.is_catchable() {
                    return Err(err);
                }
                if self.invoke_handlers(err.kind(), location, &err.message())? {
                    Ok(Value::null())
                } else {
                    Err(err)
                }
            }
        }
    }

    /// Run a script body at top level.
    pub fn run(&mut self, f: impl FnOnce(&mut Runtime) -> Result<Value>) -> ScriptOutcome {
        let depth = self.env.depth();
        let outcome = match f(self) {
            Ok(value) => ScriptOutcome::Completed(value),
            Err(err) if err.kind() == ErrorKind::Terminate => {
                debug!(message = %err.message(), "script terminated");
                ScriptOutcome::Terminated
            }
            Err(err) => {
                error!(kind = %err.kind(), "{}", err.diagnostic());
                ScriptOutcome::Aborted(err)
            }
        };
        self.unwind_to(depth);
        outcome
    }

    /// Offer an error to the handlers installed for `kind`, newest first.
    ///
    /// Returns `true` only if at least one handler ran and none declined.
    /// Handlers of arity 1 receive an `ErrorT` instance by reference;
    /// handlers of arity 0 receive nothing.
    pub fn invoke_handlers(
        &mut self,
        kind: ErrorKind,
        location: &str,
        message: &str,
    ) -> Result<bool> {
        let handlers = self.handlers.snapshot(kind);
        if handlers.is_empty() {
            return Ok(false);
        }

        let report = self.types.error_t().declare();
        report.member("Location")?.assign(&Value::string(location))?;
        report.member("Message")?.assign(&Value::string(message))?;

        for handler in handlers {
            let args = if handler.callable(1).is_some() {
                vec![report.clone()]
            } else {
                Vec::new()
            };
            if !self.call_value(&handler, args)?.as_boolean()? {
                warn!(%kind, location, "error handler declined");
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub(crate) fn unwind_to(&mut self, depth: usize) {
        while self.env.depth() > depth {
            self.env.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Param;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_pushes_global_frame() {
        let rt = Runtime::new(EvalContext::new()).unwrap();
        assert_eq!(rt.env().depth(), 1);
        assert!(rt.env().exists("`NULL"));
    }

    #[test]
    fn test_bare_is_empty() {
        let rt = Runtime::bare(EvalContext::new());
        assert_eq!(rt.env().num(), 0);
        assert_eq!(rt.call_depth(), 0);
    }

    #[test]
    fn test_call_depth_tracks_nesting() {
        let mut rt = Runtime::bare(EvalContext::new());
        let probe = Value::function("Probe", vec![], |rt| {
            Ok(Value::integer(rt.call_depth() as crate::Integer))
        })
        .unwrap();
        rt.env().insert("Probe", probe).unwrap();
        let outer = Value::function("Outer", vec![], |rt| rt.call("Probe", vec![])).unwrap();
        rt.env().insert("Outer", outer).unwrap();

        assert_eq!(rt.call("Outer", vec![]).unwrap().as_integer().unwrap(), 2);
        assert_eq!(rt.call_depth(), 0);
    }

    #[test]
    fn test_interrupt_terminates_next_call() {
        let config = EvalContext::new();
        let mut rt = Runtime::new(config.clone()).unwrap();
        config.interrupt();
        let outcome = rt.run(|rt| rt.call("IsNull", vec![Value::null()]));
        assert!(matches!(outcome, ScriptOutcome::Terminated));
    }

    #[test]
    fn test_guard_unwinds_frames() {
        let mut rt = Runtime::bare(EvalContext::new());
        let handler = Value::function("H", vec![Param::by_ref("err")], |_| {
            Ok(Value::boolean(true))
        })
        .unwrap();
        rt.handlers_mut()
            .push(ErrorKind::RangeError, handler)
            .unwrap();

        let result = rt
            .guard("test", |rt| {
                rt.env_mut().push()?;
                rt.env_mut().push()?;
                Err(RuntimeError::range("out of range"))
            })
            .unwrap();
        assert!(result.is_null());
        assert_eq!(rt.env().depth(), 0);
    }
}
