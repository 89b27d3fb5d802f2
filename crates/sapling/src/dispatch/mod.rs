//! Function-call protocol: overload selection, frame binding, execution
//!
//! A call moves through `Resolved → FrameBound → Executing` and ends in
//! `Returned` or `Raised`. The frame pushed for the parameters is popped on
//! both exits, so an error leaves the environment as the caller had it.

mod handlers;

pub use handlers::ErrorHandlers;

use std::sync::Arc;

use tracing::trace;

use crate::environment::{mangle, Environment, SymbolTable};
use crate::error::{Result, RuntimeError};
use crate::runtime::Runtime;
use crate::value::{BindingMode, Callable, Value, ValueData};

/// Where a call is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    /// An overload matching the argument count was selected
    Resolved,
    /// A frame binding every parameter has been pushed
    FrameBound,
    /// The body is running
    Executing,
    /// The body produced a value and the frame was popped
    Returned,
    /// The body (or binding) failed and the frame was popped
    Raised,
}

/// One invocation of a callable.
#[derive(Debug)]
pub struct Call {
    callable: Arc<Callable>,
    args: Vec<Value>,
    state: CallState,
    trace: bool,
}

impl Call {
    /// Select the overload of `name` taking `args.len()` arguments.
    ///
    /// There is no arity coercion: a missing overload is `NoSuchSymbol`
    /// naming the mangled key.
    #[tracing::instrument(level = "debug", skip_all, fields(symbol = name, argc = args.len()))]
    pub fn resolve(env: &Environment, name: &str, args: Vec<Value>) -> Result<Call> {
        let callee = env.lookup_overload(name, args.len())?;
        Call::from_value(&callee, args)
    }

    /// Select the overload of an Executable value for `args.len()`.
    pub fn from_value(callee: &Value, args: Vec<Value>) -> Result<Call> {
        let arity = args.len();
        let callable = callee.with_data(|data| match data {
            ValueData::Executable(exe) => exe
                .get(arity)
                .cloned()
                .ok_or_else(|| RuntimeError::no_such_symbol(mangle(exe.name(), arity))),
            other => Err(RuntimeError::cannot_cast(other.kind().name(), "Executable")),
        })?;
        let call = Call {
            callable,
            args,
            state: CallState::Resolved,
            trace: false,
        };
        call.log_state();
        Ok(call)
    }

    /// Emit state transitions at `trace` level.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CallState {
        self.state
    }

    /// The selected callable.
    pub fn callable(&self) -> &Arc<Callable> {
        &self.callable
    }

    /// Push a frame binding each parameter to its argument.
    ///
    /// Reference parameters alias the argument; value parameters bind an
    /// independent copy. Parameters are bound under their plain names, so an
    /// Executable argument stays reachable without knowing its arity.
    pub fn bind(&mut self, env: &mut Environment) -> Result<()> {
        let frame = SymbolTable::new();
        for (param, arg) in self.callable.params().iter().zip(&self.args) {
            let bound = match param.mode {
                BindingMode::Reference => arg.clone(),
                BindingMode::Value => arg.copy(),
            };
            frame.insert_plain(&param.name, bound)?;
        }
        env.push_table(frame)?;
        self.transition(CallState::FrameBound);
        Ok(())
    }

    /// Bind, run the body, and unwind to the depth the call started at.
    ///
    /// Frames the body pushed and left behind are popped with the call's own.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(callable = self.callable.name(), arity = self.callable.arity())
    )]
    pub fn execute(mut self, rt: &mut Runtime) -> Result<Value> {
        if rt.config().is_interrupted() {
            self.transition(CallState::Raised);
            return Err(RuntimeError::terminate("Execution interrupted."));
        }
        let depth = rt.env().depth();
        if let Err(err) = self.bind(rt.env_mut()) {
            self.transition(CallState::Raised);
            return Err(err);
        }

        self.transition(CallState::Executing);
        let body = Arc::clone(self.callable.body());
        rt.enter_call();
        let result = body(rt);
        rt.leave_call();
        rt.unwind_to(depth);

        match &result {
            Ok(_) => self.transition(CallState::Returned),
            Err(_) => self.transition(CallState::Raised),
        }
        result
    }

    fn transition(&mut self, state: CallState) {
        self.state = state;
        self.log_state();
    }

    fn log_state(&self) {
        if self.trace {
            trace!(
                callable = self.callable.name(),
                arity = self.callable.arity(),
                state = ?self.state,
                "call"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Param;
    use crate::{ErrorKind, EvalContext};
    use pretty_assertions::assert_eq;

    fn bump() -> Value {
        Value::function("Bump", vec![Param::by_ref("x")], |rt| {
            let x = rt.param("x")?;
            x.assign(&Value::integer(x.as_integer()? + 1))?;
            Ok(Value::null())
        })
        .unwrap()
    }

    #[test]
    fn test_states_through_successful_call() {
        let mut rt = Runtime::bare(EvalContext::new());
        let arg = Value::integer(1);
        let mut call = Call::from_value(&bump(), vec![arg.clone()]).unwrap();
        assert_eq!(call.state(), CallState::Resolved);

        call.bind(rt.env_mut()).unwrap();
        assert_eq!(call.state(), CallState::FrameBound);
        assert_eq!(rt.env().depth(), 1);
        rt.env_mut().pop();

        let call = Call::from_value(&bump(), vec![arg.clone()]).unwrap();
        call.execute(&mut rt).unwrap();
        assert_eq!(arg.as_integer().unwrap(), 2);
        assert_eq!(rt.env().depth(), 0);
    }

    #[test]
    fn test_frame_popped_after_error() {
        let mut rt = Runtime::bare(EvalContext::new());
        let fail = Value::function("Fail", vec![], |_| {
            Err(RuntimeError::range("boom"))
        })
        .unwrap();
        let err = Call::from_value(&fail, vec![]).unwrap().execute(&mut rt).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RangeError);
        assert_eq!(rt.env().depth(), 0);
    }

    #[test]
    fn test_frames_pushed_by_body_unwound_on_error() {
        let mut rt = Runtime::bare(EvalContext::new());
        rt.env_mut().push().unwrap();
        rt.env_mut().insert("outer", Value::integer(1)).unwrap();

        let nested = Value::function("Nested", vec![], |rt| {
            rt.env_mut().push()?;
            rt.env_mut().push()?;
            Err(RuntimeError::domain("inside a block"))
        })
        .unwrap();
        let err = Call::from_value(&nested, vec![]).unwrap().execute(&mut rt).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DomainError);
        assert_eq!(rt.env().depth(), 1);
        assert!(rt.env().exists("outer"));
    }

    #[test]
    fn test_wrong_arity_names_mangled_key() {
        let err = Call::from_value(&bump(), vec![]).unwrap_err();
        assert_eq!(err.to_string(), "The symbol 'Bump_0' does not exist.");
    }

    #[test]
    fn test_non_executable_callee() {
        let err = Call::from_value(&Value::integer(1), vec![]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalCast);
    }
}
