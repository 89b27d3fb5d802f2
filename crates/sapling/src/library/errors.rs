//! Script access to the error handler stacks

use super::{by_ref, constant, define};
use crate::error::{ErrorKind, Result, RuntimeError};
use crate::runtime::Runtime;
use crate::value::{Integer, Value};

pub(super) fn install(rt: &mut Runtime) -> Result<()> {
    let error_t = rt.types().error_t();
    let env = rt.env();
    constant(env, "ErrorT", Value::shared_type(error_t))?;

    define(env, "OnErrorPush", by_ref(&["index", "call"]), |rt| {
        let kind = error_kind(&rt.param("index")?)?;
        let handler = rt.param("call")?;
        rt.handlers_mut().push(kind, handler)?;
        Ok(Value::null())
    })?;
    define(env, "OnErrorInvoke", by_ref(&["index"]), |rt| {
        let kind = error_kind(&rt.param("index")?)?;
        let handled = rt.invoke_handlers(kind, "OnErrorInvoke", "")?;
        Ok(Value::boolean(handled))
    })?;
    define(env, "OnErrorPop", by_ref(&["index"]), |rt| {
        let kind = error_kind(&rt.param("index")?)?;
        rt.handlers_mut().pop(kind);
        Ok(Value::null())
    })?;
    define(env, "Terminate", Vec::new(), |_| {
        Err(RuntimeError::terminate("Program termination."))
    })
}

fn error_kind(index: &Value) -> Result<ErrorKind> {
    let index: Integer = index.as_integer()?;
    ErrorKind::from_index(index).ok_or_else(|| {
        RuntimeError::illegal_value(format!(
            "The specified index, {index}, is not a valid error callback index in the range [0, {}).",
            ErrorKind::ALL.len()
        ))
    })
}
