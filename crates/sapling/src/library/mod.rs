//! The core library installed into the base table
//!
//! Each routine is a locked Executable declaring its parameters by name and
//! binding mode. Constants are locked values. Everything is inserted through
//! the base-table marker so installation works whatever the stack depth.

mod arrays;
mod builtins;
mod constants;
mod errors;
mod math;
mod random;
mod types;
mod version;

pub use self::types::{type_of, TypeRegistry};
pub use self::version::runtime_version;

use tracing::debug;

use crate::environment::{Environment, BASE_MARKER};
use crate::error::Result;
use crate::runtime::Runtime;
use crate::value::{Param, Value};

/// Install every core routine and constant into `rt`'s base table.
pub fn install(rt: &mut Runtime) -> Result<()> {
    let before = rt.env().base().len();
    constants::install(rt.env())?;
    builtins::install(rt.env())?;
    arrays::install(rt.env())?;
    math::install(rt.env())?;
    random::install(rt.env())?;
    errors::install(rt)?;
    version::install(rt)?;
    debug!(
        symbols = rt.env().base().len() - before,
        "installed core library"
    );
    Ok(())
}

/// Insert a locked routine into the base table.
pub(crate) fn define(
    env: &Environment,
    name: &str,
    params: Vec<Param>,
    body: impl Fn(&mut Runtime) -> Result<Value> + Send + Sync + 'static,
) -> Result<()> {
    let function = Value::function(name, params, body)?.locked();
    env.insert(&format!("{BASE_MARKER}{name}"), function)
}

/// Insert a locked constant into the base table.
pub(crate) fn constant(env: &Environment, name: &str, value: Value) -> Result<()> {
    env.insert(&format!("{BASE_MARKER}{name}"), value.locked())
}

/// Bind an existing routine under an additional, unmangled name.
pub(crate) fn alias(env: &Environment, alias: &str, name: &str, arity: usize) -> Result<()> {
    let function = env.lookup_overload(&format!("{BASE_MARKER}{name}"), arity)?;
    env.insert_unmangled(&format!("{BASE_MARKER}{alias}"), function)
}

fn by_ref(names: &[&str]) -> Vec<Param> {
    names.iter().map(|name| Param::by_ref(*name)).collect()
}
