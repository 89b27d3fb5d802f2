//! Version triples

use std::cmp::Ordering;

use super::{by_ref, constant, define};
use crate::error::{Result, RuntimeError};
use crate::runtime::Runtime;
use crate::value::{Integer, Value};

/// This runtime's version as `(major, minor, patch)`.
pub fn runtime_version() -> (Integer, Integer, Integer) {
    let part = |text: &str| text.parse::<Integer>().unwrap_or(0);
    (
        part(env!("CARGO_PKG_VERSION_MAJOR")),
        part(env!("CARGO_PKG_VERSION_MINOR")),
        part(env!("CARGO_PKG_VERSION_PATCH")),
    )
}

pub(super) fn install(rt: &mut Runtime) -> Result<()> {
    let version_t = rt.types().version_t();
    let runtime_version = make(&Value::shared_type(version_t.clone()), runtime_version())?;
    let env = rt.env();
    constant(env, "VersionT", Value::shared_type(version_t))?;
    constant(env, "VERSION", runtime_version)?;

    define(env, "MakeVersion", by_ref(&["major", "minor", "patch"]), |rt| {
        let triple = (
            rt.param("major")?.as_integer()?,
            rt.param("minor")?.as_integer()?,
            rt.param("patch")?.as_integer()?,
        );
        make(&Value::shared_type(rt.types().version_t()), triple)
    })?;
    define(env, "VersionLessThan", by_ref(&["lhs", "rhs"]), |rt| {
        let ordering = triple(&rt.param("lhs")?)?.cmp(&triple(&rt.param("rhs")?)?);
        Ok(Value::boolean(ordering == Ordering::Less))
    })?;
    define(env, "VersionEqual", by_ref(&["lhs", "rhs"]), |rt| {
        let equal = triple(&rt.param("lhs")?)? == triple(&rt.param("rhs")?)?;
        Ok(Value::boolean(equal))
    })?;
    define(env, "VersionAsString", by_ref(&["version"]), |rt| {
        let (major, minor, patch) = triple(&rt.param("version")?)?;
        Ok(Value::string(format!("{major}.{minor}.{patch}")))
    })
}

fn make(version_t: &Value, (major, minor, patch): (Integer, Integer, Integer)) -> Result<Value> {
    let version = version_t.declare()?;
    version.member("Major")?.assign(&Value::integer(major))?;
    version.member("Minor")?.assign(&Value::integer(minor))?;
    version.member("Patch")?.assign(&Value::integer(patch))?;
    Ok(version)
}

fn triple(version: &Value) -> Result<(Integer, Integer, Integer)> {
    if !version.is_structure() {
        return Err(RuntimeError::cannot_cast(version.kind().name(), "VersionT"));
    }
    Ok((
        version.member("Major")?.as_integer()?,
        version.member("Minor")?.as_integer()?,
        version.member("Patch")?.as_integer()?,
    ))
}
