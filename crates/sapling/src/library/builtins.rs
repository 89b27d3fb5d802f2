//! Conversion, introspection, and arithmetic helper routines

use std::cmp::Ordering;

use super::{by_ref, define, type_of};
use crate::environment::{mangle, CloneKind, Environment};
use crate::error::{Result, RuntimeError};
use crate::runtime::Runtime;
use crate::value::{string_as_numeric, Integer, Value, ValueKind};

pub(super) fn install(env: &Environment) -> Result<()> {
    install_conversions(env)?;
    install_predicates(env)?;
    install_symbols(env)?;
    install_extrema(env)?;
    install_steps(env)
}

// ═══════════════════════════════════════════════════════════════════════
// Conversion
// ═══════════════════════════════════════════════════════════════════════

fn install_conversions(env: &Environment) -> Result<()> {
    define(env, "Copy", by_ref(&["value"]), |rt| {
        Ok(rt.param("value")?.copy())
    })?;

    // Clone keeps the source's lock state; nested values are shared.
    define(env, "Clone", by_ref(&["value"]), |rt| {
        let value = rt.param("value")?;
        if value.is_executable() {
            return Err(RuntimeError::illegal_cast("Cannot clone an Executable."));
        }
        Ok(value.clone_with(CloneKind::Shallow))
    })?;

    define(env, "AsBoolean", by_ref(&["value"]), |rt| {
        rt.param("value")?.cast(ValueKind::Boolean)
    })?;
    define(env, "AsInteger", by_ref(&["value"]), |rt| {
        rt.param("value")?.cast(ValueKind::Integer)
    })?;
    define(env, "AsReal", by_ref(&["value"]), |rt| {
        rt.param("value")?.cast(ValueKind::Real)
    })?;
    define(env, "AsString", by_ref(&["value"]), |rt| {
        rt.param("value")?.cast(ValueKind::String)
    })?;
    define(env, "StringAsNumeric", by_ref(&["str"]), |rt| {
        string_as_numeric(&rt.param("str")?.as_string()?)
    })
}

// ═══════════════════════════════════════════════════════════════════════
// Introspection
// ═══════════════════════════════════════════════════════════════════════

fn install_predicates(env: &Environment) -> Result<()> {
    define(env, "IsLocked", by_ref(&["arg"]), |rt| {
        Ok(Value::boolean(rt.param("arg")?.is_locked()))
    })?;
    define(env, "Lock", by_ref(&["arg"]), |rt| {
        rt.param("arg")?.lock();
        Ok(Value::null())
    })?;

    for (name, kind) in [
        ("IsNull", ValueKind::Null),
        ("IsType", ValueKind::Type),
        ("IsBoolean", ValueKind::Boolean),
        ("IsInteger", ValueKind::Integer),
        ("IsReal", ValueKind::Real),
        ("IsString", ValueKind::String),
        ("IsArray", ValueKind::Array),
        ("IsDictionary", ValueKind::Dictionary),
        ("IsStructure", ValueKind::Structure),
        ("IsFunction", ValueKind::Executable),
    ] {
        define(env, name, by_ref(&["value"]), move |rt| {
            Ok(Value::boolean(rt.param("value")?.kind() == kind))
        })?;
    }

    define(env, "TypeOf", by_ref(&["expr"]), |rt| {
        type_of(&rt.param("expr")?)
    })?;
    define(env, "TypeId", by_ref(&["arg"]), |rt| {
        Ok(Value::integer(rt.param("arg")?.type_id()))
    })?;
    define(env, "IsExactlyEqual", by_ref(&["lhs", "rhs"]), |rt| {
        let (lhs, rhs) = (rt.param("lhs")?, rt.param("rhs")?);
        Ok(Value::boolean(lhs.exactly_equal(&rhs)))
    })
}

fn install_symbols(env: &Environment) -> Result<()> {
    define(env, "SymbolExists", by_ref(&["id"]), |rt| {
        let id = rt.param("id")?.as_string()?;
        Ok(Value::boolean(rt.env().exists(&id)))
    })?;
    define(env, "SymbolOfFunction", by_ref(&["funcname", "nparams"]), |rt| {
        let name = rt.param("funcname")?.as_string()?;
        let arity = rt.param("nparams")?.as_integer()?;
        let arity = usize::try_from(arity)
            .map_err(|_| RuntimeError::no_such_symbol(format!("{name}_{arity}")))?;
        rt.env()
            .lookup_overload(&name, arity)
            .map_err(|_| RuntimeError::no_such_symbol(mangle(&name, arity)))
    })
}

// ═══════════════════════════════════════════════════════════════════════
// Minimum / Maximum
// ═══════════════════════════════════════════════════════════════════════

fn install_extrema(env: &Environment) -> Result<()> {
    for (name, keep) in [("Minimum", Ordering::Less), ("Maximum", Ordering::Greater)] {
        define(env, name, by_ref(&["A"]), move |rt| {
            let items = rt.param("A")?.elements()?;
            extremum(&items, keep)
        })?;
        define(env, name, by_ref(&["x", "y"]), move |rt| {
            extremum(&[rt.param("x")?, rt.param("y")?], keep)
        })?;
        define(env, name, by_ref(&["x", "y", "z"]), move |rt| {
            extremum(&[rt.param("x")?, rt.param("y")?, rt.param("z")?], keep)
        })?;
    }
    Ok(())
}

/// The first value that no later value beats in direction `keep`; Null for
/// an empty slice.
fn extremum(values: &[Value], keep: Ordering) -> Result<Value> {
    let Some((first, rest)) = values.split_first() else {
        return Ok(Value::null());
    };
    let mut best = first;
    for candidate in rest {
        if candidate.compare(best)? == keep {
            best = candidate;
        }
    }
    Ok(best.clone())
}

// ═══════════════════════════════════════════════════════════════════════
// Inc / Dec
// ═══════════════════════════════════════════════════════════════════════

fn install_steps(env: &Environment) -> Result<()> {
    for (name, sign) in [("Inc", 1), ("Dec", -1)] {
        define(env, name, by_ref(&["x"]), move |rt| {
            step(&rt.param("x")?, &Value::integer(1), sign)?;
            Ok(Value::null())
        })?;
        define(env, name, by_ref(&["x", "amt"]), move |rt| {
            step(&rt.param("x")?, &rt.param("amt")?, sign)?;
            Ok(Value::null())
        })?;
    }
    Ok(())
}

/// Add `sign * amount` to `target` in place; arrays step every element.
fn step(target: &Value, amount: &Value, sign: Integer) -> Result<()> {
    match target.kind() {
        ValueKind::Boolean | ValueKind::Integer => {
            let delta = amount
                .as_integer()?
                .checked_mul(sign)
                .ok_or_else(|| RuntimeError::range("Integer overflow."))?;
            let next = target
                .as_integer()?
                .checked_add(delta)
                .ok_or_else(|| RuntimeError::range("Integer overflow."))?;
            target.assign(&Value::integer(next))
        }
        ValueKind::Real | ValueKind::String => {
            let next = target.as_real()? + amount.as_real()? * sign as crate::value::Real;
            target.assign(&Value::real(next))
        }
        ValueKind::Array => {
            for element in target.elements()? {
                step(&element, amount, sign)?;
            }
            Ok(())
        }
        other => Err(RuntimeError::illegal_cast(format!(
            "Values of type {other} cannot be incremented."
        ))),
    }
}
