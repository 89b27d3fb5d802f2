//! Core math routines
//!
//! Undefined operations raise `DomainError` or `DivideByZero` instead of
//! producing an infinity or NaN.

use super::{by_ref, define};
use crate::environment::Environment;
use crate::error::{Result, RuntimeError};
use crate::value::numeric::{self, Real};
use crate::value::{Value, ValueKind};

pub(super) fn install(env: &Environment) -> Result<()> {
    define(env, "Abs", by_ref(&["x"]), |rt| {
        let x = rt.param("x")?;
        match x.kind() {
            ValueKind::Integer => x
                .as_integer()?
                .checked_abs()
                .map(Value::integer)
                .ok_or_else(|| RuntimeError::domain("The absolute value overflows Integer.")),
            _ => Ok(Value::real(x.as_real()?.abs())),
        }
    })?;

    define(env, "Sqrt", by_ref(&["x"]), |rt| {
        let x = rt.param("x")?.as_real()?;
        if x < 0.0 {
            return Err(RuntimeError::domain(format!(
                "Cannot take the square root of a negative number, {}.",
                numeric::format_real(x)
            )));
        }
        Ok(Value::real(x.sqrt()))
    })?;

    define(env, "Ln", by_ref(&["x"]), |rt| {
        Ok(Value::real(positive(rt.param("x")?.as_real()?)?.ln()))
    })?;
    define(env, "Log", by_ref(&["x"]), |rt| {
        Ok(Value::real(positive(rt.param("x")?.as_real()?)?.log10()))
    })?;
    define(env, "Log", by_ref(&["x", "base"]), |rt| {
        let x = positive(rt.param("x")?.as_real()?)?;
        let base = positive(rt.param("base")?.as_real()?)?;
        if numeric::real_equal(base, 1.0) {
            return Err(RuntimeError::domain("A logarithm base cannot be 1."));
        }
        Ok(Value::real(x.ln() / base.ln()))
    })?;

    define(env, "Div", by_ref(&["x", "y"]), |rt| {
        let (x, y) = (rt.param("x")?.as_integer()?, rt.param("y")?.as_integer()?);
        if y == 0 {
            return Err(RuntimeError::divide_by_zero("Integer division by zero."));
        }
        x.checked_div(y)
            .map(Value::integer)
            .ok_or_else(|| RuntimeError::domain("The quotient overflows Integer."))
    })?;
    define(env, "Mod", by_ref(&["x", "y"]), |rt| {
        let (x, y) = (rt.param("x")?.as_integer()?, rt.param("y")?.as_integer()?);
        if y == 0 {
            return Err(RuntimeError::divide_by_zero("Integer modulus by zero."));
        }
        Ok(Value::integer(x.wrapping_rem(y)))
    })?;

    for (name, predicate) in [
        ("IsFinite", numeric::is_finite as fn(Real) -> bool),
        ("IsInfinite", numeric::is_infinite),
        ("IsNaN", numeric::is_nan),
        ("IsNormal", numeric::is_normal),
    ] {
        define(env, name, by_ref(&["x"]), move |rt| {
            Ok(Value::boolean(predicate(rt.param("x")?.as_real()?)))
        })?;
    }

    for (name, round) in [
        ("Floor", Real::floor as fn(Real) -> Real),
        ("Ceil", Real::ceil),
        ("Round", Real::round),
    ] {
        define(env, name, by_ref(&["x"]), move |rt| {
            let x = rt.param("x")?;
            if x.kind() == ValueKind::Integer {
                return Ok(Value::integer(x.as_integer()?));
            }
            Ok(Value::real(round(x.as_real()?)))
        })?;
    }
    Ok(())
}

fn positive(x: Real) -> Result<Real> {
    if x <= 0.0 || numeric::is_nan(x) {
        return Err(RuntimeError::domain(format!(
            "Cannot take the logarithm of a non-positive number, {}.",
            numeric::format_real(x)
        )));
    }
    Ok(x)
}
