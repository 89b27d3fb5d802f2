//! Locked constants: limits, type ids, range policies, error indices, and
//! library presence flags

use super::constant;
use crate::environment::Environment;
use crate::error::{ErrorKind, Result};
use crate::value::numeric::{self, Integer, Real};
use crate::value::{RangePolicy, Value, ValueKind};

/// Library families this build provides.
const PRESENT: &[&str] = &["IS_LIB_CORE", "IS_LIB_MATH_CORE", "IS_LIB_MATH_RANDOM"];

/// Library families that exist elsewhere but are not part of this runtime.
const ABSENT: &[&str] = &[
    "IS_LIB_CONSOLE_IO",
    "IS_LIB_DATABASE",
    "IS_LIB_DATETIME",
    "IS_LIB_DEBUG",
    "IS_LIB_FILEIO",
    "IS_LIB_GRAPHICS",
    "IS_LIB_MATH_COMPLEX",
    "IS_LIB_MATH_MATRIX",
    "IS_LIB_NETWORK",
    "IS_LIB_RS232",
    "IS_LIB_STRING",
    "IS_LIB_TEXT_IO",
    "IS_LIB_ZLIB",
];

pub(super) fn install(env: &Environment) -> Result<()> {
    constant(env, "NULL", Value::null())?;

    for kind in ValueKind::ALL {
        let name = format!("TYPEID_{}", kind.name().to_uppercase());
        constant(env, &name, Value::integer(kind.type_id()))?;
    }

    for (name, policy) in [
        ("RANGE_BOUNDARY_ERROR", RangePolicy::Error),
        ("RANGE_BOUNDARY_CAP", RangePolicy::Cap),
        ("RANGE_BOUNDARY_ROLLOVER", RangePolicy::Rollover),
    ] {
        constant(env, name, Value::integer(policy.code()))?;
    }

    constant(env, "BOOLEAN_MIN", Value::boolean(false))?;
    constant(env, "BOOLEAN_MAX", Value::boolean(true))?;
    constant(env, "INTEGER_MIN", Value::integer(Integer::MIN))?;
    constant(env, "INTEGER_MAX", Value::integer(Integer::MAX))?;
    constant(env, "INTEGER_EPS", Value::integer(1))?;
    constant(env, "REAL_MIN", Value::real(Real::MIN_POSITIVE))?;
    constant(env, "REAL_MAX", Value::real(Real::MAX))?;
    constant(env, "REAL_EPS", Value::real(Real::EPSILON))?;
    constant(
        env,
        "USES_32BIT_ATOMICS",
        Value::boolean(!numeric::USES_64BIT_ATOMICS),
    )?;
    constant(
        env,
        "USES_64BIT_ATOMICS",
        Value::boolean(numeric::USES_64BIT_ATOMICS),
    )?;

    for kind in ErrorKind::ALL {
        constant(env, kind.constant_name(), Value::integer(kind.index()))?;
    }

    for name in PRESENT {
        constant(env, name, Value::boolean(true))?;
    }
    for name in ABSENT {
        constant(env, name, Value::boolean(false))?;
    }
    Ok(())
}
