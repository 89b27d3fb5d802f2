//! Random routines over the runtime's deterministic stream

use super::{by_ref, define};
use crate::environment::Environment;
use crate::error::Result;
use crate::value::Value;

pub(super) fn install(env: &Environment) -> Result<()> {
    define(env, "RandomSeed", by_ref(&["seed"]), |rt| {
        let seed = rt.param("seed")?.as_integer()?;
        rt.rng_mut().reseed(seed as u64);
        Ok(Value::null())
    })?;

    define(env, "RandomBoolean", Vec::new(), |rt| {
        Ok(Value::boolean(rt.rng_mut().boolean()))
    })?;

    define(env, "RandomInteger", Vec::new(), |rt| {
        Ok(Value::integer(rt.rng_mut().integer()))
    })?;
    define(env, "RandomInteger", by_ref(&["max"]), |rt| {
        let max = rt.param("max")?.as_integer()?;
        Ok(Value::integer(rt.rng_mut().integer_below(max)?))
    })?;
    define(env, "RandomInteger", by_ref(&["min", "max"]), |rt| {
        let min = rt.param("min")?.as_integer()?;
        let max = rt.param("max")?.as_integer()?;
        Ok(Value::integer(rt.rng_mut().integer_between(min, max)?))
    })?;

    define(env, "RandomReal", Vec::new(), |rt| {
        Ok(Value::real(rt.rng_mut().real()))
    })?;
    define(env, "RandomReal", by_ref(&["max"]), |rt| {
        let max = rt.param("max")?.as_real()?;
        Ok(Value::real(rt.rng_mut().real_between(0.0, max)))
    })?;
    define(env, "RandomReal", by_ref(&["min", "max"]), |rt| {
        let min = rt.param("min")?.as_real()?;
        let max = rt.param("max")?.as_real()?;
        Ok(Value::real(rt.rng_mut().real_between(min, max)))
    })
}
