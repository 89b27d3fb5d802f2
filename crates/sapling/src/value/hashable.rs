//! Hashable dictionary keys derived from scalar values

use std::hash::{Hash, Hasher};

use super::{numeric, Integer, Real, Value, ValueData};
use crate::error::{Result, RuntimeError};

/// A dictionary key.
///
/// Only scalars can be keys. Reals compare by bit pattern (with `-0.0`
/// folded into `0.0`) so that hashing and equality agree.
#[derive(Debug, Clone)]
pub enum DictKey {
    /// Boolean key
    Boolean(bool),
    /// Integer key
    Integer(Integer),
    /// Real key
    Real(Real),
    /// String key
    String(String),
}

impl DictKey {
    /// Derive a key from a scalar value.
    pub fn from_value(value: &Value) -> Result<Self> {
        value.with_data(|data| match data {
            ValueData::Boolean(b) => Ok(DictKey::Boolean(*b)),
            ValueData::Integer { value, .. } => Ok(DictKey::Integer(*value)),
            ValueData::Real { value, .. } => Ok(DictKey::Real(*value)),
            ValueData::String(s) => Ok(DictKey::String(s.clone())),
            other => Err(RuntimeError::illegal_cast(format!(
                "A value of type {} cannot be used as a dictionary key.",
                other.kind()
            ))),
        })
    }

    /// A fresh unlocked value equal to this key.
    pub fn to_value(&self) -> Value {
        match self {
            DictKey::Boolean(b) => Value::boolean(*b),
            DictKey::Integer(i) => Value::integer(*i),
            DictKey::Real(r) => Value::real(*r),
            DictKey::String(s) => Value::string(s.clone()),
        }
    }

    fn real_bits(value: Real) -> impl Hash + PartialEq {
        // -0.0 + 0.0 == +0.0
        (value + 0.0).to_bits()
    }
}

impl Hash for DictKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            DictKey::Boolean(b) => b.hash(state),
            DictKey::Integer(i) => i.hash(state),
            DictKey::Real(r) => Self::real_bits(*r).hash(state),
            DictKey::String(s) => s.hash(state),
        }
    }
}

impl PartialEq for DictKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DictKey::Boolean(a), DictKey::Boolean(b)) => a == b,
            (DictKey::Integer(a), DictKey::Integer(b)) => a == b,
            (DictKey::Real(a), DictKey::Real(b)) => Self::real_bits(*a) == Self::real_bits(*b),
            (DictKey::String(a), DictKey::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for DictKey {}

impl std::fmt::Display for DictKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DictKey::Boolean(true) => f.write_str("True"),
            DictKey::Boolean(false) => f.write_str("False"),
            DictKey::Integer(i) => write!(f, "{i}"),
            DictKey::Real(r) => f.write_str(&numeric::format_real(*r)),
            DictKey::String(s) => write!(f, "\"{s}\""),
        }
    }
}
