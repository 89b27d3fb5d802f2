//! Coercions between the scalar types

use super::numeric::{self, format_real, parse_integer_prefix, parse_real_prefix};
use super::{Integer, Real, Value, ValueData, ValueKind};
use crate::error::{Result, RuntimeError};

impl Value {
    /// Coerce to Boolean.
    ///
    /// Numbers are true when non-zero (epsilon-aware for Reals). Strings must
    /// spell `true` or `false`, ignoring case.
    pub fn as_boolean(&self) -> Result<bool> {
        self.with_data(|data| match data {
            ValueData::Boolean(b) => Ok(*b),
            ValueData::Integer { value, .. } => Ok(*value != 0),
            ValueData::Real { value, .. } => Ok(!numeric::real_is_zero(*value)),
            ValueData::String(s) => {
                if s.eq_ignore_ascii_case("true") {
                    Ok(true)
                } else if s.eq_ignore_ascii_case("false") {
                    Ok(false)
                } else {
                    Err(RuntimeError::illegal_cast(format!(
                        "Cannot parse a boolean value from the string \"{s}\"."
                    )))
                }
            }
            other => Err(RuntimeError::cannot_cast(other.kind().name(), "Boolean")),
        })
    }

    /// Coerce to Integer.
    ///
    /// Reals truncate toward zero; strings parse their leading integer.
    pub fn as_integer(&self) -> Result<Integer> {
        self.with_data(|data| match data {
            ValueData::Boolean(b) => Ok(Integer::from(*b)),
            ValueData::Integer { value, .. } => Ok(*value),
            ValueData::Real { value, .. } => real_to_integer(*value),
            ValueData::String(s) => parse_integer_prefix(s).ok_or_else(|| {
                RuntimeError::illegal_cast(format!(
                    "Cannot parse an integer value from the string \"{s}\"."
                ))
            }),
            other => Err(RuntimeError::cannot_cast(other.kind().name(), "Integer")),
        })
    }

    /// Coerce to Real.
    pub fn as_real(&self) -> Result<Real> {
        self.with_data(|data| match data {
            ValueData::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
            ValueData::Integer { value, .. } => Ok(*value as Real),
            ValueData::Real { value, .. } => Ok(*value),
            ValueData::String(s) => parse_real_prefix(s).ok_or_else(|| {
                RuntimeError::illegal_cast(format!(
                    "Cannot parse a real value from the string \"{s}\"."
                ))
            }),
            other => Err(RuntimeError::cannot_cast(other.kind().name(), "Real")),
        })
    }

    /// Coerce to String.
    pub fn as_string(&self) -> Result<String> {
        self.with_data(|data| match data {
            ValueData::Boolean(true) => Ok("True".to_string()),
            ValueData::Boolean(false) => Ok("False".to_string()),
            ValueData::Integer { value, .. } => Ok(value.to_string()),
            ValueData::Real { value, .. } => Ok(format_real(*value)),
            ValueData::String(s) => Ok(s.clone()),
            other => Err(RuntimeError::cannot_cast(other.kind().name(), "String")),
        })
    }

    /// Coerce a scalar into a fresh value of kind `target`, or an array of
    /// scalars element-wise into a fresh array with the same range.
    ///
    /// Fails without a partial result if any element is not convertible.
    pub fn cast(&self, target: ValueKind) -> Result<Value> {
        if let Some((start, items)) = self.array_snapshot() {
            let converted = items
                .iter()
                .map(|item| {
                    if item.is_array() {
                        Err(RuntimeError::cannot_cast("Array", target.name()))
                    } else {
                        item.cast(target)
                    }
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok(Value::array(start, converted));
        }

        match target {
            ValueKind::Boolean => Ok(Value::boolean(self.as_boolean()?)),
            ValueKind::Integer => Ok(Value::integer(self.as_integer()?)),
            ValueKind::Real => Ok(Value::real(self.as_real()?)),
            ValueKind::String => Ok(Value::string(self.as_string()?)),
            other => Err(RuntimeError::cannot_cast(self.kind().name(), other.name())),
        }
    }

    fn array_snapshot(&self) -> Option<(Integer, Vec<Value>)> {
        self.with_data(|data| match data {
            ValueData::Array(array) => Some((array.start(), array.items().to_vec())),
            _ => None,
        })
    }
}

fn real_to_integer(value: Real) -> Result<Integer> {
    let truncated = value.trunc();
    if !truncated.is_finite()
        || truncated < Integer::MIN as Real
        || truncated >= -(Integer::MIN as Real)
    {
        return Err(RuntimeError::illegal_cast(format!(
            "The real value {} cannot be represented as an integer.",
            format_real(value)
        )));
    }
    Ok(truncated as Integer)
}

/// Interpret a string as Integer or Real by its shape: an optional `-`,
/// digits, and a `.` after the digits selects Real.
pub fn string_as_numeric(text: &str) -> Result<Value> {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let digits = unsigned.bytes().take_while(u8::is_ascii_digit).count();
    let source = Value::string(text);
    if unsigned.as_bytes().get(digits) == Some(&b'.') {
        Ok(Value::real(source.as_real()?))
    } else {
        Ok(Value::integer(source.as_integer()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_boolean_conversions() {
        let t = Value::boolean(true);
        assert_eq!(t.as_integer().unwrap(), 1);
        assert_eq!(t.as_real().unwrap(), 1.0);
        assert_eq!(t.as_string().unwrap(), "True");
        assert_eq!(Value::boolean(false).as_string().unwrap(), "False");
    }

    #[test]
    fn test_string_to_boolean() {
        assert!(Value::string("TRUE").as_boolean().unwrap());
        assert!(!Value::string("False").as_boolean().unwrap());
        let err = Value::string("yes").as_boolean().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalCast);
    }

    #[test]
    fn test_numeric_conversions() {
        assert_eq!(Value::real(-3.9).as_integer().unwrap(), -3);
        assert!(Value::real(0.5).as_boolean().unwrap());
        assert!(!Value::real(1e-300).as_boolean().unwrap());
        assert_eq!(Value::integer(42).as_string().unwrap(), "42");
        assert_eq!(Value::real(2.5).as_string().unwrap(), "2.5");
    }

    #[test]
    fn test_non_finite_real_to_integer_fails() {
        let err = Value::real(Real::NAN).as_integer().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalCast);
        assert!(Value::real(Real::INFINITY).as_integer().is_err());
    }

    #[test]
    fn test_string_to_numbers() {
        assert_eq!(Value::string("12abc").as_integer().unwrap(), 12);
        assert_eq!(Value::string(" 2.5e1").as_real().unwrap(), 25.0);
        assert_eq!(
            Value::string("abc").as_integer().unwrap_err().to_string(),
            "Cannot parse an integer value from the string \"abc\"."
        );
    }

    #[test]
    fn test_containers_do_not_coerce() {
        let array = Value::array(0, vec![]);
        assert_eq!(array.as_string().unwrap_err().kind(), ErrorKind::IllegalCast);
        assert_eq!(
            Value::dictionary().as_integer().unwrap_err().kind(),
            ErrorKind::IllegalCast
        );
    }

    #[test]
    fn test_elementwise_cast() {
        let array = Value::array(1, vec![Value::string("1"), Value::real(2.7)]);
        let ints = array.cast(ValueKind::Integer).unwrap();
        assert_eq!(ints.element_at(1).unwrap().as_integer().unwrap(), 1);
        assert_eq!(ints.element_at(2).unwrap().as_integer().unwrap(), 2);

        let bad = Value::array(1, vec![Value::integer(1), Value::string("x")]);
        assert!(bad.cast(ValueKind::Integer).is_err());
    }

    #[test]
    fn test_string_as_numeric() {
        assert!(string_as_numeric("42").unwrap().is_integer());
        assert!(string_as_numeric("-4.5").unwrap().is_real());
        assert_eq!(string_as_numeric("-4.5").unwrap().as_real().unwrap(), -4.5);
        assert!(string_as_numeric("").is_err());
    }
}
