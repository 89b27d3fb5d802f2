//! Value trait implementations: constructors, predicates, From traits, PartialEq

use std::sync::Arc;

use indexmap::IndexMap;

use super::*;

// ═══════════════════════════════════════════════════════════════════
// Convenience Constructors
// ═══════════════════════════════════════════════════════════════════

impl Value {
    /// A locked Null.
    pub fn null() -> Self {
        Value::locked_from_data(ValueData::Null)
    }

    /// An unlocked Null that adopts whatever is first assigned to it.
    pub fn placeholder() -> Self {
        Value::from_data(ValueData::Null)
    }

    /// Create a boolean value
    pub fn boolean(b: bool) -> Self {
        Value::from_data(ValueData::Boolean(b))
    }

    /// Create an integer value
    pub fn integer(i: Integer) -> Self {
        Value::from_data(ValueData::Integer {
            value: i,
            bounds: None,
        })
    }

    /// Create a real value
    pub fn real(r: Real) -> Self {
        Value::from_data(ValueData::Real {
            value: r,
            bounds: None,
        })
    }

    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::from_data(ValueData::String(s.into()))
    }

    /// Create an array indexed from `start`
    pub fn array(start: Integer, items: Vec<Value>) -> Self {
        Value::from_data(ValueData::Array(ArrayData::new(start, items)))
    }

    /// Create an array payload value directly
    pub fn from_array(array: ArrayData) -> Self {
        Value::from_data(ValueData::Array(array))
    }

    /// Create an empty dictionary
    pub fn dictionary() -> Self {
        Value::from_data(ValueData::Dictionary(DictionaryData::new()))
    }

    /// Create an untyped structure from name/value pairs
    pub fn structure<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let members: IndexMap<String, Value> =
            members.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Value::from_data(ValueData::Structure(StructureData::new(members)))
    }

    /// Create a type-descriptor value
    pub fn type_descriptor(ty: TypeDescriptor) -> Self {
        Value::from_data(ValueData::Type(Arc::new(ty)))
    }

    /// Create a type-descriptor value from a shared descriptor
    pub fn shared_type(ty: Arc<TypeDescriptor>) -> Self {
        Value::from_data(ValueData::Type(ty))
    }

    /// Create an executable holding one callable
    pub fn executable(callable: Callable) -> Self {
        Value::from_data(ValueData::Executable(ExecutableData::new(callable)))
    }

    /// Declare a callable and wrap it as an executable value
    pub fn function(
        name: impl Into<String>,
        params: Vec<Param>,
        body: impl Fn(&mut crate::Runtime) -> crate::Result<Value> + Send + Sync + 'static,
    ) -> crate::Result<Self> {
        Ok(Value::executable(Callable::new(name, params, body)?))
    }

    /// Lock this value and return it (builder form)
    pub fn locked(self) -> Self {
        self.lock();
        self
    }
}

// ═══════════════════════════════════════════════════════════════════
// Type Predicates
// ═══════════════════════════════════════════════════════════════════

impl Value {
    /// Check if value is Null
    pub fn is_null(&self) -> bool {
        self.kind() == ValueKind::Null
    }

    /// Check if value is a type descriptor
    pub fn is_type(&self) -> bool {
        self.kind() == ValueKind::Type
    }

    /// Check if value is a boolean
    pub fn is_boolean(&self) -> bool {
        self.kind() == ValueKind::Boolean
    }

    /// Check if value is an integer
    pub fn is_integer(&self) -> bool {
        self.kind() == ValueKind::Integer
    }

    /// Check if value is a real
    pub fn is_real(&self) -> bool {
        self.kind() == ValueKind::Real
    }

    /// Check if value is a string
    pub fn is_string(&self) -> bool {
        self.kind() == ValueKind::String
    }

    /// Check if value is an array
    pub fn is_array(&self) -> bool {
        self.kind() == ValueKind::Array
    }

    /// Check if value is a dictionary
    pub fn is_dictionary(&self) -> bool {
        self.kind() == ValueKind::Dictionary
    }

    /// Check if value is a structure
    pub fn is_structure(&self) -> bool {
        self.kind() == ValueKind::Structure
    }

    /// Check if value is callable
    pub fn is_executable(&self) -> bool {
        self.kind() == ValueKind::Executable
    }

    /// Check if value is a scalar
    pub fn is_scalar(&self) -> bool {
        self.kind().is_scalar()
    }
}

// ═══════════════════════════════════════════════════════════════════
// Extractors
// ═══════════════════════════════════════════════════════════════════

impl Value {
    /// The type descriptor, if this is a type value
    pub fn as_type(&self) -> Option<Arc<TypeDescriptor>> {
        self.with_data(|data| match data {
            ValueData::Type(ty) => Some(Arc::clone(ty)),
            _ => None,
        })
    }

    /// The callable for `arity`, if this is an executable with that overload
    pub fn callable(&self, arity: usize) -> Option<Arc<Callable>> {
        self.with_data(|data| match data {
            ValueData::Executable(exe) => exe.get(arity).cloned(),
            _ => None,
        })
    }

    /// Registered arities, if this is an executable
    pub fn arities(&self) -> Vec<usize> {
        self.with_data(|data| match data {
            ValueData::Executable(exe) => exe.arities().collect(),
            _ => Vec::new(),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════
// From Implementations
// ═══════════════════════════════════════════════════════════════════

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::boolean(b)
    }
}

impl From<Integer> for Value {
    fn from(i: Integer) -> Self {
        Value::integer(i)
    }
}

impl From<Real> for Value {
    fn from(r: Real) -> Self {
        Value::real(r)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<TypeDescriptor> for Value {
    fn from(ty: TypeDescriptor) -> Self {
        Value::type_descriptor(ty)
    }
}

// ═══════════════════════════════════════════════════════════════════
// PartialEq
// ═══════════════════════════════════════════════════════════════════

impl PartialEq for Value {
    /// Structural equality; Reals compare epsilon-aware, executables by
    /// identity of their callables.
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let lhs = self.read();
        let rhs = other.read();
        data_eq(&lhs.data, &rhs.data)
    }
}

fn data_eq(lhs: &ValueData, rhs: &ValueData) -> bool {
    match (lhs, rhs) {
        (ValueData::Null, ValueData::Null) => true,
        (ValueData::Type(a), ValueData::Type(b)) => {
            Arc::ptr_eq(a, b) || a.to_string() == b.to_string()
        }
        (ValueData::Boolean(a), ValueData::Boolean(b)) => a == b,
        (ValueData::Integer { value: a, .. }, ValueData::Integer { value: b, .. }) => a == b,
        (ValueData::Real { value: a, .. }, ValueData::Real { value: b, .. }) => {
            numeric::real_equal(*a, *b)
        }
        (ValueData::String(a), ValueData::String(b)) => a == b,
        (ValueData::Array(a), ValueData::Array(b)) => {
            a.start() == b.start() && a.items() == b.items()
        }
        (ValueData::Dictionary(a), ValueData::Dictionary(b)) => {
            a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v))
        }
        (ValueData::Structure(a), ValueData::Structure(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|((ka, va), (kb, vb))| ka == kb && va == vb)
        }
        (ValueData::Executable(a), ValueData::Executable(b)) => {
            a.arities().eq(b.arities())
                && a.callables()
                    .zip(b.callables())
                    .all(|(x, y)| Arc::ptr_eq(x, y))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_null_is_locked_placeholder_is_not() {
        assert!(Value::null().is_locked());
        assert!(!Value::placeholder().is_locked());
        assert!(Value::placeholder().is_null());
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(Value::integer(3), Value::integer(3));
        assert_eq!(Value::real(0.1 + 0.2), Value::real(0.3));
        assert_ne!(Value::integer(3), Value::real(3.0));
        assert_eq!(
            Value::array(1, vec![Value::integer(1)]),
            Value::array(1, vec![Value::integer(1)])
        );
        assert_ne!(
            Value::array(0, vec![Value::integer(1)]),
            Value::array(1, vec![Value::integer(1)])
        );
    }

    #[test]
    fn test_from_impls() {
        assert!(Value::from(true).is_boolean());
        assert!(Value::from(7 as Integer).is_integer());
        assert!(Value::from("hi").is_string());
    }
}
