//! Type descriptors: schema values that declare fresh instances

use std::cmp::Ordering;
use std::sync::Arc;

use indexmap::IndexMap;

use super::{
    ArrayData, DictionaryData, Integer, RangePolicy, Real, StructureData, Value, ValueData,
    ValueKind,
};
use crate::error::{Result, RuntimeError};

/// An inclusive range constraint with an out-of-range policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds<T> {
    /// Smallest allowed value
    pub min: T,
    /// Largest allowed value
    pub max: T,
    /// What to do with values outside `[min, max]`
    pub policy: RangePolicy,
}

impl<T: PartialOrd + Copy + std::fmt::Display> Bounds<T> {
    /// Build a constraint; `min` must not exceed `max`, and both must be
    /// ordered.
    pub fn new(min: T, max: T, policy: RangePolicy) -> Result<Self> {
        if !matches!(min.partial_cmp(&max), Some(Ordering::Less | Ordering::Equal)) {
            return Err(RuntimeError::illegal_value(format!(
                "The range minimum, {min}, exceeds the maximum, {max}."
            )));
        }
        Ok(Self { min, max, policy })
    }

    fn out_of_range(&self, value: T) -> RuntimeError {
        RuntimeError::illegal_value(format!(
            "The value assigned, {value}, does not fall within the allowable range [{}, {}].",
            self.min, self.max
        ))
    }
}

impl Bounds<Integer> {
    /// Bring `value` into range according to the policy.
    pub fn apply(&self, value: Integer) -> Result<Integer> {
        if (self.min..=self.max).contains(&value) {
            return Ok(value);
        }
        match self.policy {
            RangePolicy::Error => Err(self.out_of_range(value)),
            RangePolicy::Cap => Ok(value.clamp(self.min, self.max)),
            RangePolicy::Rollover => {
                let width = i128::from(self.max) - i128::from(self.min) + 1;
                let offset = (i128::from(value) - i128::from(self.min)).rem_euclid(width);
                Ok((i128::from(self.min) + offset) as Integer)
            }
        }
    }
}

impl Bounds<Real> {
    /// Bring `value` into range according to the policy. NaN is never in
    /// range and no policy can place it.
    pub fn apply(&self, value: Real) -> Result<Real> {
        if value.is_nan() {
            return Err(self.out_of_range(value));
        }
        if (self.min..=self.max).contains(&value) {
            return Ok(value);
        }
        match self.policy {
            RangePolicy::Error => Err(self.out_of_range(value)),
            RangePolicy::Cap => Ok(value.clamp(self.min, self.max)),
            RangePolicy::Rollover => {
                let width = self.max - self.min;
                if width <= 0.0 || !value.is_finite() {
                    return Ok(self.min);
                }
                Ok(self.min + (value - self.min).rem_euclid(width))
            }
        }
    }
}

/// Schema of an array: index range, element type, and range policy.
#[derive(Debug, Clone)]
pub struct ArrayType {
    /// First index
    pub start: Integer,
    /// Last index (`start - 1` for an empty array)
    pub finish: Integer,
    /// Type of every element
    pub element: Arc<TypeDescriptor>,
    /// Out-of-range access policy
    pub policy: RangePolicy,
}

impl ArrayType {
    /// Build an array schema over `[start, finish]`.
    pub fn new(
        start: Integer,
        finish: Integer,
        element: Arc<TypeDescriptor>,
        policy: RangePolicy,
    ) -> Result<Self> {
        if i128::from(finish) < i128::from(start) - 1 {
            return Err(RuntimeError::range(format!(
                "The array range [{start}, {finish}] is inverted."
            )));
        }
        Ok(Self {
            start,
            finish,
            element,
            policy,
        })
    }

    /// Number of elements a declaration produces.
    pub fn len(&self) -> usize {
        (i128::from(self.finish) - i128::from(self.start) + 1) as usize
    }

    /// Whether a declaration produces an empty array.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Schema of a structure: an ordered set of named, typed members.
#[derive(Debug, Clone, Default)]
pub struct StructureType {
    name: Option<String>,
    members: IndexMap<String, Arc<TypeDescriptor>>,
}

impl StructureType {
    /// An anonymous structure type with no members.
    pub fn new() -> Self {
        Self::default()
    }

    /// A named structure type with no members.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            members: IndexMap::new(),
        }
    }

    /// Declare a member; names must be unique.
    pub fn add(&mut self, name: impl Into<String>, ty: Arc<TypeDescriptor>) -> Result<()> {
        let name = name.into();
        if self.members.contains_key(&name) {
            return Err(RuntimeError::duplicate_symbol(format!(
                "Duplicate structure member id: '{name}'."
            )));
        }
        self.members.insert(name, ty);
        Ok(())
    }

    /// Builder form of [`StructureType::add`].
    pub fn with(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Result<Self> {
        self.add(name, Arc::new(ty))?;
        Ok(self)
    }

    /// The type's name, if it has one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Declared members in order.
    pub fn members(&self) -> impl Iterator<Item = (&String, &Arc<TypeDescriptor>)> {
        self.members.iter()
    }

    /// Whether `name` is a declared member.
    pub fn has_member(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }
}

/// A schema value whose `declare` produces fresh default instances.
#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    /// Null
    Null,
    /// Boolean, default `false`
    Boolean,
    /// Integer, default `0`
    Integer,
    /// Integer constrained to a range
    RangedInteger(Bounds<Integer>),
    /// Real, default `0.0`
    Real,
    /// Real constrained to a range
    RangedReal(Bounds<Real>),
    /// String, default empty
    String,
    /// Array over a fixed index range
    Array(ArrayType),
    /// Dictionary, default empty
    Dictionary,
    /// Structure with declared members
    Structure(Arc<StructureType>),
}

impl TypeDescriptor {
    /// The kind of value `declare` produces.
    pub fn kind(&self) -> ValueKind {
        match self {
            TypeDescriptor::Null => ValueKind::Null,
            TypeDescriptor::Boolean => ValueKind::Boolean,
            TypeDescriptor::Integer | TypeDescriptor::RangedInteger(_) => ValueKind::Integer,
            TypeDescriptor::Real | TypeDescriptor::RangedReal(_) => ValueKind::Real,
            TypeDescriptor::String => ValueKind::String,
            TypeDescriptor::Array(_) => ValueKind::Array,
            TypeDescriptor::Dictionary => ValueKind::Dictionary,
            TypeDescriptor::Structure(_) => ValueKind::Structure,
        }
    }

    /// Shorthand for an array schema.
    pub fn array(
        start: Integer,
        finish: Integer,
        element: TypeDescriptor,
        policy: RangePolicy,
    ) -> Result<Self> {
        Ok(TypeDescriptor::Array(ArrayType::new(
            start,
            finish,
            Arc::new(element),
            policy,
        )?))
    }

    /// Shorthand for a structure schema.
    pub fn structure(ty: StructureType) -> Self {
        TypeDescriptor::Structure(Arc::new(ty))
    }

    /// Produce a fresh, unlocked, default-initialized instance.
    pub fn declare(&self) -> Value {
        let data = match self {
            TypeDescriptor::Null => ValueData::Null,
            TypeDescriptor::Boolean => ValueData::Boolean(false),
            TypeDescriptor::Integer => ValueData::Integer {
                value: 0,
                bounds: None,
            },
            TypeDescriptor::RangedInteger(bounds) => ValueData::Integer {
                value: if (bounds.min..=bounds.max).contains(&0) {
                    0
                } else {
                    bounds.min
                },
                bounds: Some(*bounds),
            },
            TypeDescriptor::Real => ValueData::Real {
                value: 0.0,
                bounds: None,
            },
            TypeDescriptor::RangedReal(bounds) => ValueData::Real {
                value: if (bounds.min..=bounds.max).contains(&0.0) {
                    0.0
                } else {
                    bounds.min
                },
                bounds: Some(*bounds),
            },
            TypeDescriptor::String => ValueData::String(String::new()),
            TypeDescriptor::Array(ty) => {
                let slots = (0..ty.len()).map(|_| ty.element.declare()).collect();
                ValueData::Array(ArrayData::declared(
                    ty.start,
                    slots,
                    Arc::clone(&ty.element),
                    ty.policy,
                ))
            }
            TypeDescriptor::Dictionary => ValueData::Dictionary(DictionaryData::new()),
            TypeDescriptor::Structure(ty) => {
                let members = ty
                    .members()
                    .map(|(name, member)| (name.clone(), member.declare()))
                    .collect();
                ValueData::Structure(StructureData::declared(Arc::clone(ty), members))
            }
        };
        Value::from_data(data)
    }
}

impl std::fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeDescriptor::RangedInteger(b) => write!(f, "Integer [{}, {}]", b.min, b.max),
            TypeDescriptor::RangedReal(b) => write!(f, "Real [{}, {}]", b.min, b.max),
            TypeDescriptor::Array(ty) => {
                write!(f, "Array [{}, {}] of {}", ty.start, ty.finish, ty.element)
            }
            TypeDescriptor::Structure(ty) => {
                if let Some(name) = ty.name() {
                    return f.write_str(name);
                }
                f.write_str("Structure {")?;
                for (i, (name, member)) in ty.members().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, " {name}: {member}")?;
                }
                f.write_str(" }")
            }
            other => f.write_str(other.kind().name()),
        }
    }
}
