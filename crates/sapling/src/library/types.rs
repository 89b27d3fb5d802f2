//! Memoized library type descriptors and `TypeOf`

use std::sync::{Arc, OnceLock};

use crate::error::{Result, RuntimeError};
use crate::value::{ArrayType, StructureType, TypeDescriptor, Value, ValueData};

/// Structure descriptors the library exposes, built once per runtime on
/// first use and shared afterwards.
#[derive(Default)]
pub struct TypeRegistry {
    error_t: OnceLock<Arc<TypeDescriptor>>,
    version_t: OnceLock<Arc<TypeDescriptor>>,
}

impl TypeRegistry {
    /// `ErrorT { Location: String, Message: String }`.
    pub fn error_t(&self) -> Arc<TypeDescriptor> {
        Arc::clone(self.error_t.get_or_init(|| {
            structure(
                "ErrorT",
                &[
                    ("Location", TypeDescriptor::String),
                    ("Message", TypeDescriptor::String),
                ],
            )
        }))
    }

    /// `VersionT { Major: Integer, Minor: Integer, Patch: Integer }`.
    pub fn version_t(&self) -> Arc<TypeDescriptor> {
        Arc::clone(self.version_t.get_or_init(|| {
            structure(
                "VersionT",
                &[
                    ("Major", TypeDescriptor::Integer),
                    ("Minor", TypeDescriptor::Integer),
                    ("Patch", TypeDescriptor::Integer),
                ],
            )
        }))
    }
}

fn structure(name: &str, members: &[(&str, TypeDescriptor)]) -> Arc<TypeDescriptor> {
    let mut ty = StructureType::named(name);
    for (member, member_ty) in members {
        // Member names above are distinct.
        let _ = ty.add(*member, Arc::new(member_ty.clone()));
    }
    Arc::new(TypeDescriptor::structure(ty))
}

/// The type descriptor describing `value`.
///
/// Null and Executables have no descriptor and yield Null; a type value is
/// its own type.
pub fn type_of(value: &Value) -> Result<Value> {
    if value.is_type() {
        return Ok(value.clone());
    }
    match describe(value)? {
        Some(ty) => Ok(Value::shared_type(ty)),
        None => Ok(Value::null()),
    }
}

fn describe(value: &Value) -> Result<Option<Arc<TypeDescriptor>>> {
    enum Shape {
        Ready(Option<TypeDescriptor>),
        Array {
            start: crate::value::Integer,
            finish: crate::value::Integer,
            element: Option<Arc<TypeDescriptor>>,
            first: Option<Value>,
            policy: crate::value::RangePolicy,
        },
        Structure(Vec<(String, Value)>),
        Declared(Arc<TypeDescriptor>),
    }

    let shape = value.with_data(|data| match data {
        ValueData::Null | ValueData::Executable(_) => Shape::Ready(None),
        ValueData::Type(ty) => Shape::Declared(Arc::clone(ty)),
        ValueData::Boolean(_) => Shape::Ready(Some(TypeDescriptor::Boolean)),
        ValueData::Integer { bounds, .. } => Shape::Ready(Some(match bounds {
            Some(b) => TypeDescriptor::RangedInteger(*b),
            None => TypeDescriptor::Integer,
        })),
        ValueData::Real { bounds, .. } => Shape::Ready(Some(match bounds {
            Some(b) => TypeDescriptor::RangedReal(*b),
            None => TypeDescriptor::Real,
        })),
        ValueData::String(_) => Shape::Ready(Some(TypeDescriptor::String)),
        ValueData::Dictionary(_) => Shape::Ready(Some(TypeDescriptor::Dictionary)),
        ValueData::Array(array) => Shape::Array {
            start: array.start(),
            finish: array.finish(),
            element: array.element_type().cloned(),
            first: array.items().first().cloned(),
            policy: array.policy(),
        },
        ValueData::Structure(s) => match s.structure_type() {
            Some(ty) => Shape::Declared(Arc::new(TypeDescriptor::Structure(Arc::clone(ty)))),
            None => Shape::Structure(
                s.iter()
                    .map(|(name, member)| (name.clone(), member.clone()))
                    .collect(),
            ),
        },
    });

    Ok(match shape {
        Shape::Ready(ty) => ty.map(Arc::new),
        Shape::Declared(ty) => Some(ty),
        Shape::Array {
            start,
            finish,
            element,
            first,
            policy,
        } => {
            let element = match (element, first) {
                (Some(ty), _) => ty,
                (None, Some(first)) => describe(&first)?
                    .unwrap_or_else(|| Arc::new(TypeDescriptor::Null)),
                (None, None) => Arc::new(TypeDescriptor::Null),
            };
            Some(Arc::new(TypeDescriptor::Array(ArrayType::new(
                start, finish, element, policy,
            )?)))
        }
        Shape::Structure(members) => {
            let mut ty = StructureType::new();
            for (name, member) in members {
                let member_ty = describe(&member)?.ok_or_else(|| {
                    RuntimeError::illegal_cast(format!(
                        "The member '{name}' has no describable type."
                    ))
                })?;
                ty.add(name, member_ty)?;
            }
            Some(Arc::new(TypeDescriptor::structure(ty)))
        }
    })
}
