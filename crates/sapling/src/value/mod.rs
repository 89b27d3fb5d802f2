//! Value representation for runtime values

mod callable;
mod compound;
mod convert;
mod display;
mod hashable;
mod impls;
pub mod numeric;
mod ops;
mod types;

pub use callable::{BindingMode, BuiltinFnPtr, Callable, ExecutableData, Param};
pub use compound::{ArrayData, DictionaryData, RangePolicy, StructureData};
pub use convert::string_as_numeric;
pub use hashable::DictKey;
pub use numeric::{Integer, Real};
pub use types::{ArrayType, Bounds, StructureType, TypeDescriptor};

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Result, RuntimeError};

/// A shared handle to a runtime value.
///
/// Cloning a `Value` aliases it: every holder (container slot, symbol-table
/// entry, stack frame) sees the same cell, and `assign` through any alias is
/// visible through all of them. Use [`Value::copy`] or [`Value::duplicate`]
/// for independent values.
#[derive(Clone)]
pub struct Value(Arc<RwLock<Cell>>);

/// The storage behind a [`Value`] handle.
pub(crate) struct Cell {
    pub(crate) locked: bool,
    pub(crate) data: ValueData,
}

/// The variant payload of a value.
pub enum ValueData {
    // ═══════════════════════════════════════════════════════════════════
    // Scalars
    // ═══════════════════════════════════════════════════════════════════
    /// The absence of a value
    Null,

    /// A schema value; `declare` produces instances
    Type(Arc<TypeDescriptor>),

    /// Boolean scalar
    Boolean(bool),

    /// Integer scalar, optionally constrained to a range
    Integer {
        /// Current value
        value: Integer,
        /// Range constraint from a ranged type declaration
        bounds: Option<Bounds<Integer>>,
    },

    /// Real scalar, optionally constrained to a range
    Real {
        /// Current value
        value: Real,
        /// Range constraint from a ranged type declaration
        bounds: Option<Bounds<Real>>,
    },

    /// String scalar
    String(String),

    // ═══════════════════════════════════════════════════════════════════
    // Containers
    // ═══════════════════════════════════════════════════════════════════
    /// Ordered sequence with an inclusive index range
    Array(ArrayData),

    /// Key to value mapping
    Dictionary(DictionaryData),

    /// Closed set of named members
    Structure(StructureData),

    // ═══════════════════════════════════════════════════════════════════
    // Callables
    // ═══════════════════════════════════════════════════════════════════
    /// Overload set of callables keyed by arity
    Executable(ExecutableData),
}

/// The discriminant of a value, with stable type-id codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `Null`
    Null = 0,
    /// `Type`
    Type = 1,
    /// `Boolean`
    Boolean = 2,
    /// `Integer`
    Integer = 3,
    /// `Real`
    Real = 4,
    /// `String`
    String = 5,
    /// `Array`
    Array = 6,
    /// `Dictionary`
    Dictionary = 7,
    /// `Structure`
    Structure = 8,
    /// `Executable`
    Executable = 9,
}

impl ValueKind {
    /// Every kind, ordered by type id.
    pub const ALL: [ValueKind; 10] = [
        ValueKind::Null,
        ValueKind::Type,
        ValueKind::Boolean,
        ValueKind::Integer,
        ValueKind::Real,
        ValueKind::String,
        ValueKind::Array,
        ValueKind::Dictionary,
        ValueKind::Structure,
        ValueKind::Executable,
    ];

    /// The stable type-id code.
    pub fn type_id(self) -> Integer {
        self as Integer
    }

    /// The type name shown to scripts.
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Null => "Null",
            ValueKind::Type => "Type",
            ValueKind::Boolean => "Boolean",
            ValueKind::Integer => "Integer",
            ValueKind::Real => "Real",
            ValueKind::String => "String",
            ValueKind::Array => "Array",
            ValueKind::Dictionary => "Dictionary",
            ValueKind::Structure => "Structure",
            ValueKind::Executable => "Executable",
        }
    }

    /// Whether values of this kind are scalars.
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            ValueKind::Boolean | ValueKind::Integer | ValueKind::Real | ValueKind::String
        )
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl ValueData {
    /// The discriminant of this payload.
    pub fn kind(&self) -> ValueKind {
        match self {
            ValueData::Null => ValueKind::Null,
            ValueData::Type(_) => ValueKind::Type,
            ValueData::Boolean(_) => ValueKind::Boolean,
            ValueData::Integer { .. } => ValueKind::Integer,
            ValueData::Real { .. } => ValueKind::Real,
            ValueData::String(_) => ValueKind::String,
            ValueData::Array(_) => ValueKind::Array,
            ValueData::Dictionary(_) => ValueKind::Dictionary,
            ValueData::Structure(_) => ValueKind::Structure,
            ValueData::Executable(_) => ValueKind::Executable,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Cell Access
// ═══════════════════════════════════════════════════════════════════════

impl Value {
    /// Wrap a payload in a fresh, unlocked cell.
    pub fn from_data(data: ValueData) -> Self {
        Value(Arc::new(RwLock::new(Cell {
            locked: false,
            data,
        })))
    }

    /// Wrap a payload in a fresh, locked cell.
    pub fn locked_from_data(data: ValueData) -> Self {
        Value(Arc::new(RwLock::new(Cell { locked: true, data })))
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Cell> {
        self.0.read()
    }

    /// The single mutation entry point: every write goes through here so the
    /// lock flag is checked in one place.
    pub(crate) fn write(&self) -> Result<RwLockWriteGuard<'_, Cell>> {
        let guard = self.0.write();
        if guard.locked {
            return Err(RuntimeError::ValueLocked);
        }
        Ok(guard)
    }

    /// Run `f` against the payload under a read lock.
    pub fn with_data<R>(&self, f: impl FnOnce(&ValueData) -> R) -> R {
        f(&self.read().data)
    }

    /// Whether two handles alias the same cell.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// The discriminant of this value.
    pub fn kind(&self) -> ValueKind {
        self.read().data.kind()
    }

    /// The stable type-id code of this value.
    pub fn type_id(&self) -> Integer {
        self.kind().type_id()
    }

    /// Whether this value has been locked.
    pub fn is_locked(&self) -> bool {
        self.read().locked
    }

    /// Permanently lock this value and everything it contains.
    pub fn lock(&self) {
        let children = {
            let mut cell = self.0.write();
            if cell.locked {
                return;
            }
            cell.locked = true;
            cell.data.children()
        };
        for child in children {
            child.lock();
        }
    }
}

impl ValueData {
    /// Handles of the values nested directly inside this payload.
    pub(crate) fn children(&self) -> Vec<Value> {
        match self {
            ValueData::Array(array) => array.items().to_vec(),
            ValueData::Dictionary(dict) => dict.values().cloned().collect(),
            ValueData::Structure(structure) => structure.values().cloned().collect(),
            _ => Vec::new(),
        }
    }
}
