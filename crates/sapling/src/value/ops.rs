//! Value operations: assignment, containers, members, cloning, comparison
//!
//! Every mutating operation acquires the cell through `Value::write`, which
//! rejects locked values. Operands are read (and their read guards released)
//! before the target is locked for writing, so an operation whose operand
//! aliases its target never waits on itself.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use super::{
    numeric, DictKey, ExecutableData, Integer, TypeDescriptor, Value, ValueData, ValueKind,
};
use crate::environment::CloneKind;
use crate::error::{Result, RuntimeError};

// ═══════════════════════════════════════════════════════════════════════
// Assignment
// ═══════════════════════════════════════════════════════════════════════

impl Value {
    /// Copy `rhs` into this value, converting to this value's type.
    ///
    /// Scalars coerce `rhs` (and honor range constraints); arrays and
    /// structures assign element-wise through their existing elements;
    /// dictionaries replace their entries with copies; an unlocked Null
    /// placeholder adopts a copy of `rhs` whatever its type.
    pub fn assign(&self, rhs: &Value) -> Result<()> {
        let target = {
            let cell = self.read();
            if cell.locked {
                return Err(RuntimeError::ValueLocked);
            }
            cell.data.kind()
        };
        if self.ptr_eq(rhs) {
            return Ok(());
        }

        match target {
            ValueKind::Null => {
                let data = rhs.with_data(|d| copy_data(d, Value::copy));
                self.write()?.data = data;
            }
            ValueKind::Boolean => {
                let b = rhs.as_boolean()?;
                self.write()?.data = ValueData::Boolean(b);
            }
            ValueKind::Integer => {
                let incoming = rhs.as_integer()?;
                let mut cell = self.write()?;
                if let ValueData::Integer { value, bounds } = &mut cell.data {
                    *value = match bounds {
                        Some(b) => b.apply(incoming)?,
                        None => incoming,
                    };
                }
            }
            ValueKind::Real => {
                let incoming = rhs.as_real()?;
                let mut cell = self.write()?;
                if let ValueData::Real { value, bounds } = &mut cell.data {
                    *value = match bounds {
                        Some(b) => b.apply(incoming)?,
                        None => incoming,
                    };
                }
            }
            ValueKind::String => {
                let s = rhs.as_string()?;
                self.write()?.data = ValueData::String(s);
            }
            ValueKind::Type => {
                let ty = rhs
                    .as_type()
                    .ok_or_else(|| RuntimeError::cannot_cast(rhs.kind().name(), "Type"))?;
                self.write()?.data = ValueData::Type(ty);
            }
            ValueKind::Executable => {
                let exe = rhs
                    .with_data(|d| match d {
                        ValueData::Executable(exe) => Some(exe.clone()),
                        _ => None,
                    })
                    .ok_or_else(|| RuntimeError::cannot_cast(rhs.kind().name(), "Executable"))?;
                self.write()?.data = ValueData::Executable(exe);
            }
            ValueKind::Array => self.assign_array(rhs)?,
            ValueKind::Dictionary => {
                let entries = rhs
                    .with_data(|d| match d {
                        ValueData::Dictionary(dict) => Some(dict.map_values(Value::copy)),
                        _ => None,
                    })
                    .ok_or_else(|| RuntimeError::cannot_cast(rhs.kind().name(), "Dictionary"))?;
                self.write()?.data = ValueData::Dictionary(entries);
            }
            ValueKind::Structure => self.assign_structure(rhs)?,
        }
        Ok(())
    }

    fn assign_array(&self, rhs: &Value) -> Result<()> {
        let source = rhs
            .with_data(|d| match d {
                ValueData::Array(array) => Some(array.items().to_vec()),
                _ => None,
            })
            .ok_or_else(|| RuntimeError::cannot_cast(rhs.kind().name(), "Array"))?;
        let targets = self.elements()?;
        if source.len() != targets.len() {
            return Err(RuntimeError::range(format!(
                "Cannot assign an array of length {} to an array of length {}.",
                source.len(),
                targets.len()
            )));
        }
        for (target, value) in targets.iter().zip(&source) {
            target.assign(value)?;
        }
        Ok(())
    }

    fn assign_structure(&self, rhs: &Value) -> Result<()> {
        let source: Vec<(String, Value)> = rhs
            .with_data(|d| match d {
                ValueData::Structure(s) => Some(
                    s.iter()
                        .map(|(name, value)| (name.clone(), value.clone()))
                        .collect(),
                ),
                _ => None,
            })
            .ok_or_else(|| RuntimeError::cannot_cast(rhs.kind().name(), "Structure"))?;
        let targets = self.members()?;
        let same_shape = source.len() == targets.len()
            && source.iter().all(|(name, _)| targets.contains(name));
        if !same_shape {
            return Err(RuntimeError::illegal_cast(
                "Cannot assign a structure with a different set of members.",
            ));
        }
        for (name, value) in &source {
            self.member(name)?.assign(value)?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Container Operations
// ═══════════════════════════════════════════════════════════════════════

impl Value {
    /// Append to an Array, or merge an Executable's overloads.
    ///
    /// Dictionaries need a key; see [`Value::insert_key`].
    pub fn add(&self, value: Value) -> Result<()> {
        let incoming = value.kind();
        let target = self.kind();
        match target {
            ValueKind::Array => {
                reject_cycle(self, &value)?;
                let mut cell = self.write()?;
                if let ValueData::Array(array) = &mut cell.data {
                    if let Some(ty) = array.element_type() {
                        if ty.kind() != incoming {
                            return Err(RuntimeError::illegal_cast(format!(
                                "Cannot add a value of type {incoming} to an array of {}.",
                                ty.kind()
                            )));
                        }
                    }
                    array.push(value)?;
                }
                Ok(())
            }
            ValueKind::Executable => {
                let other = value
                    .with_data(|d| match d {
                        ValueData::Executable(exe) => Some(exe.clone()),
                        _ => None,
                    })
                    .ok_or_else(|| RuntimeError::cannot_cast(incoming.name(), "Executable"))?;
                let mut cell = self.write()?;
                if let ValueData::Executable(exe) = &mut cell.data {
                    exe.merge(&other)?;
                }
                Ok(())
            }
            ValueKind::Dictionary => Err(RuntimeError::illegal_cast(
                "Dictionary entries require a key.",
            )),
            other => Err(RuntimeError::illegal_cast(format!(
                "Cannot add to a value of type {other}."
            ))),
        }
    }

    /// Insert or overwrite a keyed Dictionary entry.
    pub fn insert_key(&self, key: &Value, value: Value) -> Result<()> {
        let key = DictKey::from_value(key)?;
        reject_cycle(self, &value)?;
        let mut cell = self.write()?;
        match &mut cell.data {
            ValueData::Dictionary(dict) => {
                dict.insert(key, value);
                Ok(())
            }
            other => Err(RuntimeError::illegal_cast(format!(
                "Values of type {} have no keys.",
                other.kind()
            ))),
        }
    }

    /// Insert into an Array before `position`; `finish + 1` appends.
    pub fn insert_at(&self, value: Value, position: Integer) -> Result<()> {
        reject_cycle(self, &value)?;
        let mut cell = self.write()?;
        match &mut cell.data {
            ValueData::Array(array) => array.insert(position, value),
            other => Err(not_an_array(other.kind())),
        }
    }

    /// Exchange two Array elements; both indices must be in range.
    pub fn swap(&self, a: Integer, b: Integer) -> Result<()> {
        let mut cell = self.write()?;
        match &mut cell.data {
            ValueData::Array(array) => array.swap(a, b),
            other => Err(not_an_array(other.kind())),
        }
    }

    /// Replace every Array element, keeping the start index.
    pub fn set_elements(&self, items: Vec<Value>) -> Result<()> {
        for item in &items {
            reject_cycle(self, item)?;
        }
        let mut cell = self.write()?;
        match &mut cell.data {
            ValueData::Array(array) => array.replace_items(items),
            other => Err(not_an_array(other.kind())),
        }
    }

    /// Access an element: Array by index (range policy applies), Dictionary
    /// by key (missing keys are created as placeholders).
    pub fn element(&self, index: &Value) -> Result<Value> {
        match self.kind() {
            ValueKind::Array => self.element_at(index.as_integer()?),
            ValueKind::Dictionary => {
                let key = DictKey::from_value(index)?;
                let existing = self.with_data(|d| match d {
                    ValueData::Dictionary(dict) => dict.get(&key).cloned(),
                    _ => None,
                });
                if let Some(value) = existing {
                    return Ok(value);
                }
                let mut cell = self.write()?;
                match &mut cell.data {
                    ValueData::Dictionary(dict) => Ok(dict.entry_or_placeholder(key)),
                    other => Err(not_an_array(other.kind())),
                }
            }
            other => Err(RuntimeError::illegal_cast(format!(
                "Values of type {other} have no elements."
            ))),
        }
    }

    /// Array element at `index`, applying the range policy.
    pub fn element_at(&self, index: Integer) -> Result<Value> {
        self.with_data(|d| match d {
            ValueData::Array(array) => array.get(index),
            other => Err(not_an_array(other.kind())),
        })
    }

    /// Array element handles in index order.
    pub fn elements(&self) -> Result<Vec<Value>> {
        self.with_data(|d| match d {
            ValueData::Array(array) => Ok(array.items().to_vec()),
            other => Err(not_an_array(other.kind())),
        })
    }

    /// Array `(start, finish)`.
    pub fn bounds(&self) -> Result<(Integer, Integer)> {
        self.with_data(|d| match d {
            ValueData::Array(array) => Ok((array.start(), array.finish())),
            other => Err(not_an_array(other.kind())),
        })
    }

    /// Dictionary lookup without creating an entry.
    pub fn get_key(&self, key: &Value) -> Result<Option<Value>> {
        let key = DictKey::from_value(key)?;
        self.with_data(|d| match d {
            ValueData::Dictionary(dict) => Ok(dict.get(&key).cloned()),
            other => Err(not_a_dictionary(other.kind())),
        })
    }

    /// Whether a Dictionary holds `key`.
    pub fn contains_key(&self, key: &Value) -> Result<bool> {
        Ok(self.get_key(key)?.is_some())
    }

    /// Remove a Dictionary entry, returning it.
    pub fn remove_key(&self, key: &Value) -> Result<Option<Value>> {
        let key = DictKey::from_value(key)?;
        let mut cell = self.write()?;
        match &mut cell.data {
            ValueData::Dictionary(dict) => Ok(dict.remove(&key)),
            other => Err(not_a_dictionary(other.kind())),
        }
    }

    /// Dictionary keys as fresh values, in insertion order.
    pub fn keys(&self) -> Result<Vec<Value>> {
        self.with_data(|d| match d {
            ValueData::Dictionary(dict) => Ok(dict.keys().map(DictKey::to_value).collect()),
            other => Err(not_a_dictionary(other.kind())),
        })
    }

    /// Element count of an Array or Dictionary, member count of a
    /// Structure, or character count of a String.
    pub fn length(&self) -> Result<usize> {
        self.with_data(|d| match d {
            ValueData::Array(array) => Ok(array.len()),
            ValueData::Dictionary(dict) => Ok(dict.len()),
            ValueData::Structure(s) => Ok(s.len()),
            ValueData::String(s) => Ok(s.chars().count()),
            other => Err(RuntimeError::illegal_cast(format!(
                "Values of type {} have no length.",
                other.kind()
            ))),
        })
    }
}

impl Value {
    /// Whether `target` is this value or is reachable through its elements,
    /// entries, or members.
    pub fn reaches(&self, target: &Value) -> bool {
        let mut seen = HashSet::new();
        let mut pending = vec![self.clone()];
        while let Some(value) = pending.pop() {
            if value.ptr_eq(target) {
                return true;
            }
            if seen.insert(Arc::as_ptr(&value.0) as usize) {
                pending.extend(value.with_data(ValueData::children));
            }
        }
        false
    }
}

/// Containers stay acyclic, so copying, locking, and display terminate.
fn reject_cycle(container: &Value, value: &Value) -> Result<()> {
    if value.reaches(container) {
        return Err(RuntimeError::illegal_value(
            "A container cannot hold a value that contains it.",
        ));
    }
    Ok(())
}

fn not_an_array(kind: ValueKind) -> RuntimeError {
    RuntimeError::illegal_cast(format!("Expected an Array, found {kind}."))
}

fn not_a_dictionary(kind: ValueKind) -> RuntimeError {
    RuntimeError::illegal_cast(format!("Expected a Dictionary, found {kind}."))
}

// ═══════════════════════════════════════════════════════════════════════
// Members
// ═══════════════════════════════════════════════════════════════════════

impl Value {
    /// Access a Structure member, or an Array's `start`, `finish`, `length`,
    /// or `empty` pseudo-member.
    pub fn member(&self, name: &str) -> Result<Value> {
        self.with_data(|d| match d {
            ValueData::Structure(s) => s.get(name),
            ValueData::Array(array) => {
                let value = match name {
                    "start" => Value::integer(array.start()),
                    "finish" => Value::integer(array.finish()),
                    "length" => Value::integer(array.len() as Integer),
                    "empty" => Value::boolean(array.is_empty()),
                    _ => return Err(RuntimeError::no_such_member(name)),
                };
                Ok(value.locked())
            }
            other => Err(RuntimeError::illegal_cast(format!(
                "Values of type {} have no members.",
                other.kind()
            ))),
        })
    }

    /// Structure member names in declaration order.
    pub fn members(&self) -> Result<Vec<String>> {
        self.with_data(|d| match d {
            ValueData::Structure(s) => Ok(s.names().cloned().collect()),
            other => Err(RuntimeError::illegal_cast(format!(
                "Values of type {} have no members.",
                other.kind()
            ))),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Declaration and Cloning
// ═══════════════════════════════════════════════════════════════════════

impl Value {
    /// Declare a fresh instance of this type descriptor.
    pub fn declare(&self) -> Result<Value> {
        let ty: Arc<TypeDescriptor> = self
            .as_type()
            .ok_or_else(|| RuntimeError::cannot_cast(self.kind().name(), "Type"))?;
        Ok(ty.declare())
    }

    /// A fully independent, unlocked duplicate.
    pub fn copy(&self) -> Value {
        self.duplicate(CloneKind::Deep)
    }

    /// An unlocked top-level duplicate. `Deep` duplicates nested values too;
    /// `Shallow` and `Minimal` share them.
    pub fn duplicate(&self, kind: CloneKind) -> Value {
        let data = match kind {
            CloneKind::Deep => self.with_data(|d| copy_data(d, Value::copy)),
            CloneKind::Minimal | CloneKind::Shallow => {
                self.with_data(|d| copy_data(d, Value::clone))
            }
        };
        Value::from_data(data)
    }

    /// Like [`Value::duplicate`], but every duplicated value keeps its
    /// source's lock state.
    pub fn clone_with(&self, kind: CloneKind) -> Value {
        let data = match kind {
            CloneKind::Deep => {
                self.with_data(|d| copy_data(d, |v| v.clone_with(CloneKind::Deep)))
            }
            CloneKind::Minimal | CloneKind::Shallow => {
                self.with_data(|d| copy_data(d, Value::clone))
            }
        };
        if self.is_locked() {
            Value::locked_from_data(data)
        } else {
            Value::from_data(data)
        }
    }
}

fn copy_data(data: &ValueData, nested: impl Fn(&Value) -> Value) -> ValueData {
    match data {
        ValueData::Null => ValueData::Null,
        ValueData::Type(ty) => ValueData::Type(Arc::clone(ty)),
        ValueData::Boolean(b) => ValueData::Boolean(*b),
        ValueData::Integer { value, bounds } => ValueData::Integer {
            value: *value,
            bounds: *bounds,
        },
        ValueData::Real { value, bounds } => ValueData::Real {
            value: *value,
            bounds: *bounds,
        },
        ValueData::String(s) => ValueData::String(s.clone()),
        ValueData::Array(array) => ValueData::Array(array.map_items(nested)),
        ValueData::Dictionary(dict) => ValueData::Dictionary(dict.map_values(nested)),
        ValueData::Structure(s) => ValueData::Structure(s.map_values(nested)),
        ValueData::Executable(exe) => ValueData::Executable(ExecutableData::clone(exe)),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Comparison
// ═══════════════════════════════════════════════════════════════════════

impl Value {
    /// Scalar ordering: numbers numerically (Booleans as 0/1), Strings
    /// lexically, and a String against a number as text.
    pub fn compare(&self, other: &Value) -> Result<Ordering> {
        let (lhs, rhs) = (self.kind(), other.kind());
        if !lhs.is_scalar() || !rhs.is_scalar() {
            let offender = if lhs.is_scalar() { rhs } else { lhs };
            return Err(RuntimeError::illegal_cast(format!(
                "Values of type {offender} cannot be compared."
            )));
        }

        if lhs == ValueKind::String || rhs == ValueKind::String {
            return Ok(self.as_string()?.cmp(&other.as_string()?));
        }
        if lhs == ValueKind::Real || rhs == ValueKind::Real {
            let (a, b) = (self.as_real()?, other.as_real()?);
            if numeric::real_equal(a, b) {
                return Ok(Ordering::Equal);
            }
            return a.partial_cmp(&b).ok_or_else(|| {
                RuntimeError::domain("NaN cannot be ordered against another value.")
            });
        }
        Ok(self.as_integer()?.cmp(&other.as_integer()?))
    }

    /// Scalar equality as used by `CompareEqual`; Null equals only Null.
    pub fn equals(&self, other: &Value) -> Result<bool> {
        if self.is_null() || other.is_null() {
            return Ok(self.is_null() && other.is_null());
        }
        Ok(self.compare(other)? == Ordering::Equal)
    }

    /// Scalar `<`.
    pub fn less_than(&self, other: &Value) -> Result<bool> {
        Ok(self.compare(other)? == Ordering::Less)
    }

    /// Same kind and same contents, compared exactly (no epsilon, no
    /// coercion), recursing through containers.
    pub fn exactly_equal(&self, other: &Value) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let lhs = self.read();
        let rhs = other.read();
        exact_data_eq(&lhs.data, &rhs.data)
    }
}

fn exact_data_eq(lhs: &ValueData, rhs: &ValueData) -> bool {
    match (lhs, rhs) {
        (ValueData::Null, ValueData::Null) => true,
        (ValueData::Type(a), ValueData::Type(b)) => {
            Arc::ptr_eq(a, b) || a.to_string() == b.to_string()
        }
        (ValueData::Boolean(a), ValueData::Boolean(b)) => a == b,
        (ValueData::Integer { value: a, .. }, ValueData::Integer { value: b, .. }) => a == b,
        (ValueData::Real { value: a, .. }, ValueData::Real { value: b, .. }) => a == b,
        (ValueData::String(a), ValueData::String(b)) => a == b,
        (ValueData::Array(a), ValueData::Array(b)) => {
            a.start() == b.start()
                && a.len() == b.len()
                && a.items()
                    .iter()
                    .zip(b.items())
                    .all(|(x, y)| x.exactly_equal(y))
        }
        (ValueData::Dictionary(a), ValueData::Dictionary(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).is_some_and(|w| v.exactly_equal(w)))
        }
        (ValueData::Structure(a), ValueData::Structure(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|((ka, va), (kb, vb))| ka == kb && va.exactly_equal(vb))
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
