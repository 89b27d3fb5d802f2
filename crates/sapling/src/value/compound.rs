//! Container payloads: arrays, dictionaries, and structures

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{DictKey, Integer, StructureType, TypeDescriptor, Value};
use crate::error::{Result, RuntimeError};

/// How an out-of-range index or value is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RangePolicy {
    /// Raise an error
    #[default]
    Error = 0,
    /// Clamp to the nearest valid position
    Cap = 1,
    /// Wrap around modulo the range width
    Rollover = 2,
}

impl RangePolicy {
    /// The integer code exported as `RANGE_BOUNDARY_*`.
    pub fn code(self) -> Integer {
        self as Integer
    }

    /// Look up a policy by its integer code.
    pub fn from_code(code: Integer) -> Option<Self> {
        match code {
            0 => Some(RangePolicy::Error),
            1 => Some(RangePolicy::Cap),
            2 => Some(RangePolicy::Rollover),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Array
// ═══════════════════════════════════════════════════════════════════════

/// An ordered sequence indexed over the inclusive range `[start, finish]`.
///
/// Declared arrays start with `finish - start + 1` default slots. `add`
/// fills those slots in order before growing `finish`.
#[derive(Clone)]
pub struct ArrayData {
    start: Integer,
    items: Vec<Value>,
    filled: usize,
    element: Option<Arc<TypeDescriptor>>,
    policy: RangePolicy,
}

impl ArrayData {
    /// An array whose slots are all populated.
    pub fn new(start: Integer, items: Vec<Value>) -> Self {
        let filled = items.len();
        Self {
            start,
            items,
            filled,
            element: None,
            policy: RangePolicy::Error,
        }
    }

    /// A declared array: `slots` are defaults awaiting `add`.
    pub fn declared(
        start: Integer,
        slots: Vec<Value>,
        element: Arc<TypeDescriptor>,
        policy: RangePolicy,
    ) -> Self {
        Self {
            start,
            items: slots,
            filled: 0,
            element: Some(element),
            policy,
        }
    }

    /// Set the out-of-range policy.
    pub fn with_policy(mut self, policy: RangePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// First valid index.
    pub fn start(&self) -> Integer {
        self.start
    }

    /// Last valid index (`start - 1` when empty, saturating at
    /// `Integer::MIN`).
    pub fn finish(&self) -> Integer {
        let finish = i128::from(self.start) + self.items.len() as i128 - 1;
        finish.clamp(i128::from(Integer::MIN), i128::from(Integer::MAX)) as Integer
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The out-of-range policy.
    pub fn policy(&self) -> RangePolicy {
        self.policy
    }

    /// Declared element type, if any.
    pub fn element_type(&self) -> Option<&Arc<TypeDescriptor>> {
        self.element.as_ref()
    }

    /// Element handles in index order.
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Map a script index to a storage offset, applying the range policy.
    pub fn resolve(&self, index: Integer) -> Result<usize> {
        let len = self.items.len() as Integer;
        if len == 0 {
            return Err(RuntimeError::index_out_of_range(
                index,
                self.start,
                self.finish(),
            ));
        }

        let offset = i128::from(index) - i128::from(self.start);
        let len = i128::from(len);
        let resolved = if (0..len).contains(&offset) {
            offset
        } else {
            match self.policy {
                RangePolicy::Error => {
                    return Err(RuntimeError::index_out_of_range(
                        index,
                        self.start,
                        self.finish(),
                    ))
                }
                RangePolicy::Cap => offset.clamp(0, len - 1),
                RangePolicy::Rollover => offset.rem_euclid(len),
            }
        };
        Ok(resolved as usize)
    }

    /// The element at `index` after applying the range policy.
    pub fn get(&self, index: Integer) -> Result<Value> {
        let offset = self.resolve(index)?;
        Ok(self.items[offset].clone())
    }

    /// Append, or fill the next declared slot.
    pub(crate) fn push(&mut self, value: Value) -> Result<()> {
        if self.filled < self.items.len() {
            self.items[self.filled] = value;
        } else {
            self.ensure_room(self.items.len() + 1)?;
            self.items.push(value);
        }
        self.filled += 1;
        Ok(())
    }

    /// Insert before `index`; `finish + 1` appends.
    pub(crate) fn insert(&mut self, index: Integer, value: Value) -> Result<()> {
        let offset = i128::from(index) - i128::from(self.start);
        if offset < 0 || offset > self.items.len() as i128 {
            return Err(RuntimeError::index_out_of_range(
                index,
                self.start,
                self.finish().saturating_add(1),
            ));
        }
        self.ensure_room(self.items.len() + 1)?;
        self.items.insert(offset as usize, value);
        self.filled += 1;
        Ok(())
    }

    /// Exchange the elements at two indices (no range policy applied).
    pub(crate) fn swap(&mut self, a: Integer, b: Integer) -> Result<()> {
        let (ia, ib) = (self.strict_offset(a)?, self.strict_offset(b)?);
        self.items.swap(ia, ib);
        Ok(())
    }

    /// Replace every element handle, keeping `start`.
    pub(crate) fn replace_items(&mut self, items: Vec<Value>) -> Result<()> {
        self.ensure_room(items.len())?;
        self.filled = items.len();
        self.items = items;
        Ok(())
    }

    /// `len` elements from `start` must end at or before `Integer::MAX`.
    fn ensure_room(&self, len: usize) -> Result<()> {
        let last = i128::from(self.start) + len as i128 - 1;
        if last > i128::from(Integer::MAX) {
            return Err(RuntimeError::range(format!(
                "An array starting at {} cannot hold {len} elements.",
                self.start
            )));
        }
        Ok(())
    }

    fn strict_offset(&self, index: Integer) -> Result<usize> {
        let offset = i128::from(index) - i128::from(self.start);
        if offset < 0 || offset >= self.items.len() as i128 {
            return Err(RuntimeError::index_out_of_range(
                index,
                self.start,
                self.finish(),
            ));
        }
        Ok(offset as usize)
    }

    /// Same layout with each element mapped through `f`.
    pub(crate) fn map_items(&self, mut f: impl FnMut(&Value) -> Value) -> Self {
        Self {
            start: self.start,
            items: self.items.iter().map(&mut f).collect(),
            filled: self.filled,
            element: self.element.clone(),
            policy: self.policy,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Dictionary
// ═══════════════════════════════════════════════════════════════════════

/// A key to value mapping with scalar keys.
#[derive(Clone, Default)]
pub struct DictionaryData {
    entries: IndexMap<DictKey, Value>,
}

impl DictionaryData {
    /// An empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up without creating.
    pub fn get(&self, key: &DictKey) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &DictKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &DictKey> {
        self.entries.keys()
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&DictKey, &Value)> {
        self.entries.iter()
    }

    pub(crate) fn insert(&mut self, key: DictKey, value: Value) {
        self.entries.insert(key, value);
    }

    pub(crate) fn remove(&mut self, key: &DictKey) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Existing entry or a new unlocked placeholder.
    pub(crate) fn entry_or_placeholder(&mut self, key: DictKey) -> Value {
        self.entries
            .entry(key)
            .or_insert_with(Value::placeholder)
            .clone()
    }

    pub(crate) fn map_values(&self, mut f: impl FnMut(&Value) -> Value) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(k, v)| (k.clone(), f(v)))
                .collect(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Structure
// ═══════════════════════════════════════════════════════════════════════

/// A closed set of named members.
#[derive(Clone)]
pub struct StructureData {
    ty: Option<Arc<StructureType>>,
    members: IndexMap<String, Value>,
}

impl StructureData {
    /// A structure with the given members and no backing type.
    pub fn new(members: IndexMap<String, Value>) -> Self {
        Self { ty: None, members }
    }

    /// A structure declared from `ty`.
    pub fn declared(ty: Arc<StructureType>, members: IndexMap<String, Value>) -> Self {
        Self {
            ty: Some(ty),
            members,
        }
    }

    /// The backing type, when declared from one.
    pub fn structure_type(&self) -> Option<&Arc<StructureType>> {
        self.ty.as_ref()
    }

    /// The member named `name`.
    pub fn get(&self, name: &str) -> Result<Value> {
        self.members
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::no_such_member(name))
    }

    /// Member names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.members.keys()
    }

    /// Member values in declaration order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.members.values()
    }

    /// Members in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.members.iter()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the structure has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(crate) fn map_values(&self, mut f: impl FnMut(&Value) -> Value) -> Self {
        Self {
            ty: self.ty.clone(),
            members: self
                .members
                .iter()
                .map(|(k, v)| (k.clone(), f(v)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ints(values: &[Integer]) -> Vec<Value> {
        values.iter().map(|v| Value::integer(*v)).collect()
    }

    #[test]
    fn test_resolve_policies() {
        let array = ArrayData::new(1, ints(&[10, 20, 30]));
        assert_eq!(array.resolve(1).unwrap(), 0);
        assert_eq!(array.resolve(3).unwrap(), 2);
        assert!(array.resolve(4).is_err());

        let capped = array.clone().with_policy(RangePolicy::Cap);
        assert_eq!(capped.resolve(4).unwrap(), 2);
        assert_eq!(capped.resolve(-10).unwrap(), 0);

        let wrapped = array.with_policy(RangePolicy::Rollover);
        assert_eq!(wrapped.resolve(4).unwrap(), 0);
        assert_eq!(wrapped.resolve(0).unwrap(), 2);
    }

    #[test]
    fn test_empty_array_always_out_of_range() {
        let array = ArrayData::new(0, Vec::new()).with_policy(RangePolicy::Cap);
        assert_eq!(array.finish(), -1);
        assert!(array.resolve(0).is_err());
    }

    #[test]
    fn test_push_fills_declared_slots_first() {
        let element = Arc::new(TypeDescriptor::Integer);
        let mut array = ArrayData::declared(1, ints(&[0, 0]), element, RangePolicy::Error);
        array.push(Value::integer(7)).unwrap();
        assert_eq!(array.len(), 2);
        array.push(Value::integer(8)).unwrap();
        array.push(Value::integer(9)).unwrap();
        assert_eq!(array.len(), 3);
        assert_eq!(array.finish(), 3);
        assert_eq!(array.get(3).unwrap().as_integer().unwrap(), 9);
    }

    #[test]
    fn test_bounds_at_integer_extremes() {
        let top = ArrayData::new(Integer::MAX, ints(&[1]));
        assert_eq!(top.finish(), Integer::MAX);
        assert_eq!(top.get(Integer::MAX).unwrap().as_integer().unwrap(), 1);

        let bottom = ArrayData::new(Integer::MIN, Vec::new());
        assert_eq!(bottom.finish(), Integer::MIN);
        let err = bottom.resolve(0).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::RangeError);
    }

    #[test]
    fn test_growth_past_integer_max_rejected() {
        let mut top = ArrayData::new(Integer::MAX, ints(&[1]));
        let err = top.push(Value::integer(2)).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::RangeError);
        assert!(top.insert(Integer::MAX, Value::integer(0)).is_err());
        assert!(top.replace_items(ints(&[1, 2])).is_err());
        assert_eq!(top.len(), 1);

        let mut near = ArrayData::new(Integer::MAX - 1, ints(&[1]));
        near.push(Value::integer(2)).unwrap();
        assert_eq!(near.finish(), Integer::MAX);
    }

    #[test]
    fn test_insert_and_swap() {
        let mut array = ArrayData::new(0, ints(&[1, 3]));
        array.insert(1, Value::integer(2)).unwrap();
        array.insert(3, Value::integer(4)).unwrap();
        assert!(array.insert(9, Value::integer(0)).is_err());
        array.swap(0, 3).unwrap();
        let values: Vec<Integer> = array
            .items()
            .iter()
            .map(|v| v.as_integer().unwrap())
            .collect();
        assert_eq!(values, vec![4, 2, 3, 1]);
        assert!(array.swap(0, 4).is_err());
    }

    #[test]
    fn test_range_policy_codes() {
        assert_eq!(RangePolicy::from_code(2), Some(RangePolicy::Rollover));
        assert_eq!(RangePolicy::Cap.code(), 1);
        assert_eq!(RangePolicy::from_code(3), None);
    }
}
