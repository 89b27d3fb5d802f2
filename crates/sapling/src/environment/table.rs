//! A single name to value table with arity-indexed overload slots

use dashmap::DashMap;

use crate::environment::CloneKind;
use crate::error::{Result, RuntimeError};
use crate::value::Value;

/// Build the mangled key of an overload: `<name>_<arity>`.
pub fn mangle(name: &str, arity: usize) -> String {
    format!("{name}_{arity}")
}

/// Split a mangled key back into name and arity.
pub fn demangle(key: &str) -> Option<(&str, usize)> {
    let (name, arity) = key.rsplit_once('_')?;
    if name.is_empty() || arity.is_empty() || !arity.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((name, arity.parse().ok()?))
}

/// Everything bound under one name: an optional plain value plus callables
/// indexed by arity.
#[derive(Clone, Default)]
struct Slot {
    value: Option<Value>,
    overloads: Vec<Option<Value>>,
}

impl Slot {
    fn overload(&self, arity: usize) -> Option<&Value> {
        self.overloads.get(arity).and_then(Option::as_ref)
    }

    fn count(&self) -> usize {
        usize::from(self.value.is_some()) + self.overloads.iter().flatten().count()
    }

    fn map(&self, f: impl Fn(&Value) -> Value) -> Slot {
        Slot {
            value: self.value.as_ref().map(&f),
            overloads: self
                .overloads
                .iter()
                .map(|o| o.as_ref().map(&f))
                .collect(),
        }
    }
}

/// One symbol table: the base table or a single stack frame.
///
/// Executables are stored in per-name slots indexed by arity, so overloads
/// that share a name never collide; everything else occupies the name's
/// plain slot. Re-binding an occupied slot is a `DuplicateSymbol` error.
#[derive(Default)]
pub struct SymbolTable {
    entries: DashMap<String, Slot>,
}

impl SymbolTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` under `name`; Executables go to their arity slots.
    pub fn insert(&self, name: &str, value: Value) -> Result<()> {
        if value.is_executable() {
            self.insert_overloads(name, value)
        } else {
            self.insert_plain(name, value)
        }
    }

    /// Bind `value` in the plain slot regardless of its kind.
    pub fn insert_plain(&self, name: &str, value: Value) -> Result<()> {
        let mut slot = self.entries.entry(name.to_string()).or_default();
        if slot.value.is_some() {
            return Err(duplicate(name));
        }
        slot.value = Some(value);
        Ok(())
    }

    fn insert_overloads(&self, name: &str, value: Value) -> Result<()> {
        let arities = value.arities();
        let mut slot = self.entries.entry(name.to_string()).or_default();
        if let Some(arity) = arities.iter().find(|a| slot.overload(**a).is_some()) {
            return Err(duplicate(&mangle(name, *arity)));
        }
        for arity in arities {
            if slot.overloads.len() <= arity {
                slot.overloads.resize(arity + 1, None);
            }
            slot.overloads[arity] = Some(value.clone());
        }
        Ok(())
    }

    /// The plain value bound under `name`.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.entries.get(name).and_then(|slot| slot.value.clone())
    }

    /// The callable registered under `name` for `arity`.
    pub fn get_overload(&self, name: &str, arity: usize) -> Option<Value> {
        self.entries
            .get(name)
            .and_then(|slot| slot.overload(arity).cloned())
    }

    /// Whether `name` has a plain binding.
    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .get(name)
            .is_some_and(|slot| slot.value.is_some())
    }

    /// Number of bound symbols, counting each overload separately.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|e| e.value().count()).sum()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every binding.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Every bound key, overloads in mangled form, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        for entry in self.entries.iter() {
            let slot = entry.value();
            if slot.value.is_some() {
                keys.push(entry.key().clone());
            }
            for (arity, overload) in slot.overloads.iter().enumerate() {
                if overload.is_some() {
                    keys.push(mangle(entry.key(), arity));
                }
            }
        }
        keys.sort();
        keys
    }

    /// A new table with the same names; values are shared (`Minimal`,
    /// `Shallow`) or copied (`Deep`). Copies keep their source's lock.
    pub fn duplicate(&self, kind: CloneKind) -> SymbolTable {
        SymbolTable {
            entries: self.snapshot(kind).into_iter().collect(),
        }
    }

    /// Insert every binding of this table into `target`, which may be this
    /// same table.
    pub fn load_into(&self, target: &SymbolTable, kind: CloneKind) -> Result<()> {
        for (name, slot) in self.snapshot(kind) {
            if let Some(value) = slot.value {
                target.insert_plain(&name, value)?;
            }
            for (arity, overload) in slot.overloads.into_iter().enumerate() {
                if let Some(value) = overload {
                    target.insert_arity(&name, arity, value)?;
                }
            }
        }
        Ok(())
    }

    /// Every slot, released from the map's shard guards.
    fn snapshot(&self, kind: CloneKind) -> Vec<(String, Slot)> {
        self.entries
            .iter()
            .map(|entry| {
                let slot = match kind {
                    CloneKind::Deep => entry.value().map(|v| v.clone_with(CloneKind::Deep)),
                    CloneKind::Minimal | CloneKind::Shallow => entry.value().clone(),
                };
                (entry.key().clone(), slot)
            })
            .collect()
    }

    fn insert_arity(&self, name: &str, arity: usize, value: Value) -> Result<()> {
        let mut slot = self.entries.entry(name.to_string()).or_default();
        if slot.overload(arity).is_some() {
            return Err(duplicate(&mangle(name, arity)));
        }
        if slot.overloads.len() <= arity {
            slot.overloads.resize(arity + 1, None);
        }
        slot.overloads[arity] = Some(value);
        Ok(())
    }
}

fn duplicate(key: &str) -> RuntimeError {
    RuntimeError::duplicate_symbol(format!("The symbol '{key}' already exists."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Param;
    use pretty_assertions::assert_eq;

    fn function(name: &str, arity: usize) -> Value {
        let params = (0..arity).map(|i| Param::by_value(format!("p{i}"))).collect();
        Value::function(name, params, |_| Ok(Value::null())).unwrap()
    }

    #[test]
    fn test_mangle_round_trip() {
        assert_eq!(mangle("Max", 2), "Max_2");
        assert_eq!(demangle("Max_2"), Some(("Max", 2)));
        assert_eq!(demangle("SORT_ASCENDING"), None);
        assert_eq!(demangle("_2"), None);
        assert_eq!(demangle("x_"), None);
    }

    #[test]
    fn test_overloads_coexist() {
        let table = SymbolTable::new();
        table.insert("F", function("F", 1)).unwrap();
        table.insert("F", function("F", 2)).unwrap();
        assert!(table.get_overload("F", 1).is_some());
        assert!(table.get_overload("F", 2).is_some());
        assert!(table.get_overload("F", 3).is_none());
        assert!(table.get("F").is_none());
        assert_eq!(table.len(), 2);
        assert_eq!(table.keys(), vec!["F_1", "F_2"]);
    }

    #[test]
    fn test_duplicate_bindings_rejected() {
        let table = SymbolTable::new();
        table.insert("x", Value::integer(1)).unwrap();
        assert_eq!(
            table.insert("x", Value::integer(2)).unwrap_err().to_string(),
            "The symbol 'x' already exists."
        );
        table.insert("F", function("F", 1)).unwrap();
        assert_eq!(
            table.insert("F", function("F", 1)).unwrap_err().to_string(),
            "The symbol 'F_1' already exists."
        );
    }

    #[test]
    fn test_plain_executable_alias() {
        let table = SymbolTable::new();
        let f = function("Less", 2);
        table.insert("Less", f.clone()).unwrap();
        table.insert_plain("SORT_ASCENDING", f.clone()).unwrap();
        assert!(table.get("SORT_ASCENDING").unwrap().ptr_eq(&f));
    }

    #[test]
    fn test_deep_duplicate_copies_values() {
        let table = SymbolTable::new();
        let x = Value::integer(1);
        table.insert("x", x.clone()).unwrap();

        let shallow = table.duplicate(CloneKind::Shallow);
        assert!(shallow.get("x").unwrap().ptr_eq(&x));

        let deep = table.duplicate(CloneKind::Deep);
        let copy = deep.get("x").unwrap();
        assert!(!copy.ptr_eq(&x));
        assert_eq!(copy, x);
    }
}
