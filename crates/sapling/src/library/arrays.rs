//! Array routines and the comparators they take

use super::{alias, by_ref, define};
use crate::environment::Environment;
use crate::error::{Result, RuntimeError};
use crate::runtime::Runtime;
use crate::value::{Integer, Param, Value};

pub(super) fn install(env: &Environment) -> Result<()> {
    define(
        env,
        "Append",
        vec![Param::by_ref("A"), Param::by_value("elem")],
        |rt| {
            rt.param("A")?.add(rt.param("elem")?)?;
            Ok(Value::null())
        },
    )?;
    define(
        env,
        "Insert",
        vec![
            Param::by_ref("A"),
            Param::by_ref("pos"),
            Param::by_value("elem"),
        ],
        |rt| {
            let position = rt.param("pos")?.as_integer()?;
            rt.param("A")?.insert_at(rt.param("elem")?, position)?;
            Ok(Value::null())
        },
    )?;
    define(env, "Swap", by_ref(&["A", "index1", "index2"]), |rt| {
        let a = rt.param("index1")?.as_integer()?;
        let b = rt.param("index2")?.as_integer()?;
        rt.param("A")?.swap(a, b)?;
        Ok(Value::null())
    })?;

    define(env, "Sort", by_ref(&["A", "compareF"]), |rt| {
        let (array, compare) = (rt.param("A")?, rt.param("compareF")?);
        sort(rt, &array, &compare)?;
        Ok(Value::null())
    })?;
    define(env, "Find", by_ref(&["A", "elem", "compareF"]), |rt| {
        let (array, elem, compare) = (rt.param("A")?, rt.param("elem")?, rt.param("compareF")?);
        Ok(Value::integer(find(rt, &array, &elem, &compare)?))
    })?;
    define(env, "FindSorted", by_ref(&["A", "elem", "compareF"]), |rt| {
        let (array, elem, compare) = (rt.param("A")?, rt.param("elem")?, rt.param("compareF")?);
        Ok(Value::integer(find_sorted(rt, &array, &elem, &compare)?))
    })?;

    define(env, "CompareLessThan", by_ref(&["arg1", "arg2"]), |rt| {
        let (a, b) = (rt.param("arg1")?, rt.param("arg2")?);
        Ok(Value::boolean(a.less_than(&b)?))
    })?;
    define(env, "CompareGreaterThan", by_ref(&["arg1", "arg2"]), |rt| {
        let (a, b) = (rt.param("arg1")?, rt.param("arg2")?);
        Ok(Value::boolean(b.less_than(&a)?))
    })?;
    define(env, "CompareEqual", by_ref(&["arg1", "arg2"]), |rt| {
        let (a, b) = (rt.param("arg1")?, rt.param("arg2")?);
        Ok(Value::boolean(a.equals(&b)?))
    })?;

    alias(env, "SORT_ASCENDING", "CompareLessThan", 2)?;
    alias(env, "SORT_DESCENDING", "CompareGreaterThan", 2)?;
    alias(env, "EQUAL", "CompareEqual", 2)
}

/// Call a two-argument predicate.
fn holds(rt: &mut Runtime, predicate: &Value, a: &Value, b: &Value) -> Result<bool> {
    rt.call_value(predicate, vec![a.clone(), b.clone()])?
        .as_boolean()
}

/// Stable merge sort of an Array's elements by a "comes before" predicate.
fn sort(rt: &mut Runtime, array: &Value, before: &Value) -> Result<()> {
    let items = array.elements()?;
    let sorted = merge_sort(items, &mut |a, b| holds(rt, before, a, b))?;
    array.set_elements(sorted)
}

fn merge_sort(
    mut items: Vec<Value>,
    before: &mut impl FnMut(&Value, &Value) -> Result<bool>,
) -> Result<Vec<Value>> {
    if items.len() <= 1 {
        return Ok(items);
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, before)?;
    let right = merge_sort(right, before)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => before(r, l)?,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        merged.extend(if take_right { right.next() } else { left.next() });
    }
    Ok(merged)
}

/// First index whose element `equal` accepts against `elem`, else
/// `finish + 1`.
fn find(rt: &mut Runtime, array: &Value, elem: &Value, equal: &Value) -> Result<Integer> {
    let start = array.bounds()?.0;
    let items = array.elements()?;
    for (offset, item) in items.iter().enumerate() {
        if holds(rt, equal, item, elem)? {
            return index_from(i128::from(start) + offset as i128);
        }
    }
    index_from(i128::from(start) + items.len() as i128)
}

/// Binary search of an Array sorted by `before`. Returns the index of a
/// matching element, or the position where `elem` would be inserted.
fn find_sorted(rt: &mut Runtime, array: &Value, elem: &Value, before: &Value) -> Result<Integer> {
    let start = i128::from(array.bounds()?.0);
    let (mut low, mut high) = (start, start + array.length()? as i128 - 1);
    while low <= high {
        let mid = low + (high - low) / 2;
        let item = array.element_at(index_from(mid)?)?;
        if holds(rt, before, &item, elem)? {
            low = mid + 1;
        } else if holds(rt, before, elem, &item)? {
            high = mid - 1;
        } else {
            return index_from(mid);
        }
    }
    index_from(high + 1)
}

/// Narrow a computed index, which can sit one past `Integer::MAX`.
fn index_from(index: i128) -> Result<Integer> {
    Integer::try_from(index).map_err(|_| {
        RuntimeError::range(format!("The index {index} is not a representable Integer."))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EvalContext;
    use pretty_assertions::assert_eq;

    fn ints(values: &[Integer]) -> Vec<Value> {
        values.iter().map(|v| Value::integer(*v)).collect()
    }

    fn as_ints(array: &Value) -> Vec<Integer> {
        array
            .elements()
            .unwrap()
            .iter()
            .map(|v| v.as_integer().unwrap())
            .collect()
    }

    #[test]
    fn test_merge_sort_is_stable() {
        let items = vec![
            Value::real(2.0),
            Value::integer(1),
            Value::integer(2),
        ];
        let first_two = items[0].clone();
        let sorted = merge_sort(items, &mut |a, b| a.less_than(b)).unwrap();
        assert_eq!(sorted[0].as_integer().unwrap(), 1);
        assert!(sorted[1].ptr_eq(&first_two));
    }

    #[test]
    fn test_sort_with_aliases() {
        let mut rt = Runtime::new(EvalContext::new()).unwrap();
        let array = Value::array(1, ints(&[3, 1, 2]));
        let ascending = rt.env().lookup("SORT_ASCENDING").unwrap();
        rt.call("Sort", vec![array.clone(), ascending]).unwrap();
        assert_eq!(as_ints(&array), vec![1, 2, 3]);

        let descending = rt.env().lookup("SORT_DESCENDING").unwrap();
        rt.call("Sort", vec![array.clone(), descending]).unwrap();
        assert_eq!(as_ints(&array), vec![3, 2, 1]);
    }

    #[test]
    fn test_find_and_find_sorted() {
        let mut rt = Runtime::new(EvalContext::new()).unwrap();
        let array = Value::array(5, ints(&[10, 20, 30]));
        let equal = rt.env().lookup("EQUAL").unwrap();
        let less = rt.env().lookup("SORT_ASCENDING").unwrap();

        let found = rt
            .call("Find", vec![array.clone(), Value::integer(20), equal.clone()])
            .unwrap();
        assert_eq!(found.as_integer().unwrap(), 6);
        let missing = rt
            .call("Find", vec![array.clone(), Value::integer(99), equal])
            .unwrap();
        assert_eq!(missing.as_integer().unwrap(), 8);

        let found = rt
            .call("FindSorted", vec![array.clone(), Value::integer(30), less.clone()])
            .unwrap();
        assert_eq!(found.as_integer().unwrap(), 7);
        let insertion = rt
            .call("FindSorted", vec![array, Value::integer(15), less])
            .unwrap();
        assert_eq!(insertion.as_integer().unwrap(), 6);
    }

    #[test]
    fn test_append_binds_element_by_value() {
        let mut rt = Runtime::new(EvalContext::new()).unwrap();
        let array = Value::array(0, Vec::new());
        let elem = Value::integer(4);
        rt.call("Append", vec![array.clone(), elem.clone()]).unwrap();
        elem.assign(&Value::integer(5)).unwrap();
        assert_eq!(as_ints(&array), vec![4]);
    }
}
