//! Environment tests

use sapling::*;

fn int(env: &Environment, key: &str) -> Integer {
    env.lookup(key).unwrap().as_integer().unwrap()
}

// ═══════════════════════════════════════════════════════════════════════
// Basic Operations
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_environment_new_is_empty() {
    let env = Environment::new();
    assert_eq!(env.num(), 0);
    assert_eq!(env.depth(), 0);
    assert_eq!(env.max_depth(), 1000);
}

#[test]
fn test_environment_insert_and_lookup() {
    let mut env = Environment::new();
    env.push().unwrap();
    env.insert("a", Value::integer(1)).unwrap();
    env.insert("b", Value::string("two")).unwrap();

    assert_eq!(int(&env, "a"), 1);
    assert_eq!(env.lookup("b").unwrap().as_string().unwrap(), "two");
    assert!(env.exists("a"));
    assert!(!env.exists("c"));
    assert_eq!(env.num(), 2);
}

#[test]
fn test_lookup_missing_symbol() {
    let env = Environment::new();
    let err = env.lookup("ghost").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoSuchSymbol);
    assert_eq!(err.to_string(), "The symbol 'ghost' does not exist.");
}

#[test]
fn test_duplicate_in_same_frame() {
    let mut env = Environment::new();
    env.push().unwrap();
    env.insert("x", Value::integer(1)).unwrap();
    let err = env.insert("x", Value::integer(2)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateSymbol);
    assert_eq!(err.to_string(), "The symbol 'x' already exists.");
    assert_eq!(int(&env, "x"), 1);
}

#[test]
fn test_lookup_aliases_binding() {
    let mut env = Environment::new();
    env.push().unwrap();
    env.insert("x", Value::integer(1)).unwrap();
    env.lookup("x").unwrap().assign(&Value::integer(5)).unwrap();
    assert_eq!(int(&env, "x"), 5);
}

// ═══════════════════════════════════════════════════════════════════════
// Scoping and Shadowing
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_inner_frame_shadows_outer() {
    let mut env = Environment::new();
    env.push().unwrap();
    env.insert("x", Value::integer(1)).unwrap();
    env.push().unwrap();
    env.insert("x", Value::integer(2)).unwrap();
    env.insert("y", Value::integer(3)).unwrap();

    assert_eq!(int(&env, "x"), 2);
    assert!(env.pop());
    assert_eq!(int(&env, "x"), 1);
    assert!(!env.exists("y"));
}

#[test]
fn test_frames_shadow_base() {
    let mut env = Environment::new();
    env.insert("`pi", Value::real(2.5)).unwrap();
    env.push().unwrap();
    env.insert("pi", Value::integer(3)).unwrap();

    assert_eq!(int(&env, "pi"), 3);
    let base = env.lookup("`pi").unwrap().as_real().unwrap();
    assert_eq!(base, 2.5);
}

#[test]
fn test_base_marker_inserts_from_any_depth() {
    let mut env = Environment::new();
    env.push().unwrap();
    env.push().unwrap();
    env.insert("`shared", Value::integer(9)).unwrap();
    env.pop();
    env.pop();
    assert_eq!(int(&env, "shared"), 9);
    assert_eq!(env.base().len(), 1);
}

#[test]
fn test_scope_guard_pops_frame() {
    let mut env = Environment::new();
    env.push().unwrap();
    {
        let guard = env.scope_guard().unwrap();
        guard.insert("tmp", Value::boolean(true)).unwrap();
        assert_eq!(guard.depth(), 2);
    }
    assert_eq!(env.depth(), 1);
    assert!(!env.exists("tmp"));
}

// ═══════════════════════════════════════════════════════════════════════
// Stack Limits
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_push_beyond_limit() {
    let mut env = Environment::with_max_depth(3);
    for _ in 0..3 {
        env.push().unwrap();
    }
    let err = env.push_table(SymbolTable::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StackOverflowError);
    assert_eq!(env.depth(), 3);
    assert_eq!(env.max_depth_attained(), 3);
}

#[test]
fn test_max_depth_attained_is_high_water_mark() {
    let mut env = Environment::new();
    env.push().unwrap();
    env.push().unwrap();
    env.pop();
    env.pop();
    assert_eq!(env.depth(), 0);
    assert_eq!(env.max_depth_attained(), 2);
}

// ═══════════════════════════════════════════════════════════════════════
// Overloads
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_mangle_round_trip() {
    assert_eq!(mangle("Max", 2), "Max_2");
    assert_eq!(demangle("Max_2"), Some(("Max", 2)));
    assert_eq!(demangle("snake_case_name"), None);
    assert_eq!(demangle("_3"), None);
}

#[test]
fn test_overloads_counted_separately() {
    let env = Environment::new();
    for arity in 0..3 {
        let params = (0..arity).map(|i| Param::by_ref(format!("p{i}"))).collect();
        let f = Value::function("F", params, |_| Ok(Value::null())).unwrap();
        env.insert("F", f).unwrap();
    }
    assert_eq!(env.num(), 3);
    assert!(env.lookup_overload("F", 1).is_ok());
    assert_eq!(
        env.lookup_overload("F", 3).unwrap_err().to_string(),
        "The symbol 'F_3' does not exist."
    );
    assert_eq!(env.base().keys(), vec!["F_0", "F_1", "F_2"]);
}

#[test]
fn test_unmangled_function_binding() {
    let env = Environment::new();
    let f = Value::function("F", vec![Param::by_ref("x")], |_| Ok(Value::null())).unwrap();
    env.insert_unmangled("callback", f).unwrap();
    assert!(env.lookup("callback").unwrap().is_executable());
    assert!(env.lookup_overload("callback", 1).is_err());
}

// ═══════════════════════════════════════════════════════════════════════
// Cloning
// ═══════════════════════════════════════════════════════════════════════

fn populated() -> Environment {
    let mut env = Environment::new();
    env.insert("`g", Value::integer(1)).unwrap();
    env.push().unwrap();
    env.insert("local", Value::integer(2)).unwrap();
    env
}

#[test]
fn test_minimal_clone_shares_base() {
    let env = populated();
    let clone = env.clone_with(CloneKind::Minimal).unwrap();

    assert!(clone.shares_base_with(&env));
    assert_eq!(clone.depth(), 1);
    assert!(!clone.exists("local"));

    clone.insert("`added", Value::integer(3)).unwrap();
    assert!(env.exists("added"));
}

#[test]
fn test_shallow_clone_shares_values() {
    let env = populated();
    let clone = env.clone_with(CloneKind::Shallow).unwrap();

    assert!(!clone.shares_base_with(&env));
    assert_eq!(clone.depth(), env.depth());
    clone
        .lookup("local")
        .unwrap()
        .assign(&Value::integer(20))
        .unwrap();
    assert_eq!(int(&env, "local"), 20);

    clone.insert("`only_in_clone", Value::null()).unwrap();
    assert!(!env.exists("only_in_clone"));
}

#[test]
fn test_deep_clone_copies_values() {
    let env = populated();
    let clone = env.clone_with(CloneKind::Deep).unwrap();

    clone.lookup("g").unwrap().assign(&Value::integer(10)).unwrap();
    assert_eq!(int(&env, "g"), 1);
    assert_eq!(int(&clone, "g"), 10);
    assert_eq!(clone.num(), env.num());
}

#[test]
fn test_deep_clone_keeps_library_constants_locked() {
    let rt = Runtime::new(EvalContext::new()).unwrap();
    let clone = rt.env().clone_with(CloneKind::Deep).unwrap();

    let original = rt.env().lookup("INTEGER_MAX").unwrap();
    let copied = clone.lookup("INTEGER_MAX").unwrap();
    assert!(!copied.ptr_eq(&original));
    assert!(copied.is_locked());
    let err = copied.assign(&Value::integer(7)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueLocked);
    assert_eq!(copied.as_integer().unwrap(), Integer::MAX);
}

#[test]
fn test_load_into_minimal_clone_reports_collisions() {
    let env = populated();
    let mut clone = env.clone_with(CloneKind::Minimal).unwrap();
    let err = env.load(&mut clone, CloneKind::Shallow).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateSymbol);
    assert_eq!(env.base().len(), 1);
}

#[test]
fn test_load_table_into_itself() {
    let table = SymbolTable::new();
    table.insert("x", Value::integer(1)).unwrap();
    assert!(table.load_into(&table, CloneKind::Deep).is_err());

    let empty = SymbolTable::new();
    empty.load_into(&empty, CloneKind::Shallow).unwrap();
    assert_eq!(empty.len(), 0);
}

#[test]
fn test_clear_empties_everything() {
    let mut env = populated();
    env.clear();
    assert_eq!(env.num(), 0);
    assert_eq!(env.depth(), 0);
}

#[test]
fn test_load_rejects_collisions() {
    let env = populated();
    let mut target = Environment::new();
    target.insert("g", Value::integer(5)).unwrap();
    let err = env.load(&mut target, CloneKind::Shallow).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateSymbol);
}

// ═══════════════════════════════════════════════════════════════════════
// Diagnostics
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_histogram_of_runtime() {
    let rt = Runtime::new(EvalContext::new()).unwrap();
    let histogram = rt.env().histogram();
    assert!(histogram.starts_with("Global Table:\n\n----\n0   |\n"));
    assert!(histogram.contains("System Table:"));
    assert!(histogram.ends_with(&format!("|{}\n", ">".repeat(74))));
}
