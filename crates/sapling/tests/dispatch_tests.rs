//! Call dispatch tests

use sapling::*;

fn runtime() -> Runtime {
    Runtime::new(EvalContext::new()).unwrap()
}

/// A routine that returns its argument count.
fn counter(name: &str, arity: usize) -> Value {
    let params = (0..arity).map(|i| Param::by_ref(format!("p{i}"))).collect();
    Value::function(name, params, move |_| Ok(Value::integer(arity as Integer))).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════
// Overload Selection
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_user_function_by_arity() {
    let mut rt = runtime();
    let max = Value::function("Max", vec![Param::by_ref("x"), Param::by_ref("y")], |rt| {
        let (x, y) = (rt.param("x")?, rt.param("y")?);
        Ok(if x.less_than(&y)? { y } else { x })
    })
    .unwrap();
    rt.env().insert("Max", max).unwrap();

    let result = rt
        .call("Max", vec![Value::integer(3), Value::integer(5)])
        .unwrap();
    assert_eq!(result.as_integer().unwrap(), 5);

    let err = rt.call("Max", vec![Value::integer(3)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoSuchSymbol);
    assert_eq!(err.to_string(), "The symbol 'Max_1' does not exist.");
}

#[test]
fn test_overloads_share_a_name() {
    let mut rt = runtime();
    rt.env().insert("F", counter("F", 1)).unwrap();
    rt.env().insert("F", counter("F", 2)).unwrap();

    let one = rt.call("F", vec![Value::integer(0)]).unwrap();
    assert_eq!(one.as_integer().unwrap(), 1);
    let two = rt
        .call("F", vec![Value::integer(0), Value::integer(0)])
        .unwrap();
    assert_eq!(two.as_integer().unwrap(), 2);

    let args = vec![Value::integer(0), Value::integer(0), Value::integer(0)];
    let err = rt.call("F", args).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoSuchSymbol);
}

#[test]
fn test_mangled_name_resolves_overload() {
    let mut rt = runtime();
    rt.env().insert("F", counter("F", 2)).unwrap();
    assert!(rt.env().exists("F_2"));
    assert!(!rt.env().exists("F_3"));

    let f = rt.env().lookup("F_2").unwrap();
    let result = rt
        .call_value(&f, vec![Value::null(), Value::null()])
        .unwrap();
    assert_eq!(result.as_integer().unwrap(), 2);
}

#[test]
fn test_duplicate_overload_rejected() {
    let rt = runtime();
    rt.env().insert("G", counter("G", 1)).unwrap();
    let err = rt.env().insert("G", counter("G", 1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateSymbol);
    assert_eq!(err.to_string(), "The symbol 'G_1' already exists.");
}

#[test]
fn test_call_non_executable() {
    let mut rt = runtime();
    let err = rt.call_value(&Value::integer(1), Vec::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IllegalCast);
}

// ═══════════════════════════════════════════════════════════════════════
// Parameter Binding
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_reference_and_value_parameters() {
    let mut rt = runtime();
    let params = vec![Param::by_ref("r"), Param::by_value("v")];
    let overwrite = Value::function("Overwrite", params, |rt| {
        rt.param("r")?.assign(&Value::integer(99))?;
        rt.param("v")?.assign(&Value::integer(99))?;
        Ok(Value::null())
    })
    .unwrap();

    let (r, v) = (Value::integer(1), Value::integer(2));
    rt.call_value(&overwrite, vec![r.clone(), v.clone()])
        .unwrap();

    assert_eq!(r.as_integer().unwrap(), 99);
    assert_eq!(v.as_integer().unwrap(), 2);
}

#[test]
fn test_value_parameter_copies_containers() {
    let mut rt = runtime();
    let append = Value::function("Grow", vec![Param::by_value("A")], |rt| {
        rt.param("A")?.add(Value::integer(4))?;
        rt.param("A")?.length().map(|n| Value::integer(n as Integer))
    })
    .unwrap();

    let array = Value::array(1, vec![Value::integer(1)]);
    let inner_len = rt.call_value(&append, vec![array.clone()]).unwrap();
    assert_eq!(inner_len.as_integer().unwrap(), 2);
    assert_eq!(array.length().unwrap(), 1);
}

#[test]
fn test_locked_reference_argument_rejects_writes() {
    let mut rt = runtime();
    let constant = Value::integer(1).locked();
    let err = rt.call("Inc", vec![constant.clone()]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueLocked);
    assert_eq!(constant.as_integer().unwrap(), 1);
}

#[test]
fn test_executable_argument_is_callable() {
    let mut rt = runtime();
    let apply = Value::function(
        "Apply",
        vec![Param::by_ref("f"), Param::by_ref("x")],
        |rt| {
            let (f, x) = (rt.param("f")?, rt.param("x")?);
            rt.call_value(&f, vec![x])
        },
    )
    .unwrap();
    let double = Value::function("Double", vec![Param::by_ref("n")], |rt| {
        Ok(Value::integer(rt.param("n")?.as_integer()? * 2))
    })
    .unwrap();

    let result = rt
        .call_value(&apply, vec![double, Value::integer(21)])
        .unwrap();
    assert_eq!(result.as_integer().unwrap(), 42);
}

// ═══════════════════════════════════════════════════════════════════════
// Frames and Lifecycle
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_frame_popped_on_both_exits() {
    let mut rt = runtime();
    let depth = rt.env().depth();

    rt.call("Maximum", vec![Value::integer(1), Value::integer(2)])
        .unwrap();
    assert_eq!(rt.env().depth(), depth);

    rt.call("Div", vec![Value::integer(1), Value::integer(0)])
        .unwrap_err();
    assert_eq!(rt.env().depth(), depth);
}

#[test]
fn test_parameters_shadow_globals() {
    let mut rt = runtime();
    rt.env().insert("x", Value::integer(1)).unwrap();
    let read_x = Value::function("ReadX", vec![Param::by_ref("x")], |rt| rt.param("x")).unwrap();

    let inner = rt.call_value(&read_x, vec![Value::integer(7)]).unwrap();
    assert_eq!(inner.as_integer().unwrap(), 7);
    assert_eq!(rt.env().lookup("x").unwrap().as_integer().unwrap(), 1);
}

#[test]
fn test_call_state_machine() {
    let mut rt = runtime();
    let call = Call::resolve(rt.env(), "Maximum", vec![Value::integer(1), Value::integer(2)])
        .unwrap();
    assert_eq!(call.state(), CallState::Resolved);
    assert_eq!(call.callable().arity(), 2);
    let result = call.execute(&mut rt).unwrap();
    assert_eq!(result.as_integer().unwrap(), 2);
}

#[test]
fn test_unbounded_recursion_overflows() {
    let mut rt = Runtime::new(EvalContext::new().with_max_stack_depth(16)).unwrap();
    let recurse = Value::function("Recurse", Vec::new(), |rt| rt.call("Recurse", Vec::new()))
        .unwrap();
    rt.env().insert("Recurse", recurse).unwrap();

    let err = rt.call("Recurse", Vec::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StackOverflowError);
    assert_eq!(rt.env().depth(), 1);
    assert_eq!(rt.call_depth(), 0);
}

// ═══════════════════════════════════════════════════════════════════════
// Declared Arrays
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_declared_array_fill_and_range() {
    let mut rt = runtime();
    let ty = TypeDescriptor::array(1, 3, TypeDescriptor::Integer, RangePolicy::Error).unwrap();
    let array = Value::type_descriptor(ty).declare().unwrap();

    for n in [10, 20, 30] {
        rt.call("Append", vec![array.clone(), Value::integer(n)])
            .unwrap();
    }

    assert_eq!(array.bounds().unwrap(), (1, 3));
    assert_eq!(
        array.element(&Value::integer(2)).unwrap().as_integer().unwrap(),
        20
    );
    let err = array.element(&Value::integer(4)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RangeError);
}
