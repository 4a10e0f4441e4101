//! Ownership and error propagation across the public API

use jscbind::{JsContext, JsError, JsObject, JsString, JsValue, Operation};
use serial_test::serial;

#[test]
#[serial]
fn owned_values_survive_collection() {
    let ctx = JsContext::new().unwrap();
    let values: Vec<JsValue> = (0..64)
        .map(|i| ctx.eval(&format!("({{ id: {i}, payload: 'x'.repeat(1024) }})")).unwrap())
        .collect();

    // churn the heap so unprotected objects would be reclaimed
    ctx.eval("for (let i = 0; i < 10000; i++) { ({ junk: new Array(16) }); }")
        .unwrap();
    ctx.gc();

    for (i, value) in values.iter().enumerate() {
        let obj = value.clone().into_object().unwrap();
        assert_eq!(obj.get_property("id").unwrap().to_number().unwrap(), i as f64);
    }
}

#[test]
#[serial]
fn converted_object_outlives_source_value() {
    let ctx = JsContext::new().unwrap();
    let obj: JsObject = ctx.eval("({ kept: true })").unwrap().into_object().unwrap();
    ctx.gc();
    assert!(obj.get_property("kept").unwrap().to_bool());
}

#[test]
fn error_outlives_context() {
    let err = {
        let ctx = JsContext::new().unwrap();
        let func = ctx
            .eval("(function () { throw new Error('gone'); })")
            .unwrap()
            .into_object()
            .unwrap();
        func.call_as_function(&[]).unwrap_err()
    };

    assert_eq!(err.to_string(), "Exception calling JS function: Error: gone");
    assert!(err.stack_trace().is_some());
}

#[test]
fn json_pipeline() {
    let ctx = JsContext::new().unwrap();
    let input = ctx.from_json(r#"{"items":[3,1,2]}"#).unwrap();
    let sort = ctx
        .eval("(function (o) { return { items: o.items.slice().sort() }; })")
        .unwrap()
        .into_object()
        .unwrap();

    let sorted = sort.call_as_function(&[&input]).unwrap();
    assert_eq!(sorted.to_json_string(0).unwrap(), r#"{"items":[1,2,3]}"#);
    // the input was not mutated
    assert_eq!(input.to_json().unwrap(), r#"{"items":[3,1,2]}"#);
}

#[test]
fn nested_exception_keeps_innermost_error() {
    let ctx = JsContext::new().unwrap();
    ctx.eval(
        "function inner() { null.boom; }
         function outer() { inner(); }",
    )
    .unwrap();

    let outer = ctx.get_global("outer").unwrap().into_object().unwrap();
    let err = outer.call_as_function(&[]).unwrap_err();

    assert_eq!(err.operation(), Some(Operation::Call));
    assert_eq!(err.error_type(), "TypeError");
    let exception = err.exception().unwrap();
    assert!(exception.stack.as_deref().unwrap_or_default().contains("inner"));
}

#[test]
fn missing_global_function() {
    let ctx = JsContext::new().unwrap();
    let err = ctx.get_global("notThere").unwrap().into_object().unwrap_err();
    assert!(matches!(
        err,
        JsError::Execution {
            operation: Operation::ToObject,
            ..
        }
    ));
}

#[test]
fn interned_property_name_reused() {
    let ctx = JsContext::new().unwrap();
    let name = JsString::new("id").unwrap();
    assert_eq!(name.len(), 2);

    for i in 0..3 {
        let obj = ctx.eval(&format!("({{ id: {i} }})")).unwrap().into_object().unwrap();
        let id = obj.get_property_named(&name).unwrap();
        assert_eq!(id.to_number().unwrap(), i as f64);
    }
}
