#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::cell::RefCell;

use pretty_assertions::assert_eq;
use warden_ir::NodeId;

use super::*;
use crate::bridge::HostValue;
use crate::completion::Completion;
use crate::step::Request;
use crate::test_helpers::{message_of, run_with, value, FakeHost};

fn method(name: &str) -> Value {
    Value::function(NodeId::new(1), Some(name))
}

fn name_of(callee: &Value) -> String {
    match callee {
        Value::Object(object) => object
            .borrow()
            .function_data()
            .and_then(|data| data.name.clone())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// An object whose conversion methods are script functions.
fn with_methods(names: &[&str]) -> Value {
    let object = Value::object();
    if let Value::Object(inner) = &object {
        for name in names {
            inner.borrow_mut().set(*name, method(name));
        }
    }
    object
}

#[test]
fn primitive_numbers() {
    let realm = Realm::new();
    let cases = [
        (Value::Undefined, f64::NAN),
        (Value::Null, 0.0),
        (Value::TRUE, 1.0),
        (Value::FALSE, 0.0),
        (Value::string(" 12 "), 12.0),
        (Value::empty_string(), 0.0),
    ];
    for (v, expected) in cases {
        let n = value(v.to_number(&realm));
        if expected.is_nan() {
            assert!(n.is_nan(), "{v:?}");
        } else {
            assert_eq!(n, expected, "{v:?}");
        }
    }
}

#[test]
fn primitive_strings() {
    let realm = Realm::new();
    assert_eq!(&*value(Value::number(0.5).to_string_value(&realm)), "0.5");
    assert_eq!(&*value(Value::Null.to_string_value(&realm)), "null");
    assert_eq!(&*value(Value::Undefined.to_string_value(&realm)), "undefined");
    assert_eq!(&*value(Value::FALSE.to_string_value(&realm)), "false");
}

#[test]
fn primitive_coercions_never_suspend() {
    let realm = Realm::new();
    assert!(Value::string("7").to_number(&realm).is_ready());
    assert!(Value::number(7.0).to_string_value(&realm).is_ready());
    assert!(Value::TRUE
        .to_primitive(PreferredType::Number, &realm)
        .is_ready());
}

#[test]
fn plain_objects_use_the_intrinsic_to_string() {
    let realm = Realm::new();
    assert_eq!(
        &*value(Value::object().to_string_value(&realm)),
        "[object Object]"
    );
    assert!(value(Value::object().to_number(&realm)).is_nan());
    assert_eq!(
        &*value(method("f").to_string_value(&realm)),
        "function () { [code] }"
    );
}

#[test]
fn arrays_join_with_commas() {
    let realm = Realm::new();
    let array = Value::array(vec![
        Value::number(1.0),
        Value::Null,
        Value::string("x"),
        Value::array(vec![Value::number(2.0), Value::number(3.0)]),
        Value::Undefined,
    ]);
    assert_eq!(&*value(array.to_string_value(&realm)), "1,,x,2,3,");
    assert_eq!(value(Value::array(vec![Value::number(4.0)]).to_number(&realm)), 4.0);
    assert_eq!(value(Value::array(Vec::new()).to_number(&realm)), 0.0);
}

#[test]
fn cyclic_arrays_join_as_empty() {
    let realm = Realm::new();
    let array = Value::array(vec![Value::number(1.0)]);
    value(array.put("1", array.clone(), &realm));
    assert_eq!(&*value(array.to_string_value(&realm)), "1,");
    // The guard is released afterwards.
    assert_eq!(&*value(array.to_string_value(&realm)), "1,");
}

#[test]
fn abandoned_join_releases_the_array() {
    let realm = Realm::new();
    let array = Value::array(vec![Value::number(1.0), with_methods(&["toString"])]);
    let abandoned = array.to_string_value(&realm);
    assert!(!abandoned.is_ready());
    drop(abandoned);

    let again = array.to_string_value(&realm);
    assert!(!again.is_ready());
    let flow = run_with(again, |request| match request {
        Request::Call { .. } => Step::ready(Value::string("x")),
        Request::Checkpoint => Step::ready(Value::Undefined),
    });
    assert_eq!(&*flow.unwrap(), "1,x");
}

#[test]
fn value_of_override_is_called_for_numbers() {
    let realm = Realm::new();
    let object = with_methods(&["valueOf"]);
    let receiver = object.clone();
    let flow = run_with(object.to_number(&realm), move |request| match request {
        Request::Call { callee, this, args } => {
            assert_eq!(name_of(&callee), "valueOf");
            assert!(this.same_ref(&receiver));
            assert!(args.is_empty());
            Step::ready(Value::number(42.0))
        }
        Request::Checkpoint => Step::ready(Value::Undefined),
    });
    assert_eq!(flow.unwrap(), 42.0);
}

#[test]
fn string_hint_prefers_to_string() {
    let realm = Realm::new();
    let object = with_methods(&["valueOf", "toString"]);
    let calls = RefCell::new(Vec::new());
    let flow = run_with(object.to_string_value(&realm), |request| match request {
        Request::Call { callee, .. } => {
            let name = name_of(&callee);
            calls.borrow_mut().push(name.clone());
            Step::ready(Value::string(format!("from {name}")))
        }
        Request::Checkpoint => Step::ready(Value::Undefined),
    });
    assert_eq!(&*flow.unwrap(), "from toString");
    assert_eq!(*calls.borrow(), vec!["toString".to_string()]);
}

#[test]
fn object_results_fall_through_to_the_next_method() {
    let realm = Realm::new();
    let object = with_methods(&["valueOf", "toString"]);
    let flow = run_with(
        object.to_primitive(PreferredType::Number, &realm),
        |request| match request {
            Request::Call { callee, .. } if name_of(&callee) == "valueOf" => {
                Step::ready(Value::object())
            }
            Request::Call { .. } => Step::ready(Value::string("7")),
            Request::Checkpoint => Step::ready(Value::Undefined),
        },
    );
    assert_eq!(flow.unwrap().as_str(), Some("7"));
}

#[test]
fn no_primitive_result_throws() {
    let realm = Realm::new();
    let object = with_methods(&["valueOf", "toString"]);
    let flow = run_with(object.to_number(&realm), |request| match request {
        Request::Call { .. } => Step::ready(Value::array(Vec::new())),
        Request::Checkpoint => Step::ready(Value::Undefined),
    });
    assert_eq!(
        message_of(&flow.unwrap_err()),
        "TypeError: Cannot convert object to primitive value"
    );
}

#[test]
fn throws_from_overrides_propagate() {
    let realm = Realm::new();
    let object = with_methods(&["valueOf"]);
    let flow = run_with(object.to_number(&realm), |request| match request {
        Request::Call { .. } => Step::throw(Completion::throw(Value::string("nope"))),
        Request::Checkpoint => Step::ready(Value::Undefined),
    });
    assert_eq!(flow.unwrap_err().value().as_str(), Some("nope"));
}

#[test]
fn inherited_overrides_are_found() {
    let realm = Realm::new();
    let proto = with_methods(&["toString"]);
    let object = Value::object_with_prototype(Some(proto));
    let flow = run_with(object.to_string_value(&realm), |request| match request {
        Request::Call { .. } => Step::ready(Value::string("inherited")),
        Request::Checkpoint => Step::ready(Value::Undefined),
    });
    assert_eq!(&*flow.unwrap(), "inherited");
}

#[test]
fn non_callable_overrides_are_skipped() {
    let realm = Realm::new();
    let object = Value::object();
    value(object.put("valueOf", Value::number(3.0), &realm));
    assert!(value(object.to_number(&realm)).is_nan());
}

#[test]
fn host_objects_checkpoint_before_coercing() {
    let realm = Realm::new();
    let host = realm.bridge(
        FakeHost::new("meter")
            .primitive(HostValue::Number(5.0))
            .shared(),
    );
    let step = host.to_number(&realm);
    assert!(!step.is_ready());
    assert_eq!(value(step), 5.0);

    let plain = realm.bridge(FakeHost::new("label").shared());
    assert_eq!(&*value(plain.to_string_value(&realm)), "label");
    assert!(value(plain.to_number(&realm)).is_nan());
}

#[test]
fn int32_coercion_of_strings() {
    let realm = Realm::new();
    assert_eq!(value(Value::string("3000000000").to_int32(&realm)), -1_294_967_296);
    assert_eq!(value(Value::string("-1").to_uint32(&realm)), u32::MAX);
    assert_eq!(value(Value::string("-2.9").to_integer(&realm)), -2.0);
}

#[test]
fn to_boolean_never_calls_overrides() {
    let object = with_methods(&["valueOf"]);
    assert!(object.to_boolean().is_ready());
    assert_eq!(value(object.to_boolean()).as_bool(), Some(true));
}
