//! Type coercions.
//!
//! Primitive inputs convert synchronously and return ready steps. Objects
//! go through ToPrimitive, which may call script-defined `valueOf` or
//! `toString` overrides and therefore suspend. Host objects checkpoint
//! before the host is consulted.

use std::cell::RefCell;
use std::rc::Rc;
use std::vec;

use super::number::{self, number_to_string, string_to_number};
use super::object::{self, ArrayValue};
use super::Value;
use crate::bridge::{host_primitive, HostObject};
use crate::errors;
use crate::realm::Realm;
use crate::step::{checkpoint, Step};

/// The ToPrimitive hint.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PreferredType {
    #[default]
    Default,
    Number,
    String,
}

impl PreferredType {
    fn method_order(self) -> [&'static str; 2] {
        match self {
            PreferredType::String => ["toString", "valueOf"],
            PreferredType::Default | PreferredType::Number => ["valueOf", "toString"],
        }
    }
}

impl Value {
    /// Number value of a primitive; `None` for objects.
    pub(crate) fn primitive_to_number(&self) -> Option<f64> {
        match self {
            Value::Undefined => Some(f64::NAN),
            Value::Null => Some(0.0),
            Value::Boolean(b) => Some(f64::from(u8::from(*b))),
            Value::Number(n) => Some(*n),
            Value::String(s) => Some(string_to_number(s)),
            _ => None,
        }
    }

    /// String value of a primitive; `None` for objects.
    pub(crate) fn primitive_to_string(&self) -> Option<Rc<str>> {
        match self {
            Value::Undefined => Some(Rc::from("undefined")),
            Value::Null => Some(Rc::from("null")),
            Value::Boolean(b) => Some(Rc::from(if *b { "true" } else { "false" })),
            Value::Number(n) => Some(Rc::from(number_to_string(*n))),
            Value::String(s) => Some(Rc::clone(s)),
            _ => None,
        }
    }

    pub fn to_primitive(&self, hint: PreferredType, realm: &Realm) -> Step<Value> {
        match self {
            Value::Object(_) | Value::Array(_) => {
                ordinary_to_primitive(self.clone(), hint.method_order(), 0, realm.clone())
            }
            Value::Bridge(bridge) => host_to_primitive(Rc::clone(bridge.native())),
            Value::Link(link) => host_to_primitive(Rc::clone(link.native())),
            _ => Step::ready(self.clone()),
        }
    }

    pub fn to_number(&self, realm: &Realm) -> Step<f64> {
        if let Some(n) = self.primitive_to_number() {
            return Step::ready(n);
        }
        let realm = realm.clone();
        self.to_primitive(PreferredType::Number, &realm)
            .and_then(move |primitive| primitive.to_number(&realm))
    }

    pub fn to_number_value(&self, realm: &Realm) -> Step<Value> {
        self.to_number(realm).map(Value::Number)
    }

    pub fn to_string_value(&self, realm: &Realm) -> Step<Rc<str>> {
        if let Some(s) = self.primitive_to_string() {
            return Step::ready(s);
        }
        let realm = realm.clone();
        self.to_primitive(PreferredType::String, &realm)
            .and_then(move |primitive| primitive.to_string_value(&realm))
    }

    pub fn to_boolean(&self) -> Step<Value> {
        Step::ready(Value::Boolean(self.truthy()))
    }

    pub fn to_int32(&self, realm: &Realm) -> Step<i32> {
        self.to_number(realm).map(number::to_int32)
    }

    pub fn to_uint32(&self, realm: &Realm) -> Step<u32> {
        self.to_number(realm).map(number::to_uint32)
    }

    pub fn to_integer(&self, realm: &Realm) -> Step<f64> {
        self.to_number(realm).map(number::to_integer)
    }

    /// A callable own-or-inherited property usable as a conversion method.
    fn conversion_method(&self, name: &str) -> Option<Value> {
        match self {
            Value::Object(object) => object::lookup(object, name).filter(Value::is_callable),
            _ => None,
        }
    }
}

/// OrdinaryToPrimitive: try each method in `order`, skipping ones that are
/// missing or return an object.
fn ordinary_to_primitive(
    object: Value,
    order: [&'static str; 2],
    index: usize,
    realm: Realm,
) -> Step<Value> {
    let Some(&method) = order.get(index) else {
        return Step::throw(errors::no_primitive(&realm));
    };
    if let Some(callee) = object.conversion_method(method) {
        let this = object.clone();
        return callee
            .call(this, Vec::new(), &realm)
            .and_then(move |result| {
                if result.is_primitive() {
                    Step::ready(result)
                } else {
                    ordinary_to_primitive(object, order, index + 1, realm)
                }
            });
    }
    if method == "toString" {
        return intrinsic_to_string(&object, realm);
    }
    ordinary_to_primitive(object, order, index + 1, realm)
}

/// The built-in `toString` of objects without an override.
fn intrinsic_to_string(object: &Value, realm: Realm) -> Step<Value> {
    match object {
        Value::Array(array) => join(Rc::clone(array), realm),
        _ if object.is_callable() => Step::ready(Value::string("function () { [code] }")),
        _ => Step::ready(Value::string("[object Object]")),
    }
}

/// `Array.prototype.join(",")`. A cyclic reference joins as the empty
/// string.
fn join(array: Rc<RefCell<ArrayValue>>, realm: Realm) -> Step<Value> {
    let elements = {
        let mut inner = array.borrow_mut();
        if inner.joining {
            return Step::ready(Value::empty_string());
        }
        inner.joining = true;
        inner.elements().to_vec()
    };
    let guard = JoinGuard(array);
    join_from(elements.into_iter(), String::new(), true, realm).then(move |flow| {
        drop(guard);
        Step::from_flow(flow.map(Value::string))
    })
}

/// Marks an array as being joined until dropped, whether the join finishes
/// or its suspended step is abandoned.
struct JoinGuard(Rc<RefCell<ArrayValue>>);

impl Drop for JoinGuard {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.0.try_borrow_mut() {
            inner.joining = false;
        }
    }
}

fn join_from(
    mut rest: vec::IntoIter<Value>,
    mut out: String,
    mut first: bool,
    realm: Realm,
) -> Step<String> {
    while let Some(item) = rest.next() {
        if !first {
            out.push(',');
        }
        first = false;
        if item.is_nullish() {
            continue;
        }
        if let Some(text) = item.primitive_to_string() {
            out.push_str(&text);
            continue;
        }
        return item.to_string_value(&realm).and_then(move |text| {
            out.push_str(&text);
            join_from(rest, out, false, realm)
        });
    }
    Step::ready(out)
}

/// ToPrimitive of a host object: its declared primitive value, or its
/// textual form.
fn host_to_primitive(native: Rc<dyn HostObject>) -> Step<Value> {
    checkpoint().map(move |()| host_primitive(native.as_ref()))
}

#[cfg(test)]
mod tests;
