//! Property access and calls.

use super::object::{self, array_index};
use super::Value;
use crate::bridge::Reference;
use crate::errors;
use crate::realm::Realm;
use crate::step::{Request, Step};

impl Value {
    /// Read property `name`. Kinds without structure throw.
    pub fn member(&self, name: &str, realm: &Realm) -> Step<Value> {
        match self {
            Value::Object(object) => Step::ready(object::lookup(object, name).unwrap_or_default()),
            Value::Array(array) => Step::ready(array.borrow().member(name)),
            Value::String(text) => Step::ready(string_member(text, name)),
            Value::Bridge(bridge) => bridge.member(name),
            Value::Link(link) => link.member(name),
            _ => Step::throw(errors::cannot_access_member(realm, name, &self.debug_string())),
        }
    }

    /// Write property `name`.
    pub fn put(&self, name: &str, value: Value, realm: &Realm) -> Step<()> {
        match self {
            Value::Object(object) => {
                object.borrow_mut().set(name, value);
                Step::ready(())
            }
            Value::Array(array) => {
                array.borrow_mut().put(name, value);
                Step::ready(())
            }
            Value::Bridge(bridge) => bridge.put(name, &value),
            Value::Link(link) => link.put(name, &value),
            _ => Step::throw(errors::cannot_access_member(realm, name, &self.debug_string())),
        }
    }

    /// Delete own property `name`, reporting whether it is gone.
    pub fn delete(&self, name: &str, realm: &Realm) -> Step<bool> {
        match self {
            Value::Object(object) => {
                object.borrow_mut().remove(name);
                Step::ready(true)
            }
            Value::Array(array) => Step::ready(array.borrow_mut().delete(name)),
            Value::Bridge(bridge) => bridge.delete(name),
            Value::Link(link) => link.delete(name),
            _ => Step::throw(errors::cannot_access_member(realm, name, &self.debug_string())),
        }
    }

    /// A handle on property `name` for compound assignment and deletion.
    /// Sandboxed wrappers bake their access policy into the handle.
    pub fn reference(&self, name: &str) -> Reference {
        match self {
            Value::Link(link) => link.reference(name),
            _ => Reference::open(self.clone(), name),
        }
    }

    /// Invoke this value. Script functions suspend on a
    /// [`Request::Call`]; host callables are invoked through the bridge.
    pub fn call(&self, this: Value, args: Vec<Value>, realm: &Realm) -> Step<Value> {
        match self {
            Value::Object(object) if object.borrow().is_function() => Step::request(Request::Call {
                callee: self.clone(),
                this,
                args,
            }),
            Value::Bridge(bridge) => bridge.call(&this, &args),
            Value::Link(link) => link.call(&this, &args),
            _ => Step::throw(errors::not_callable(realm, &self.debug_string())),
        }
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "string lengths stay far below 2^53"
)]
fn string_member(text: &str, name: &str) -> Value {
    if name == "length" {
        return Value::Number(text.encode_utf16().count() as f64);
    }
    array_index(name)
        .and_then(|index| text.encode_utf16().nth(index))
        .map_or(Value::Undefined, |unit| {
            Value::string(String::from_utf16_lossy(&[unit]))
        })
}
