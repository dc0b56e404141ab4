//! Script objects and arrays.
//!
//! Only as much structure as the coercion contract needs: a property bag
//! with a prototype link, and a dense element vector.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use warden_ir::NodeId;

use super::Value;

/// Marks an object as a script function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionData {
    /// The annotated function node holding the body.
    pub node: NodeId,
    pub name: Option<String>,
}

#[derive(Default)]
pub struct ObjectValue {
    properties: FxHashMap<String, Value>,
    pub(super) prototype: Option<Value>,
    function: Option<FunctionData>,
}

impl ObjectValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prototype(prototype: Option<Value>) -> Self {
        ObjectValue {
            prototype,
            ..Self::default()
        }
    }

    pub fn function(data: FunctionData) -> Self {
        ObjectValue {
            function: Some(data),
            ..Self::default()
        }
    }

    pub fn get_own(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn has_own(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.properties.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.properties.remove(name).is_some()
    }

    pub fn prototype(&self) -> Option<&Value> {
        self.prototype.as_ref()
    }

    /// Own property names, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.properties.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn function_data(&self) -> Option<&FunctionData> {
        self.function.as_ref()
    }

    pub fn is_function(&self) -> bool {
        self.function.is_some()
    }
}

/// Find `name` on `object` or along its prototype chain.
///
/// Only script objects take part in the chain; a non-object prototype ends
/// the walk.
pub(crate) fn lookup(object: &Rc<RefCell<ObjectValue>>, name: &str) -> Option<Value> {
    let mut current = Rc::clone(object);
    loop {
        let next = {
            let inner = current.borrow();
            if let Some(value) = inner.get_own(name) {
                return Some(value.clone());
            }
            match inner.prototype() {
                Some(Value::Object(proto)) => Rc::clone(proto),
                _ => return None,
            }
        };
        current = next;
    }
}

/// Whether `candidate` is `object` or has it on its prototype chain.
pub(crate) fn chain_contains(
    candidate: &Rc<RefCell<ObjectValue>>,
    object: &Rc<RefCell<ObjectValue>>,
) -> bool {
    let mut current = Rc::clone(candidate);
    loop {
        if Rc::ptr_eq(&current, object) {
            return true;
        }
        let next = match current.borrow().prototype() {
            Some(Value::Object(proto)) => Rc::clone(proto),
            _ => return false,
        };
        current = next;
    }
}

/// Writes past this many elements are dropped instead of allocating.
const MAX_DENSE_LENGTH: usize = 1 << 24;

/// A dense script array.
#[derive(Default)]
pub struct ArrayValue {
    elements: Vec<Value>,
    /// Set while the array is being joined, to cut cycles.
    pub(crate) joining: bool,
}

impl ArrayValue {
    pub fn new(elements: Vec<Value>) -> Self {
        ArrayValue {
            elements,
            joining: false,
        }
    }

    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.elements.get(index)
    }

    pub fn push(&mut self, value: Value) {
        self.elements.push(value);
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "array lengths stay far below 2^53"
    )]
    pub(crate) fn member(&self, name: &str) -> Value {
        if name == "length" {
            return Value::Number(self.elements.len() as f64);
        }
        array_index(name)
            .and_then(|index| self.elements.get(index))
            .cloned()
            .unwrap_or(Value::Undefined)
    }

    /// Store an element or resize through `length`. Other names are
    /// ignored: arrays carry no property bag.
    pub(crate) fn put(&mut self, name: &str, value: Value) {
        if name == "length" {
            if let Some(len) = value.as_number().and_then(exact_length) {
                self.elements.resize(len, Value::Undefined);
            }
            return;
        }
        if let Some(index) = array_index(name).filter(|index| *index < MAX_DENSE_LENGTH) {
            if index >= self.elements.len() {
                self.elements.resize(index + 1, Value::Undefined);
            }
            self.elements[index] = value;
        }
    }

    pub(crate) fn delete(&mut self, name: &str) -> bool {
        if let Some(slot) = array_index(name).and_then(|index| self.elements.get_mut(index)) {
            *slot = Value::Undefined;
        }
        name != "length"
    }
}

/// A canonical array index: decimal digits without leading zeros.
pub(crate) fn array_index(name: &str) -> Option<usize> {
    if name.len() > 1 && name.starts_with('0') {
        return None;
    }
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "checked to be a small non-negative integer first"
)]
fn exact_length(n: f64) -> Option<usize> {
    #[expect(clippy::cast_precision_loss, reason = "the limit is a small power of two")]
    let limit = MAX_DENSE_LENGTH as f64;
    (n >= 0.0 && n.fract() == 0.0 && n <= limit).then(|| n as usize)
}
