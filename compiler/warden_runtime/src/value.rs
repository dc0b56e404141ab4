//! The script value model.
//!
//! [`Value`] is a closed enum: every kind implements every coercion, so the
//! "unimplemented abstract coercion" fault of an open class hierarchy cannot
//! occur. Coercions and operators that may re-enter script code return a
//! [`Step`](crate::Step); see [`coerce`] and [`operators`].
//!
//! # Singletons
//!
//! `undefined`, `null`, `true`, `false`, `NaN` and `0` carry no heap data,
//! so every instance of them is indistinguishable from every other. The
//! empty string shares one allocation per thread. [`Value::same_ref`] is
//! therefore a valid strict-equality test for all of them.

mod coerce;
mod member;
mod number;
mod object;
mod operators;

pub use coerce::PreferredType;
pub use number::{number_to_string, string_to_number, to_int32, to_integer, to_uint32};
pub use object::{ArrayValue, FunctionData, ObjectValue};

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use warden_ir::NodeId;

use crate::bridge::{create_native_bookmark, BridgeValue, HostFault, HostValue, SmartLink};
use crate::realm::Realm;
use crate::step::Step;

thread_local! {
    static EMPTY_STRING: Rc<str> = Rc::from("");
}

/// Nesting depth after which debug strings stop descending into arrays.
const DEBUG_DEPTH: usize = 3;

#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(Rc<str>),
    Object(Rc<RefCell<ObjectValue>>),
    Array(Rc<RefCell<ArrayValue>>),
    /// Unrestricted wrapper over a host object.
    Bridge(Rc<BridgeValue>),
    /// Allow-list guarded wrapper over a host object.
    Link(Rc<SmartLink>),
}

impl Value {
    pub const UNDEFINED: Value = Value::Undefined;
    pub const NULL: Value = Value::Null;
    pub const TRUE: Value = Value::Boolean(true);
    pub const FALSE: Value = Value::Boolean(false);
    pub const NAN: Value = Value::Number(f64::NAN);
    pub const ZERO: Value = Value::Number(0.0);

    pub fn empty_string() -> Value {
        Value::String(EMPTY_STRING.with(Rc::clone))
    }

    pub fn string(text: impl AsRef<str>) -> Value {
        let text = text.as_ref();
        if text.is_empty() {
            Value::empty_string()
        } else {
            Value::String(Rc::from(text))
        }
    }

    #[inline]
    pub fn number(n: f64) -> Value {
        Value::Number(n)
    }

    #[inline]
    pub fn boolean(b: bool) -> Value {
        Value::Boolean(b)
    }

    pub fn object() -> Value {
        Value::Object(Rc::new(RefCell::new(ObjectValue::new())))
    }

    pub fn object_with_prototype(prototype: Option<Value>) -> Value {
        Value::Object(Rc::new(RefCell::new(ObjectValue::with_prototype(prototype))))
    }

    /// A script function backed by the annotated function node `node`. Gets
    /// a fresh `prototype` object for use by `new`.
    pub fn function(node: NodeId, name: Option<&str>) -> Value {
        let mut object = ObjectValue::function(FunctionData {
            node,
            name: name.map(str::to_string),
        });
        object.set("prototype", Value::object());
        Value::Object(Rc::new(RefCell::new(object)))
    }

    pub fn array(elements: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(ArrayValue::new(elements))))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Value::Undefined | Value::Null | Value::Boolean(_) | Value::Number(_) | Value::String(_)
        )
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_callable(&self) -> bool {
        match self {
            Value::Object(object) => object.borrow().is_function(),
            Value::Bridge(bridge) => bridge.native().is_callable(),
            Value::Link(link) => link.native().is_callable(),
            _ => false,
        }
    }

    /// `!!value`.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Object(_) | Value::Array(_) | Value::Bridge(_) | Value::Link(_) => true,
        }
    }

    /// The `typeof` name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            _ if self.is_callable() => "function",
            Value::Null | Value::Object(_) | Value::Array(_) | Value::Bridge(_) | Value::Link(_) => {
                "object"
            }
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Reference identity. Heap kinds compare by allocation, the rest by
    /// content (bit pattern for numbers).
    pub fn same_ref(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Bridge(a), Value::Bridge(b)) => Rc::ptr_eq(a, b),
            (Value::Link(a), Value::Link(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// `===` without the step wrapper.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            _ => self.same_ref(other),
        }
    }

    pub fn type_of(&self) -> Step<Value> {
        Step::ready(Value::string(self.type_name()))
    }

    /// Logical negation through `truthy`.
    pub fn not(&self) -> Step<Value> {
        Step::ready(Value::Boolean(!self.truthy()))
    }

    /// Short human-readable rendering for error messages and logs.
    pub fn debug_string(&self) -> String {
        self.debug_string_at(0)
    }

    fn debug_string_at(&self, depth: usize) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => number_to_string(*n),
            Value::String(s) => s.to_string(),
            Value::Object(object) => match object.borrow().function_data() {
                Some(FunctionData {
                    name: Some(name), ..
                }) => format!("[Function: {name}]"),
                Some(_) => "[Function]".to_string(),
                None => "[object Object]".to_string(),
            },
            Value::Array(_) if depth >= DEBUG_DEPTH => "[...]".to_string(),
            Value::Array(array) => {
                let items: Vec<String> = array
                    .borrow()
                    .elements()
                    .iter()
                    .map(|item| item.debug_string_at(depth + 1))
                    .collect();
                format!("[{}]", items.join(","))
            }
            Value::Bridge(bridge) => bridge.debug_string(),
            Value::Link(link) => link.debug_string(),
        }
    }

    /// Bring a host value into the script.
    ///
    /// Primitives never need a realm. Host objects first resolve through
    /// the bookmark table, then through the realm's identity cache; without
    /// a realm that last step is an integration fault.
    pub fn from_native(native: HostValue, realm: Option<&Realm>) -> Result<Value, HostFault> {
        match native {
            HostValue::Undefined => Ok(Value::Undefined),
            HostValue::Null => Ok(Value::Null),
            HostValue::Bool(b) => Ok(Value::Boolean(b)),
            HostValue::Number(n) => Ok(Value::Number(n)),
            HostValue::String(s) => Ok(Value::string(s)),
            HostValue::Array(items) => items
                .into_iter()
                .map(|item| Value::from_native(item, realm))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::array),
            HostValue::Object(object) => {
                if let Some(value) = object.bookmarked_value() {
                    return Ok(value);
                }
                match realm {
                    Some(realm) => Ok(realm.bridge(object)),
                    None => Err(HostFault::MissingRealm {
                        native: object.display(),
                    }),
                }
            }
        }
    }

    /// The host-side view of this value. Script objects cross as bookmarks
    /// so they come back as the same value.
    pub fn to_native(&self) -> HostValue {
        match self {
            Value::Undefined => HostValue::Undefined,
            Value::Null => HostValue::Null,
            Value::Boolean(b) => HostValue::Bool(*b),
            Value::Number(n) => HostValue::Number(*n),
            Value::String(s) => HostValue::String(s.to_string()),
            Value::Array(array) => {
                HostValue::Array(array.borrow().elements().iter().map(Value::to_native).collect())
            }
            Value::Bridge(bridge) => HostValue::Object(Rc::clone(bridge.native())),
            Value::Link(link) => HostValue::Object(Rc::clone(link.native())),
            Value::Object(_) => HostValue::Object(create_native_bookmark(self)),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("Undefined"),
            Value::Null => f.write_str("Null"),
            Value::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::String(s) => f.debug_tuple("String").field(&&**s).finish(),
            Value::Object(_) => write!(f, "Object({})", self.debug_string()),
            Value::Array(_) => write!(f, "Array({})", self.debug_string()),
            Value::Bridge(_) => write!(f, "Bridge({})", self.debug_string()),
            Value::Link(_) => write!(f, "Link({})", self.debug_string()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}
