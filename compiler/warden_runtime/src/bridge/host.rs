//! The host side of the boundary.

use std::fmt;
use std::rc::Rc;

use super::ApiPolicy;
use crate::value::Value;

/// A value as the host sees it.
#[derive(Clone)]
pub enum HostValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<HostValue>),
    Object(Rc<dyn HostObject>),
}

impl HostValue {
    pub fn object(object: impl HostObject + 'static) -> Self {
        HostValue::Object(Rc::new(object))
    }

    pub fn as_object(&self) -> Option<&Rc<dyn HostObject>> {
        match self {
            HostValue::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Undefined => f.write_str("Undefined"),
            HostValue::Null => f.write_str("Null"),
            HostValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            HostValue::Number(n) => f.debug_tuple("Number").field(n).finish(),
            HostValue::String(s) => f.debug_tuple("String").field(s).finish(),
            HostValue::Array(items) => f.debug_tuple("Array").field(items).finish(),
            HostValue::Object(object) => write!(f, "Object({})", object.display()),
        }
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::String(s.to_string())
    }
}

impl From<f64> for HostValue {
    fn from(n: f64) -> Self {
        HostValue::Number(n)
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Bool(b)
    }
}

/// A host object that can be exposed to scripts.
///
/// Methods take `&self`; implementations needing mutation use interior
/// mutability. Identity is the `Rc` allocation: the realm caches wrappers
/// by it.
pub trait HostObject {
    /// Textual form, used by `toString` coercion and diagnostics.
    fn display(&self) -> String;

    fn has_property(&self, name: &str) -> bool;

    fn get_property(&self, name: &str) -> Result<HostValue, HostError>;

    fn set_property(&self, name: &str, _value: HostValue) -> Result<(), HostError> {
        Err(HostError::ReadOnly {
            name: name.to_string(),
        })
    }

    fn delete_property(&self, _name: &str) -> Result<bool, HostError> {
        Ok(false)
    }

    fn is_callable(&self) -> bool {
        false
    }

    fn call(&self, _this: HostValue, _args: Vec<HostValue>) -> Result<HostValue, HostError> {
        Err(HostError::NotCallable {
            native: self.display(),
        })
    }

    /// The allow-lists this object declares for sandboxed access. `None`
    /// means no policy at all.
    fn api_policy(&self) -> Option<ApiPolicy> {
        None
    }

    /// The primitive this object coerces to, when it is not its textual
    /// form.
    fn primitive_value(&self) -> Option<HostValue> {
        None
    }

    /// The script value this object stands in for, if it is a bookmark.
    fn bookmarked_value(&self) -> Option<Value> {
        None
    }
}

/// A failure reported by a host object. Surfaces in the script as a thrown
/// error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("property {name} is read-only")]
    ReadOnly { name: String },
    #[error("{native} is not a function")]
    NotCallable { native: String },
    #[error("Attempted to invoke bookmark for {value}")]
    BookmarkInvoked { value: String },
    /// A script-visible error raised by the host, e.g. a `RangeError`.
    #[error("{name}: {message}")]
    Thrown { name: String, message: String },
}

/// A defect in the embedding rather than in the script.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HostFault {
    #[error("bridging {native} requires a realm, but none was supplied")]
    MissingRealm { native: String },
}
