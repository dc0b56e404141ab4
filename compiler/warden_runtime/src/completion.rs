//! Completion records: the result of every evaluation step.
//!
//! Abrupt control flow (break, continue, return, throw) travels as data so
//! enclosing constructs in the evaluator can intercept it structurally.

use std::fmt;
use std::rc::Rc;

use crate::bridge::{ErrorObject, HostError};
use crate::realm::Realm;
use crate::value::Value;

/// The control-flow kind of a [`Completion`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CompletionType {
    Normal,
    Break,
    Continue,
    Return,
    Throw,
}

impl CompletionType {
    pub fn as_str(self) -> &'static str {
        match self {
            CompletionType::Normal => "normal",
            CompletionType::Break => "break",
            CompletionType::Continue => "continue",
            CompletionType::Return => "return",
            CompletionType::Throw => "throw",
        }
    }
}

impl fmt::Display for CompletionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completion record. Immutable once built.
///
/// `target` is only meaningful for `Break` and `Continue`; the other
/// constructors never set it.
#[derive(Clone, Debug)]
pub struct Completion {
    kind: CompletionType,
    value: Value,
    target: Option<String>,
}

impl Completion {
    pub fn new(kind: CompletionType, value: Value, target: Option<String>) -> Self {
        let target = match kind {
            CompletionType::Break | CompletionType::Continue => target,
            _ => None,
        };
        Completion {
            kind,
            value,
            target,
        }
    }

    pub fn normal(value: Value) -> Self {
        Self::new(CompletionType::Normal, value, None)
    }

    pub fn break_to(target: Option<String>) -> Self {
        Self::new(CompletionType::Break, Value::Undefined, target)
    }

    pub fn continue_to(target: Option<String>) -> Self {
        Self::new(CompletionType::Continue, Value::Undefined, target)
    }

    pub fn return_value(value: Value) -> Self {
        Self::new(CompletionType::Return, value, None)
    }

    pub fn throw(value: Value) -> Self {
        Self::new(CompletionType::Throw, value, None)
    }

    /// A `Throw` carrying a bridged `TypeError` with `message`.
    pub fn type_error(realm: &Realm, message: impl Into<String>) -> Self {
        let error = ErrorObject::type_error(message);
        Self::throw(realm.bridge(Rc::new(error)))
    }

    /// A `Throw` for a failure reported by a host object.
    pub fn from_host_error(realm: &Realm, error: &HostError) -> Self {
        let error = match error {
            HostError::Thrown { name, message } => ErrorObject::new(name.clone(), message.clone()),
            other => ErrorObject::type_error(other.to_string()),
        };
        Self::throw(realm.bridge(Rc::new(error)))
    }

    #[inline]
    pub fn kind(&self) -> CompletionType {
        self.kind
    }

    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    #[inline]
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// `true` for every kind except `Normal`.
    #[inline]
    pub fn is_abrupt(&self) -> bool {
        self.kind != CompletionType::Normal
    }

    pub fn is_throw(&self) -> bool {
        self.kind == CompletionType::Throw
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

impl From<Value> for Completion {
    fn from(value: Value) -> Self {
        Completion::normal(value)
    }
}

impl fmt::Display for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Some(target) => write!(f, "{} {target}", self.kind),
            None => write!(f, "{}: {}", self.kind, self.value.debug_string()),
        }
    }
}
